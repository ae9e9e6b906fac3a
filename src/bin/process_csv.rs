use clap::Parser;
use radiation_resampler::radiation::DEFAULT_TOLERANCE_HOURS;
use radiation_resampler::services::{RadiationService, Tool, ToolOutput};
use radiation_resampler::upload::validate_file_name;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "process-csv")]
#[command(about = "Resample or gap-check a local solar radiation CSV", long_about = None)]
struct Cli {
    /// Tool to run: 'interpolator' (15-minute resampling) or 'gap_checker'
    #[arg(long, default_value = "interpolator")]
    tool: String,

    /// Path to the input CSV file
    #[arg(long)]
    file: PathBuf,

    /// Where to write the resampled CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Gap tolerance in hours
    #[arg(long, env = "GAP_TOLERANCE_HOURS", default_value_t = DEFAULT_TOLERANCE_HOURS)]
    tolerance: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays usable for CSV output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let file_name = cli
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    validate_file_name(file_name)?;

    let tool: Tool = cli.tool.parse()?;
    let contents = fs::read(&cli.file)?;
    info!("Read {} bytes from {}", contents.len(), cli.file.display());

    let service = RadiationService::new(cli.tolerance);
    let output = service.run(tool, &contents, None).map_err(|e| {
        error!("Failed to process {}: {}", cli.file.display(), e);
        e.user_message()
    })?;

    match output {
        ToolOutput::Resampled(csv) => match cli.output {
            Some(path) => {
                fs::write(&path, &csv.body)?;
                eprintln!(
                    "Wrote {} rows for {} stations to {}",
                    csv.row_count,
                    csv.station_count,
                    path.display()
                );
            }
            None => io::stdout().write_all(&csv.body)?,
        },
        ToolOutput::Gaps(findings) => {
            if findings.is_empty() {
                println!("No station had enough observations to check.");
            }
            for finding in findings {
                println!("{finding}");
            }
        }
    }

    Ok(())
}
