use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::services::RadiationService;

/// Running HTTP server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Build the service object and router, then spawn the server
    ///
    /// The service holds configuration only; each request works on its own
    /// upload, so nothing else is shared between requests.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let radiation_service = RadiationService::new(config.gap_tolerance_hours)
            .with_max_grid_points(config.max_grid_points);
        info!(
            "Default gap tolerance: {} hours, upload limit: {} bytes, grid limit: {} points",
            config.gap_tolerance_hours, config.max_upload_bytes, config.max_grid_points
        );

        let app_state = AppState {
            radiation_service,
            max_upload_bytes: config.max_upload_bytes,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
