#![allow(dead_code)]

pub const WATTS_HEADER: &str =
    "date [UTC],stationCode,name,shortWaveRadiation [watts per square meter]";
pub const JOULES_HEADER: &str =
    "date [UTC],stationCode,name,globalRadiation60Min [joules per square centimeter]";

pub const BOUNDARY: &str = "radiation-test-boundary";

/// Two stations, three hourly rows each, spanning two hours
pub fn two_station_hourly_csv() -> String {
    let mut csv = String::from(WATTS_HEADER);
    csv.push('\n');
    for (code, name, values) in [
        ("0-20000-0-06260", "De Bilt", [0.0, 120.0, 240.0]),
        ("0-20000-0-06310", "Vlissingen", [10.0, 50.0, 30.0]),
    ] {
        for (hour, value) in values.iter().enumerate() {
            csv.push_str(&format!("2024-06-01T{hour:02}:00:00Z,{code},{name},{value}\n"));
        }
    }
    csv
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a str,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Hand-built multipart/form-data body using [`BOUNDARY`]
pub fn multipart_body(parts: &[Part]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match part {
            Part::File {
                name,
                filename,
                content,
            } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                ));
                body.push_str("Content-Type: text/csv\r\n\r\n");
                body.push_str(content);
                body.push_str("\r\n");
            }
            Part::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
                body.push_str(value);
                body.push_str("\r\n");
            }
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
