use std::env;

use crate::radiation::{DEFAULT_MAX_GRID_POINTS, DEFAULT_TOLERANCE_HOURS};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub gap_tolerance_hours: u32,
    pub max_upload_bytes: usize,
    pub max_grid_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            gap_tolerance_hours: DEFAULT_TOLERANCE_HOURS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }
}

impl Config {
    /// Read settings from the environment; unset or unparsable values use the defaults
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            gap_tolerance_hours: env::var("GAP_TOLERANCE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.gap_tolerance_hours),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            max_grid_points: env::var("MAX_GRID_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_grid_points),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
