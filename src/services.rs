pub mod radiation_service;

pub use radiation_service::{RadiationService, ResampledCsv, Tool, ToolOutput};
