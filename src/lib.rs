pub mod api;
pub mod app;
pub mod config;
pub mod pages;
pub mod process_error;
pub mod radiation;
pub mod services;
pub mod upload;
pub mod utils;
