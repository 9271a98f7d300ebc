pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod services;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{HttpGateway, LocalStorage, OutboxTransport};
pub use app::DemoApp;
pub use config::AppConfig;
pub use crate::core::{DataLoader, DataProcessor};
pub use utils::error::{AppError, Result};
