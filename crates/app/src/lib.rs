pub mod app;
pub mod error;
pub mod services;

pub use app::{AppConfig, AppState};
pub use error::{ApiError, AppError, Result};
pub use services::{AppServices, RemainingSpool, Settings, UsageOutcome};
