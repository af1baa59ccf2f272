use serde::Serialize;
use thiserror::Error;

use spoolman_client::SpoolmanError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("local database error: {0}")]
    Storage(#[from] spool_db::DbError),
    #[error("spool {0} not found in spoolman")]
    SpoolNotFound(i64),
    #[error("{0}")]
    Upstream(SpoolmanError),
    /// Spoolman was already mutated when the local log write failed. The
    /// inconsistency (upstream decremented, no local record) is reported,
    /// not reconciled.
    #[error("spoolman was updated but the local usage log write failed: {0}")]
    PartialWrite(#[source] spool_db::DbError),
    #[error("{0}")]
    InvalidInput(String),
}

impl From<SpoolmanError> for AppError {
    fn from(err: SpoolmanError) -> Self {
        match err {
            SpoolmanError::NotFound(id) => AppError::SpoolNotFound(id),
            other => AppError::Upstream(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// HTTP projection of an [`AppError`]: status code plus the JSON body the
/// API serves (`error`, optional `details`).
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match err {
            AppError::InvalidInput(_) => 400,
            _ => 500,
        };
        let (error, details) = match err {
            AppError::Upstream(SpoolmanError::Upstream { detail, .. }) if !detail.is_empty() => {
                ("spoolman rejected the request".to_string(), Some(detail))
            }
            AppError::Upstream(source @ SpoolmanError::Unreachable(_)) => {
                ("spoolman is unreachable".to_string(), Some(source.to_string()))
            }
            other => (other.to_string(), None),
        };
        Self {
            status,
            error,
            details,
        }
    }
}
