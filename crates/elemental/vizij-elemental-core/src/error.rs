//! Errors raised while parsing spawn configuration.
//!
//! Runtime failures (pool exhaustion, unknown ids, pools that are still
//! loading) are not errors: they degrade to fewer visible elements.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementalError {
    #[error("spawn options json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown formation '{0}'")]
    UnknownFormation(String),
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ElementalError>;
