//! Error types for the studio database layer
//!
//! Every fallible library operation returns [`StudioResult`]. Variants keep the
//! underlying sqlx/reqwest error as their source so callers see it untouched.

use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    /// Requested row does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Version tracking could not be initialized; the database is unusable
    #[error("Error initializing migrations: {0}")]
    MigrationInit(#[source] MigrateError),

    /// Migration command failed after initialization
    #[error("Migration failed: {0}")]
    Migration(#[from] MigrateError),

    /// An agent appears among its own ancestors
    #[error("Agent {agent_id} is nested inside itself")]
    CyclicAgentGraph { agent_id: i64 },

    /// Tool declaration rejected before any callable is built
    #[error("Invalid tool specification: {0}")]
    InvalidToolSpec(String),

    /// Tool function invoked with arguments that do not match its declaration
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// Filter references a column the entity does not have
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// HTTP call made by a tool function failed
    #[error("HTTP call failed: {0}")]
    HttpCall(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    pub fn not_found(context: impl Into<String>) -> Self {
        StudioError::NotFound(context.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StudioError::NotFound(_))
    }
}

pub type StudioResult<T> = std::result::Result<T, StudioError>;
