/// Configuration management for the studio database layer
///
/// Handles the database connection, migration behaviour, demo seeding and
/// the credential attached to synthesized tool calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder bearer credential sent by every synthesized tool call
pub const DEFAULT_TOOL_BEARER_TOKEN: &str = "token-123";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Migration runner configuration
    pub migrations: MigrationConfig,
    /// Demo data seeding configuration
    pub seed: SeedConfig,
    /// Tool function configuration
    pub tools: ToolConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URI (e.g., "sqlite://data/agentstudio.db")
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Pause after a drift-repair upgrade before re-checking, in milliseconds
    pub settle_delay_ms: u64,
}

impl MigrationConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Seed the demo workflow on startup
    pub enabled: bool,
    /// Credential stored on the demo model row
    pub model_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Bearer token attached to synthesized tool calls
    pub bearer_token: String,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: std::env::var("AGENTSTUDIO_DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/agentstudio.db".to_string()),
                max_connections: std::env::var("AGENTSTUDIO_DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            migrations: MigrationConfig {
                settle_delay_ms: std::env::var("AGENTSTUDIO_MIGRATION_SETTLE_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            seed: SeedConfig {
                enabled: std::env::var("AGENTSTUDIO_SEED_DEMO")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                model_api_key: std::env::var("AGENTSTUDIO_MODEL_API_KEY").ok(),
            },
            tools: ToolConfig {
                bearer_token: std::env::var("AGENTSTUDIO_TOOL_BEARER_TOKEN")
                    .unwrap_or_else(|_| DEFAULT_TOOL_BEARER_TOKEN.to_string()),
            },
        }
    }
}
