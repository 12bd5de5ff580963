/// Startup orchestration
///
/// Installs logging, migrates the schema, opens the shared storage pool and
/// seeds the demo workflow. Run once per process start.

use crate::{
    config::Config,
    database::{run_migrations, seed_demo_data, DatabaseManager, MigrationReport, SeedOptions, SeedOutcome},
    datamodel::AgentDocument,
    error::StudioResult,
    tools::{agent_tool_functions, ToolFunction},
};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Everything produced by a successful startup
#[derive(Debug)]
pub struct Startup {
    pub db: DatabaseManager,
    pub migrations: MigrationReport,
    /// `None` when seeding is disabled
    pub seed: Option<SeedOutcome>,
    /// Bearer token for tool functions built from this startup
    pub tool_bearer_token: String,
}

impl Startup {
    /// Tool functions of `agent` and its nested agents, carrying the configured token
    pub fn tool_functions(&self, agent: &AgentDocument) -> StudioResult<Vec<ToolFunction>> {
        agent_tool_functions(agent, &self.tool_bearer_token)
    }
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignore the error when a subscriber is already installed (tests, embedding apps)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .try_init();
}

/// Migrate, connect and seed according to `config`
pub async fn bootstrap(config: &Config) -> Result<Startup> {
    tracing::info!("🚀 Starting studio database bootstrap");

    let migrations = run_migrations(&config.database.url, config.migrations.settle_delay())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    tracing::debug!("📋 Migration report: {:?}", migrations);

    let db = DatabaseManager::connect(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database '{}': {}", config.database.url, e))?;

    let seed = if config.seed.enabled {
        let options = SeedOptions {
            model_api_key: config.seed.model_api_key.clone(),
        };
        let outcome = seed_demo_data(&db, &options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed demo data: {}", e))?;
        Some(outcome)
    } else {
        tracing::info!("⏭️ Demo seeding disabled");
        None
    };

    tracing::info!("✅ Studio database ready");

    Ok(Startup {
        db,
        migrations,
        seed,
        tool_bearer_token: config.tools.bearer_token.clone(),
    })
}
