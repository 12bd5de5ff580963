/// Agent Studio database bootstrap
///
/// Migrates and seeds the configured database. With a workflow id argument,
/// prints that workflow's assembled document as JSON.

use agentstudio_db::{assemble_workflow, bootstrap, config::Config, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration (defaults to sqlite://data/agentstudio.db)
    let config = Config::default();
    let startup = bootstrap(&config).await?;

    if let Some(arg) = std::env::args().nth(1) {
        let workflow_id: i64 = arg
            .parse()
            .map_err(|_| anyhow::anyhow!("workflow id must be an integer, got '{}'", arg))?;
        let document = assemble_workflow(&startup.db, workflow_id).await?;
        for entry in &document.agents {
            let functions = startup.tool_functions(&entry.agent)?;
            tracing::info!(
                "🛠️ {} tool functions under agent {}",
                functions.len(),
                entry.agent.name().unwrap_or("<unnamed>")
            );
        }
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    startup.db.close().await;
    Ok(())
}
