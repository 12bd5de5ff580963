mod common;

use agentstudio_db::{
    assemble_workflow, bootstrap,
    config::{Config, DatabaseConfig, MigrationConfig, SeedConfig, ToolConfig},
    database::SeedOutcome,
};
use serde_json::json;
use wiremock::{
    matchers::{header, method},
    Mock, MockServer, ResponseTemplate,
};

fn test_config(dir: &tempfile::TempDir, seed: bool, token: &str) -> Config {
    Config {
        database: DatabaseConfig {
            url: common::database_url(dir),
            max_connections: 2,
        },
        migrations: MigrationConfig { settle_delay_ms: 0 },
        seed: SeedConfig {
            enabled: seed,
            model_api_key: None,
        },
        tools: ToolConfig {
            bearer_token: token.to_string(),
        },
    }
}

#[tokio::test]
async fn test_bootstrap_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, true, "token-123");

    let first = bootstrap(&config).await.unwrap();
    assert!(first.migrations.initialized);
    assert!(matches!(first.seed, Some(SeedOutcome::Seeded(_))));
    first.db.close().await;

    let second = bootstrap(&config).await.unwrap();
    assert!(!second.migrations.initialized);
    assert!(matches!(second.seed, Some(SeedOutcome::AlreadySeeded { .. })));
}

#[tokio::test]
async fn test_bootstrap_without_seeding() {
    let dir = tempfile::tempdir().unwrap();
    let startup = bootstrap(&test_config(&dir, false, "token-123")).await.unwrap();
    assert!(startup.seed.is_none());
    assert_eq!(common::count(&startup.db, "workflow").await, 0);
}

#[tokio::test]
async fn test_tool_functions_carry_configured_token() {
    let dir = tempfile::tempdir().unwrap();
    let startup = bootstrap(&test_config(&dir, true, "studio-secret")).await.unwrap();
    let Some(SeedOutcome::Seeded(ids)) = &startup.seed else {
        panic!("expected a fresh seed");
    };

    let document = assemble_workflow(&startup.db, ids.workflow_id).await.unwrap();
    let functions = startup.tool_functions(&document.agents[1].agent).unwrap();
    assert_eq!(functions.len(), 5);
    assert!(functions.iter().all(|f| f.bearer_token() == "studio-secret"));
}

#[tokio::test]
async fn test_configured_token_reaches_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer studio-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let startup = bootstrap(&test_config(&dir, true, "studio-secret")).await.unwrap();
    let Some(SeedOutcome::Seeded(ids)) = &startup.seed else {
        panic!("expected a fresh seed");
    };

    // Point the seeded confluence tool at the mock server
    sqlx::query("UPDATE tool SET url = ? WHERE name = 'confluence_search_tool'")
        .bind(format!("{}/confluence/search", server.uri()))
        .execute(startup.db.pool())
        .await
        .unwrap();

    let document = assemble_workflow(&startup.db, ids.workflow_id).await.unwrap();
    let confluence = document.find_agent("confluence_agent").unwrap();
    let functions = startup.tool_functions(confluence).unwrap();

    let response = functions[0]
        .call_positional(vec![json!("Scaled Agile")])
        .await
        .unwrap();
    assert_eq!(response, json!({"results": []}));
}
