#![allow(dead_code)]

use agentstudio_db::{
    database::{run_migrations, DatabaseManager, Insert},
    datamodel::{AgentConfig, AgentType, NewAgent, NewWorkflow, WorkflowType},
};
use std::time::Duration;
use tempfile::TempDir;

/// A migrated on-disk database living as long as the returned `TempDir`
pub struct TestDb {
    pub dir: TempDir,
    pub url: String,
    pub db: DatabaseManager,
}

pub fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("studio.db").display())
}

pub async fn migrated_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir);
    run_migrations(&url, Duration::ZERO).await.unwrap();
    let db = DatabaseManager::connect(&url, 2).await.unwrap();
    TestDb { dir, url, db }
}

pub async fn count(db: &DatabaseManager, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db.pool())
        .await
        .unwrap()
}

pub async fn insert_agent(db: &DatabaseManager, name: &str, agent_type: AgentType) -> i64 {
    let mut conn = db.pool().acquire().await.unwrap();
    NewAgent {
        user_id: None,
        agent_type,
        config: AgentConfig {
            name: Some(name.to_string()),
            ..Default::default()
        },
        task_instruction: None,
    }
    .insert(&mut conn)
    .await
    .unwrap()
}

pub async fn insert_workflow(db: &DatabaseManager, name: &str, workflow_type: WorkflowType) -> i64 {
    let mut conn = db.pool().acquire().await.unwrap();
    NewWorkflow {
        user_id: None,
        name: name.to_string(),
        description: format!("{} description", name),
        workflow_type,
        summary_method: None,
        sample_tasks: vec![],
    }
    .insert(&mut conn)
    .await
    .unwrap()
}
