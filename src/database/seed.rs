/// Demo data seeding
///
/// Inserts the demo workflow and its agents, tools and model once. The
/// presence of a workflow named [`DEMO_WORKFLOW_NAME`] marks the database as
/// seeded; rows and links are written in a single transaction so a partial
/// seed can never satisfy that guard.

use crate::{
    database::{
        fixtures::{demo_agents, demo_model, demo_tools, demo_workflow, DEMO_WORKFLOW_NAME},
        store::{DatabaseManager, Filters, Insert},
    },
    datamodel::{LinkExtras, LinkType, Workflow, WorkflowAgentType},
    error::StudioResult,
};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// Credential stored on the demo model row
    pub model_api_key: Option<String>,
}

/// Ids of every row written by a seeding pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeededIds {
    pub workflow_id: i64,
    pub model_id: i64,
    pub tool_ids: Vec<i64>,
    pub user_proxy_id: i64,
    pub tool_agent_id: i64,
    pub assistant_ids: Vec<i64>,
    pub groupchat_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The demo workflow already existed, nothing was written
    AlreadySeeded { workflow_id: i64 },
    Seeded(SeededIds),
}

pub async fn seed_demo_data(db: &DatabaseManager, options: &SeedOptions) -> StudioResult<SeedOutcome> {
    let mut tx = db.pool().begin().await?;

    let existing = DatabaseManager::get_items::<Workflow>(
        &mut tx,
        &Filters::new().eq("name", DEMO_WORKFLOW_NAME),
    )
    .await?;
    if let Some(workflow) = existing.first() {
        tracing::info!("✅ Database already initialized with {}", DEMO_WORKFLOW_NAME);
        return Ok(SeedOutcome::AlreadySeeded {
            workflow_id: workflow.id,
        });
    }

    tracing::info!("🌱 Initializing database with {}", DEMO_WORKFLOW_NAME);

    let model_id = demo_model(options.model_api_key.clone()).insert(&mut tx).await?;

    let tools = demo_tools();
    let confluence_tool = tools.confluence_search.insert(&mut tx).await?;
    let jira_tool = tools.jira_issue_create.insert(&mut tx).await?;
    let send_mail_tool = tools.send_knox_email.insert(&mut tx).await?;
    let search_employee_tool = tools.search_employee.insert(&mut tx).await?;
    let summary_tool = tools.summary_content.insert(&mut tx).await?;

    let agents = demo_agents();
    let user_proxy = agents.user_proxy.insert(&mut tx).await?;
    let tool_agent = agents.tool_agent.insert(&mut tx).await?;
    let confluence = agents.confluence.insert(&mut tx).await?;
    let jira = agents.jira.insert(&mut tx).await?;
    let knox = agents.knox.insert(&mut tx).await?;
    let summary = agents.summary.insert(&mut tx).await?;
    let groupchat = agents.groupchat.insert(&mut tx).await?;

    let workflow_id = demo_workflow().insert(&mut tx).await?;

    let mut links: Vec<(LinkType, i64, i64, LinkExtras)> = Vec::new();
    for assistant in [confluence, jira, knox, summary] {
        links.push((LinkType::AgentModel, assistant, model_id, LinkExtras::default()));
    }
    for (assistant, tool) in [
        (confluence, confluence_tool),
        (jira, jira_tool),
        (knox, send_mail_tool),
        (knox, search_employee_tool),
        (summary, summary_tool),
    ] {
        links.push((LinkType::AgentTool, assistant, tool, LinkExtras::default()));
    }
    for child in [user_proxy, tool_agent, confluence, jira, knox, summary] {
        links.push((LinkType::AgentAgent, groupchat, child, LinkExtras::default()));
    }
    links.push((LinkType::AgentModel, groupchat, model_id, LinkExtras::default()));
    links.push((
        LinkType::WorkflowAgent,
        workflow_id,
        user_proxy,
        LinkExtras::role(WorkflowAgentType::Sender),
    ));
    links.push((
        LinkType::WorkflowAgent,
        workflow_id,
        groupchat,
        LinkExtras::role(WorkflowAgentType::Receiver),
    ));

    for (link_type, primary, secondary, extras) in links {
        DatabaseManager::link_with(&mut tx, link_type, primary, secondary, extras).await?;
    }

    tx.commit().await?;

    tracing::info!("✅ Successfully initialized database with {}", DEMO_WORKFLOW_NAME);

    Ok(SeedOutcome::Seeded(SeededIds {
        workflow_id,
        model_id,
        tool_ids: vec![confluence_tool, jira_tool, send_mail_tool, search_employee_tool, summary_tool],
        user_proxy_id: user_proxy,
        tool_agent_id: tool_agent,
        assistant_ids: vec![confluence, jira, knox, summary],
        groupchat_id: groupchat,
    }))
}
