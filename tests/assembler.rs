mod common;

use agentstudio_db::{
    database::{assemble_workflow, seed_demo_data, Filters, Insert, SeedOptions, SeedOutcome},
    datamodel::{
        AgentDocument, AgentType, LinkExtras, LinkOutcome, LinkType, NewSkill, Workflow,
        WorkflowAgentType, WorkflowType,
    },
    StudioError,
};
use serde_json::Value;

const GROUPCHAT_KEYS: [&str; 5] = [
    "admin_name",
    "messages",
    "max_round",
    "speaker_selection_method",
    "allow_repeat_speaker",
];

async fn seeded() -> (common::TestDb, i64) {
    let test_db = common::migrated_db().await;
    let outcome = seed_demo_data(&test_db.db, &SeedOptions::default()).await.unwrap();
    let SeedOutcome::Seeded(ids) = outcome else {
        panic!("expected a fresh seed");
    };
    (test_db, ids.workflow_id)
}

fn assert_no_groupchat_keys(agent: &AgentDocument) {
    if agent.agent_type != AgentType::GroupChat {
        for key in GROUPCHAT_KEYS {
            assert!(
                agent.config.get(key).is_none(),
                "{:?} exposes {}",
                agent.name(),
                key
            );
        }
    }
    for child in &agent.agents {
        assert_no_groupchat_keys(child);
    }
}

#[tokio::test]
async fn test_assemble_demo_workflow() {
    let (test_db, workflow_id) = seeded().await;

    let document = assemble_workflow(&test_db.db, workflow_id).await.unwrap();

    assert_eq!(document.workflow.name, "YOLO Workflow");
    assert_eq!(document.workflow.workflow_type, WorkflowType::Autonomous);
    assert_eq!(document.agents.len(), 2);

    let sender = &document.agents[0];
    assert_eq!(sender.link.agent_type, WorkflowAgentType::Sender);
    assert_eq!(sender.agent.name(), Some("user_proxy_agent"));

    let receiver = &document.agents[1];
    assert_eq!(receiver.link.agent_type, WorkflowAgentType::Receiver);
    assert_eq!(receiver.agent.agent_type, AgentType::GroupChat);
    assert_eq!(receiver.agent.agents.len(), 6);
    assert_eq!(receiver.agent.config["admin_name"], "groupchat");

    let knox = document.find_agent("knox_agent").unwrap();
    let tool_names: Vec<_> = knox.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tool_names, ["send_knox_email_tool", "search_employee_tool"]);

    for entry in &document.agents {
        assert_no_groupchat_keys(&entry.agent);
    }
}

#[tokio::test]
async fn test_models_are_injected_into_llm_config() {
    let (test_db, workflow_id) = seeded().await;
    let document = assemble_workflow(&test_db.db, workflow_id).await.unwrap();

    let confluence = document.find_agent("confluence_agent").unwrap();
    assert_eq!(confluence.models.len(), 1);

    let config_list = confluence.config["llm_config"]["config_list"].as_array().unwrap();
    assert_eq!(config_list.len(), 1);
    assert_eq!(config_list[0]["model"], "gpt-4o-mini");
    for excluded in ["id", "created_at", "updated_at", "user_id", "description"] {
        assert!(config_list[0].get(excluded).is_none(), "{} leaked", excluded);
    }

    let user_proxy = document.find_agent("user_proxy_agent").unwrap();
    assert!(user_proxy.models.is_empty());
    assert_eq!(user_proxy.config["llm_config"]["config_list"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_unknown_workflow_is_not_found() {
    let (test_db, _) = seeded().await;
    let agents_before = common::count(&test_db.db, "agent").await;

    let err = assemble_workflow(&test_db.db, 9999).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(common::count(&test_db.db, "agent").await, agents_before);
}

#[tokio::test]
async fn test_sequential_workflow_orders_by_sequence_id() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "pipeline", WorkflowType::Sequential).await;
    let third = common::insert_agent(db, "third", AgentType::Assistant).await;
    let first = common::insert_agent(db, "first", AgentType::Assistant).await;
    let second = common::insert_agent(db, "second", AgentType::Assistant).await;

    for (agent, sequence) in [(third, 2), (first, 0), (second, 1)] {
        let extras = LinkExtras {
            agent_type: Some(WorkflowAgentType::Sequential),
            sequence_id: Some(sequence),
        };
        db.link(LinkType::WorkflowAgent, workflow, agent, extras).await.unwrap();
    }

    let document = assemble_workflow(db, workflow).await.unwrap();
    let order: Vec<_> = document.agents.iter().map(|e| e.agent.name().unwrap()).collect();
    assert_eq!(order, ["first", "second", "third"]);
    let sequence: Vec<_> = document.agents.iter().map(|e| e.link.sequence_id).collect();
    assert_eq!(sequence, [0, 1, 2]);
}

#[tokio::test]
async fn test_sequence_ids_are_assigned_in_link_order() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "auto-numbered", WorkflowType::Sequential).await;
    for name in ["a", "b", "c"] {
        let agent = common::insert_agent(db, name, AgentType::Assistant).await;
        db.link(
            LinkType::WorkflowAgent,
            workflow,
            agent,
            LinkExtras::role(WorkflowAgentType::Sequential),
        )
        .await
        .unwrap();
    }

    let document = assemble_workflow(db, workflow).await.unwrap();
    let sequence: Vec<_> = document.agents.iter().map(|e| e.link.sequence_id).collect();
    assert_eq!(sequence, [0, 1, 2]);
}

#[tokio::test]
async fn test_cyclic_agent_graph_is_rejected() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "loop", WorkflowType::Autonomous).await;
    let a = common::insert_agent(db, "a", AgentType::GroupChat).await;
    let b = common::insert_agent(db, "b", AgentType::GroupChat).await;
    db.link(LinkType::AgentAgent, a, b, LinkExtras::default()).await.unwrap();
    db.link(LinkType::AgentAgent, b, a, LinkExtras::default()).await.unwrap();
    db.link(LinkType::WorkflowAgent, workflow, a, LinkExtras::default()).await.unwrap();

    let err = assemble_workflow(db, workflow).await.unwrap_err();
    assert!(matches!(err, StudioError::CyclicAgentGraph { agent_id } if agent_id == a));
}

#[tokio::test]
async fn test_shared_child_is_expanded_under_each_parent() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "diamond", WorkflowType::Autonomous).await;
    let top = common::insert_agent(db, "top", AgentType::GroupChat).await;
    let left = common::insert_agent(db, "left", AgentType::GroupChat).await;
    let right = common::insert_agent(db, "right", AgentType::GroupChat).await;
    let shared = common::insert_agent(db, "shared", AgentType::Assistant).await;
    for (parent, child) in [(top, left), (top, right), (left, shared), (right, shared)] {
        db.link(LinkType::AgentAgent, parent, child, LinkExtras::default()).await.unwrap();
    }
    db.link(LinkType::WorkflowAgent, workflow, top, LinkExtras::default()).await.unwrap();

    let document = assemble_workflow(db, workflow).await.unwrap();
    let top = &document.agents[0].agent;
    assert_eq!(top.agents.len(), 2);
    for branch in &top.agents {
        assert_eq!(branch.agents[0].name(), Some("shared"));
    }
}

#[tokio::test]
async fn test_skills_are_attached() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "skilled", WorkflowType::Autonomous).await;
    let agent = common::insert_agent(db, "coder", AgentType::Assistant).await;
    let skill = {
        let mut conn = db.pool().acquire().await.unwrap();
        NewSkill {
            user_id: None,
            name: "generate_images".to_string(),
            content: "def generate_images(query: str): ...".to_string(),
            description: Some("Generate images".to_string()),
            libraries: vec!["openai".to_string()],
        }
        .insert(&mut conn)
        .await
        .unwrap()
    };
    db.link(LinkType::AgentSkill, agent, skill, LinkExtras::default()).await.unwrap();
    db.link(LinkType::WorkflowAgent, workflow, agent, LinkExtras::default()).await.unwrap();

    let document = assemble_workflow(db, workflow).await.unwrap();
    let skills = &document.agents[0].agent.skills;
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0].name, "generate_images");
    assert_eq!(skills[0].libraries, ["openai"]);
}

#[tokio::test]
async fn test_relinking_is_a_no_op() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let a = common::insert_agent(db, "a", AgentType::GroupChat).await;
    let b = common::insert_agent(db, "b", AgentType::Assistant).await;

    let first = db.link(LinkType::AgentAgent, a, b, LinkExtras::default()).await.unwrap();
    let second = db.link(LinkType::AgentAgent, a, b, LinkExtras::default()).await.unwrap();
    assert_eq!(first, LinkOutcome::Created);
    assert_eq!(second, LinkOutcome::AlreadyLinked);
    assert_eq!(common::count(db, "agentlink").await, 1);
}

#[tokio::test]
async fn test_linking_missing_rows_is_not_found() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let a = common::insert_agent(db, "a", AgentType::Assistant).await;
    let err = db
        .link(LinkType::AgentModel, a, 42, LinkExtras::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(common::count(db, "agentmodellink").await, 0);
}

#[tokio::test]
async fn test_get_rejects_unknown_filter_columns() {
    let test_db = common::migrated_db().await;
    let err = test_db
        .db
        .get::<Workflow>(&Filters::new().eq("name; DROP TABLE workflow", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::InvalidFilter(_)));
}

#[tokio::test]
async fn test_legacy_type_names_are_read_back() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "legacy", WorkflowType::Autonomous).await;
    let proxy = common::insert_agent(db, "proxy", AgentType::UserProxy).await;
    let manager = common::insert_agent(db, "manager", AgentType::GroupChat).await;

    sqlx::query("UPDATE workflow SET type = 'groupchat' WHERE id = ?")
        .bind(workflow)
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE agent SET type = 'user-proxy' WHERE id = ?")
        .bind(proxy)
        .execute(db.pool())
        .await
        .unwrap();

    // Linking reads the workflow type to pick a sequence id
    db.link(LinkType::WorkflowAgent, workflow, proxy, LinkExtras::role(WorkflowAgentType::Sender))
        .await
        .unwrap();
    db.link(LinkType::WorkflowAgent, workflow, manager, LinkExtras::role(WorkflowAgentType::Receiver))
        .await
        .unwrap();

    let document = assemble_workflow(db, workflow).await.unwrap();
    assert_eq!(document.workflow.workflow_type, WorkflowType::Autonomous);
    assert_eq!(document.agents[0].agent.agent_type, AgentType::UserProxy);
    assert_eq!(document.agents[0].link.sequence_id, 0);
    assert_eq!(document.agents[1].agent.agent_type, AgentType::GroupChat);
}

#[tokio::test]
async fn test_types_are_stored_under_canonical_names() {
    let test_db = common::migrated_db().await;
    let db = &test_db.db;

    let workflow = common::insert_workflow(db, "canonical", WorkflowType::Sequential).await;
    let agent = common::insert_agent(db, "proxy", AgentType::UserProxy).await;

    let workflow_type: String = sqlx::query_scalar("SELECT type FROM workflow WHERE id = ?")
        .bind(workflow)
        .fetch_one(db.pool())
        .await
        .unwrap();
    let agent_type: String = sqlx::query_scalar("SELECT type FROM agent WHERE id = ?")
        .bind(agent)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(workflow_type, "sequential");
    assert_eq!(agent_type, "userproxy");
}
