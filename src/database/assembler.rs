/// Workflow assembly
///
/// Expands a workflow row into a self-contained [`WorkflowDocument`]: every
/// linked agent with its skills, tools, models and nested child agents.
/// Read-only; the whole traversal runs on one pooled connection.

use crate::{
    database::store::{DatabaseManager, Filters},
    datamodel::{
        document::{GROUPCHAT_ONLY_FIELDS, MODEL_CONFIG_EXCLUDED_FIELDS},
        Agent, AgentDocument, AgentType, LinkType, Model, Skill, Tool, Workflow,
        WorkflowAgentEntry, WorkflowAgentLink, WorkflowDocument, WorkflowType,
    },
    error::{StudioError, StudioResult},
};
use serde_json::Value;
use sqlx::SqliteConnection;
use std::{future::Future, pin::Pin};

type AgentFuture<'a> = Pin<Box<dyn Future<Output = StudioResult<AgentDocument>> + Send + 'a>>;

/// Assemble the workflow with id `workflow_id`
///
/// Fails with `NotFound` when no such workflow exists and with
/// `CyclicAgentGraph` when an agent is nested inside itself.
pub async fn assemble_workflow(
    db: &DatabaseManager,
    workflow_id: i64,
) -> StudioResult<WorkflowDocument> {
    let mut conn = db.pool().acquire().await?;

    let workflow = DatabaseManager::get_items::<Workflow>(&mut conn, &Filters::new().eq("id", workflow_id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StudioError::not_found(format!("workflow id={}", workflow_id)))?;

    tracing::debug!("🧩 Assembling workflow {} ({})", workflow.id, workflow.name);

    let links = DatabaseManager::get_items::<WorkflowAgentLink>(
        &mut conn,
        &Filters::new().eq("workflow_id", workflow_id),
    )
    .await?;

    let mut agents = Vec::with_capacity(links.len());
    for link in links {
        let mut path = Vec::new();
        let agent = expand_agent(&mut conn, link.agent_id, &mut path).await?;
        agents.push(WorkflowAgentEntry { agent, link });
    }

    if workflow.workflow_type == WorkflowType::Sequential {
        agents.sort_by_key(|entry| entry.link.sequence_id);
    }

    tracing::debug!("✅ Workflow {} assembled with {} top-level agents", workflow.id, agents.len());

    Ok(WorkflowDocument { workflow, agents })
}

/// Expand one agent and, recursively, its children
///
/// `path` holds the ids of the agents currently being expanded above this one.
fn expand_agent<'a>(
    conn: &'a mut SqliteConnection,
    agent_id: i64,
    path: &'a mut Vec<i64>,
) -> AgentFuture<'a> {
    Box::pin(async move {
        if path.contains(&agent_id) {
            return Err(StudioError::CyclicAgentGraph { agent_id });
        }

        let agent = DatabaseManager::get_items::<Agent>(conn, &Filters::new().eq("id", agent_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::not_found(format!("agent id={}", agent_id)))?;

        let skills = DatabaseManager::get_linked::<Skill>(conn, LinkType::AgentSkill, agent_id).await?;
        let tools = DatabaseManager::get_linked::<Tool>(conn, LinkType::AgentTool, agent_id).await?;
        let models = DatabaseManager::get_linked::<Model>(conn, LinkType::AgentModel, agent_id).await?;
        let children = DatabaseManager::get_linked::<Agent>(conn, LinkType::AgentAgent, agent_id).await?;

        let config = reshape_config(&agent, &models)?;

        path.push(agent_id);
        let mut agents = Vec::with_capacity(children.len());
        for child in children {
            agents.push(expand_agent(&mut *conn, child.id, &mut *path).await?);
        }
        path.pop();

        Ok(AgentDocument {
            id: agent.id,
            created_at: agent.created_at,
            updated_at: agent.updated_at,
            user_id: agent.user_id,
            version: agent.version,
            agent_type: agent.agent_type,
            config,
            task_instruction: agent.task_instruction,
            skills,
            tools,
            models,
            agents,
        })
    })
}

/// Serialize an agent config for the runtime
///
/// Group chat only keys are dropped for other agent types. When the agent
/// has models and an enabled `llm_config`, its `config_list` becomes the
/// linked models minus their bookkeeping fields.
pub fn reshape_config(agent: &Agent, models: &[Model]) -> StudioResult<Value> {
    let mut config = serde_json::to_value(&agent.config)?;
    let Some(object) = config.as_object_mut() else {
        return Ok(config);
    };

    if agent.agent_type != AgentType::GroupChat {
        for field in GROUPCHAT_ONLY_FIELDS {
            object.remove(field);
        }
    }

    if !models.is_empty() {
        if let Some(Value::Object(llm_config)) = object.get_mut("llm_config") {
            if !llm_config.is_empty() {
                let mut config_list = Vec::with_capacity(models.len());
                for model in models {
                    let mut entry = serde_json::to_value(model)?;
                    if let Some(fields) = entry.as_object_mut() {
                        for field in MODEL_CONFIG_EXCLUDED_FIELDS {
                            fields.remove(field);
                        }
                    }
                    config_list.push(entry);
                }
                llm_config.insert("config_list".to_string(), Value::Array(config_list));
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{AgentConfig, LlmConfig, LlmSetting, ModelApiType};
    use chrono::Utc;

    fn agent(agent_type: AgentType, llm_config: LlmSetting) -> Agent {
        Agent {
            id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: None,
            version: Some("0.0.1".to_string()),
            agent_type,
            config: AgentConfig {
                name: Some("helper".to_string()),
                llm_config,
                ..Default::default()
            },
            task_instruction: None,
        }
    }

    fn model() -> Model {
        Model {
            id: 9,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: Some("guestuser@gmail.com".to_string()),
            version: Some("0.0.1".to_string()),
            model: "gpt-4o-mini".to_string(),
            api_key: Some("sk-test".to_string()),
            base_url: None,
            api_type: ModelApiType::OpenAi,
            api_version: None,
            description: Some("OpenAI gpt-4o-mini model".to_string()),
        }
    }

    #[test]
    fn assistant_config_hides_groupchat_fields() {
        let config = reshape_config(&agent(AgentType::Assistant, LlmSetting::default()), &[]).unwrap();
        for field in GROUPCHAT_ONLY_FIELDS {
            assert!(config.get(field).is_none(), "{} leaked", field);
        }
        assert_eq!(config["name"], "helper");
    }

    #[test]
    fn groupchat_config_keeps_groupchat_fields() {
        let config = reshape_config(&agent(AgentType::GroupChat, LlmSetting::default()), &[]).unwrap();
        assert_eq!(config["admin_name"], "Admin");
        assert_eq!(config["max_round"], 100);
    }

    #[test]
    fn models_are_injected_into_llm_config() {
        let llm = LlmSetting::Config(LlmConfig::default());
        let config = reshape_config(&agent(AgentType::Assistant, llm), &[model()]).unwrap();
        let list = config["llm_config"]["config_list"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["model"], "gpt-4o-mini");
        assert_eq!(list[0]["api_key"], "sk-test");
        for field in MODEL_CONFIG_EXCLUDED_FIELDS {
            assert!(list[0].get(field).is_none(), "{} kept", field);
        }
    }

    #[test]
    fn disabled_llm_config_stays_disabled() {
        let config = reshape_config(&agent(AgentType::Assistant, LlmSetting::Disabled(false)), &[model()]).unwrap();
        assert_eq!(config["llm_config"], Value::Bool(false));
    }
}
