/// Assembled workflow documents
///
/// Self-contained nested view of a workflow handed to the agent runtime:
/// every agent carries its skills, tools, models and expanded child agents.

use crate::datamodel::{
    links::WorkflowAgentLink,
    types::{AgentType, Model, Skill, Tool, Workflow},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Config keys that only group chat agents may expose
pub const GROUPCHAT_ONLY_FIELDS: [&str; 5] = [
    "admin_name",
    "messages",
    "max_round",
    "speaker_selection_method",
    "allow_repeat_speaker",
];

/// Model keys removed before injection into `llm_config.config_list`
pub const MODEL_CONFIG_EXCLUDED_FIELDS: [&str; 5] =
    ["id", "created_at", "updated_at", "user_id", "description"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub agents: Vec<WorkflowAgentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAgentEntry {
    pub agent: AgentDocument,
    pub link: WorkflowAgentLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDocument {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// Reshaped agent config (see [`GROUPCHAT_ONLY_FIELDS`])
    pub config: Value,
    pub task_instruction: Option<String>,
    pub skills: Vec<Skill>,
    pub tools: Vec<Tool>,
    pub models: Vec<Model>,
    pub agents: Vec<AgentDocument>,
}

impl AgentDocument {
    /// Configured agent name, if any
    pub fn name(&self) -> Option<&str> {
        self.config.get("name").and_then(Value::as_str)
    }

    /// This agent followed by all nested agents, depth first
    pub fn descendants(&self) -> Vec<&AgentDocument> {
        let mut out = vec![self];
        for child in &self.agents {
            out.extend(child.descendants());
        }
        out
    }
}

impl WorkflowDocument {
    /// Find any agent in the document by configured name
    pub fn find_agent(&self, name: &str) -> Option<&AgentDocument> {
        self.agents
            .iter()
            .flat_map(|entry| entry.agent.descendants())
            .find(|agent| agent.name() == Some(name))
    }
}
