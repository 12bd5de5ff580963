/// Insertable row drafts
///
/// Drafts carry everything except the storage-assigned id and timestamps.

use crate::datamodel::types::{AgentConfig, AgentType, ModelApiType, SummaryMethod, WorkflowType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewModel {
    pub user_id: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_type: ModelApiType,
    pub api_version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkill {
    pub user_id: Option<String>,
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    pub libraries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTool {
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub method: String,
    pub url: String,
    pub args_info: Map<String, Value>,
    pub auth_provider_id: Option<String>,
}

impl NewTool {
    /// Build a tool draft from `(argument, annotation)` pairs, keeping their order
    pub fn new(
        name: &str,
        description: &str,
        method: &str,
        url: &str,
        args: &[(&str, &str)],
        auth_provider_id: &str,
    ) -> Self {
        let args_info = args
            .iter()
            .map(|(arg, annotation)| (arg.to_string(), Value::String(annotation.to_string())))
            .collect();
        Self {
            user_id: None,
            name: name.to_string(),
            description: Some(description.to_string()),
            method: method.to_string(),
            url: url.to_string(),
            args_info,
            auth_provider_id: Some(auth_provider_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
    pub user_id: Option<String>,
    pub agent_type: AgentType,
    pub config: AgentConfig,
    pub task_instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkflow {
    pub user_id: Option<String>,
    pub name: String,
    pub description: String,
    pub workflow_type: WorkflowType,
    pub summary_method: Option<SummaryMethod>,
    pub sample_tasks: Vec<String>,
}
