/// Link row definitions
///
/// Many-to-many associations between agents and their models, tools, skills,
/// child agents, and between workflows and their top-level agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role an agent plays in a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WorkflowAgentType {
    #[default]
    Sender,
    Receiver,
    Planner,
    Sequential,
}

/// Workflow to agent association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkflowAgentLink {
    pub workflow_id: i64,
    pub agent_id: i64,
    pub agent_type: WorkflowAgentType,
    /// Position of the agent in a sequential workflow
    pub sequence_id: i64,
}

/// Discriminator for the typed join tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    AgentModel,
    AgentTool,
    AgentSkill,
    AgentAgent,
    WorkflowAgent,
}

impl LinkType {
    /// Join table backing this link type
    pub fn table(&self) -> &'static str {
        match self {
            LinkType::AgentModel => "agentmodellink",
            LinkType::AgentTool => "agenttoollink",
            LinkType::AgentSkill => "agentskilllink",
            LinkType::AgentAgent => "agentlink",
            LinkType::WorkflowAgent => "workflowagentlink",
        }
    }

    /// Entity table the primary id refers to
    pub fn primary_table(&self) -> &'static str {
        match self {
            LinkType::WorkflowAgent => "workflow",
            _ => "agent",
        }
    }

    /// Entity table the secondary id refers to
    pub fn secondary_table(&self) -> &'static str {
        match self {
            LinkType::AgentModel => "model",
            LinkType::AgentTool => "tool",
            LinkType::AgentSkill => "skill",
            LinkType::AgentAgent | LinkType::WorkflowAgent => "agent",
        }
    }

    /// (primary, secondary) column names in the join table
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            LinkType::AgentModel => ("agent_id", "model_id"),
            LinkType::AgentTool => ("agent_id", "tool_id"),
            LinkType::AgentSkill => ("agent_id", "skill_id"),
            LinkType::AgentAgent => ("parent_id", "agent_id"),
            LinkType::WorkflowAgent => ("workflow_id", "agent_id"),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkType::AgentModel => "agent_model",
            LinkType::AgentTool => "agent_tool",
            LinkType::AgentSkill => "agent_skill",
            LinkType::AgentAgent => "agent_agent",
            LinkType::WorkflowAgent => "workflow_agent",
        };
        f.write_str(name)
    }
}

/// Link-type specific fields, only read for workflow-agent links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkExtras {
    pub agent_type: Option<WorkflowAgentType>,
    /// Explicit sequence position; assigned automatically for sequential workflows when absent
    pub sequence_id: Option<i64>,
}

impl LinkExtras {
    pub fn role(agent_type: WorkflowAgentType) -> Self {
        Self {
            agent_type: Some(agent_type),
            sequence_id: None,
        }
    }

    pub fn sequence(sequence_id: i64) -> Self {
        Self {
            agent_type: Some(WorkflowAgentType::Sequential),
            sequence_id: Some(sequence_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyLinked,
}
