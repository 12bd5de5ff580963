/// Studio data model
///
/// Persisted rows, link rows, insertable drafts and the assembled workflow
/// document consumed by the agent runtime.

// Entity rows and their enums
pub mod types;

// Typed join rows and link discriminators
pub mod links;

// Rows waiting for a storage-assigned id
pub mod drafts;

// Nested workflow documents produced by the assembler
pub mod document;

pub use document::{AgentDocument, WorkflowAgentEntry, WorkflowDocument};
pub use drafts::{NewAgent, NewModel, NewSkill, NewTool, NewWorkflow};
pub use links::{LinkExtras, LinkOutcome, LinkType, WorkflowAgentLink, WorkflowAgentType};
pub use types::{
    Agent, AgentConfig, AgentType, CodeExecution, LlmConfig, LlmSetting, Model, ModelApiType,
    Skill, SummaryMethod, Tool, Workflow, WorkflowType,
};
