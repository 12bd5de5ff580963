/// Persisted entity definitions
///
/// Row types for models, skills, tools, agents and workflows. JSON columns
/// (agent config, tool argument declarations, sample tasks) are decoded with
/// sqlx's json support so callers always see typed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
};
use std::str::FromStr;

/// Provider family of an LLM endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ModelApiType {
    #[default]
    OpenAi,
    Cerebras,
    Google,
    Azure,
    Anthropic,
    Mistral,
    Together,
    Groq,
}

/// Code execution policy of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeExecution {
    #[default]
    Local,
    Docker,
    None,
}

/// Stored as `assistant`, `userproxy` or `groupchat`; `user-proxy` and
/// `group-chat` are read back as aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    #[default]
    Assistant,
    #[serde(alias = "user-proxy", alias = "user_proxy")]
    UserProxy,
    #[serde(alias = "group-chat", alias = "group_chat")]
    GroupChat,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Assistant => "assistant",
            AgentType::UserProxy => "userproxy",
            AgentType::GroupChat => "groupchat",
        }
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assistant" => Ok(AgentType::Assistant),
            "userproxy" | "user-proxy" | "user_proxy" => Ok(AgentType::UserProxy),
            "groupchat" | "group-chat" | "group_chat" => Ok(AgentType::GroupChat),
            other => Err(format!("invalid agent type '{}'", other)),
        }
    }
}

/// How a workflow drives its top-level agents
///
/// `groupchat` rows written by older clients read back as `Autonomous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    /// Agents converse freely (group chat style)
    #[default]
    #[serde(alias = "groupchat")]
    Autonomous,
    /// Agents run one after another, ordered by link sequence id
    Sequential,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Autonomous => "autonomous",
            WorkflowType::Sequential => "sequential",
        }
    }
}

impl FromStr for WorkflowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "autonomous" | "groupchat" => Ok(WorkflowType::Autonomous),
            "sequential" => Ok(WorkflowType::Sequential),
            other => Err(format!("invalid workflow type '{}'", other)),
        }
    }
}

/// TEXT column codec through `as_str`/`FromStr`, so aliases decode too
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Sqlite> for $ty {
            fn type_info() -> SqliteTypeInfo {
                <str as sqlx::Type<Sqlite>>::type_info()
            }

            fn compatible(ty: &SqliteTypeInfo) -> bool {
                <str as sqlx::Type<Sqlite>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, Sqlite> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <&str as sqlx::Encode<'q, Sqlite>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, Sqlite> for $ty {
            fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let text = <&str as sqlx::Decode<'r, Sqlite>>::decode(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }
    };
}

text_column!(AgentType);
text_column!(WorkflowType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SummaryMethod {
    #[default]
    Last,
    None,
    Llm,
}

/// An LLM endpoint an agent can be wired to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Model {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub version: Option<String>,
    /// Provider model identifier (e.g., "gpt-4o-mini")
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_type: ModelApiType,
    pub api_version: Option<String>,
    pub description: Option<String>,
}

/// Source-code skill appended to an agent's prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub version: Option<String>,
    pub name: String,
    pub content: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub secrets: Vec<Value>,
    /// Library dependencies the skill source imports
    #[sqlx(json)]
    pub libraries: Vec<String>,
}

/// Declarative HTTP tool
///
/// `args_info` maps argument names to annotation strings such as
/// `"str"` or `"str | None = 'GAI21'"`, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tool {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub method: String,
    pub url: String,
    #[sqlx(json)]
    pub args_info: Map<String, Value>,
    pub auth_provider_id: Option<String>,
}

/// LLM settings of an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub config_list: Vec<Value>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub cache_seed: Option<i64>,
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<i64>,
    #[serde(default)]
    pub extra_body: Option<Value>,
}

fn default_max_tokens() -> Option<i64> {
    Some(2048)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            config_list: Vec::new(),
            temperature: 0.0,
            cache_seed: None,
            timeout: None,
            max_tokens: default_max_tokens(),
            extra_body: None,
        }
    }
}

/// `llm_config` is either `false` or a settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LlmSetting {
    Config(LlmConfig),
    Disabled(bool),
}

impl Default for LlmSetting {
    fn default() -> Self {
        LlmSetting::Disabled(false)
    }
}

/// Agent configuration blob stored in the `agent.config` JSON column
///
/// The trailing group of fields only has meaning for group chat agents
/// and is stripped from assembled documents of every other agent type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: Option<String>,
    pub human_input_mode: String,
    pub max_consecutive_auto_reply: i64,
    pub system_message: Option<String>,
    pub is_termination_msg: Option<Value>,
    pub code_execution_config: CodeExecution,
    pub default_auto_reply: Option<String>,
    pub description: Option<String>,
    pub llm_config: LlmSetting,

    pub admin_name: Option<String>,
    pub messages: Vec<Value>,
    pub max_round: Option<i64>,
    pub speaker_selection_method: Option<String>,
    pub allow_repeat_speaker: Value,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: None,
            human_input_mode: "NEVER".to_string(),
            max_consecutive_auto_reply: 10,
            system_message: None,
            is_termination_msg: None,
            code_execution_config: CodeExecution::Local,
            default_auto_reply: Some(String::new()),
            description: None,
            llm_config: LlmSetting::default(),
            admin_name: Some("Admin".to_string()),
            messages: Vec::new(),
            max_round: Some(100),
            speaker_selection_method: Some("auto".to_string()),
            allow_repeat_speaker: Value::Bool(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub agent_type: AgentType,
    #[sqlx(json)]
    pub config: AgentConfig,
    pub task_instruction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workflow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<String>,
    pub version: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub workflow_type: WorkflowType,
    pub summary_method: Option<SummaryMethod>,
    #[sqlx(json)]
    pub sample_tasks: Vec<String>,
}
