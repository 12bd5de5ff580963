/// Demo workflow fixtures
///
/// One group chat workflow: a user proxy, a tool executor, four domain
/// assistants bound to HTTP tools, and a group chat coordinator.

use crate::datamodel::{
    AgentConfig, AgentType, CodeExecution, LlmConfig, LlmSetting, ModelApiType, NewAgent,
    NewModel, NewTool, NewWorkflow, SummaryMethod, WorkflowType,
};

pub const DEMO_WORKFLOW_NAME: &str = "YOLO Workflow";
pub const DEMO_USER_ID: &str = "guestuser@gmail.com";
const PLUGIN_API: &str = "http://localhost:7700/plugin/api/v1";

/// Instruction block appended to every domain assistant prompt
pub const PARAMETER_AGENT_INSTRUCTIONS: &str = r#"
     You are responsible for extracting accurate parameters necessary for ToolAgent's task execution.
     !!IMPORTANT!! You should try your best to extract the correct parameters from the request.
     !!IMPORTANT!!If information is insufficient or unclear, they must request clarification from the user, ending each query with "TERMINATE".
     Once the task results are received, they review and verify the completion before passing the summary to the UserProxy. The final summary after all steps should also end with "TERMINATE".
     !!IMPORTANT!! please use korean when you ask

     Few-Shot Example:

     1) User Input:
     "Check today's weather in Seoul."
     Agent: Extracts like {"location":"seoul"} and forwards to ToolAgent "

     2) Check for missing parameters
     "Book a table at the nearest Italian restaurant."
     Agent: Identifies missing information and requests clarification from the user "Could you specify the number of people and time for the reservation? TERMINATE"

     3) Check for specific parameters:
     "Get the latest news."
     Agent: Requests further clarification from the user "Could you specify the news category or region of interest? TERMINATE"

     4) After Task Completion:
     After all steps are completed, Parameter Agent provides a final summary to the user
     Agent: Requested tasks have been completed. The weather was checked, and your reservation was made. TERMINATE
     "#;

const TOOL_AGENT_PROMPT: &str = r#"
        The ToolAgent executes tasks based on specific parameters provided by the Parameter Agent and returns the results to the requesting agent.
        The ToolAgent does not modify parameters or request clarification; it focuses solely on executing the task as directed and returning the outcome.
        You only execute single function at once.
        "#;

const KNOX_AGENT_PROMPT: &str = r#"
        You are a helpful Knox assistant. You can help with knox service (sending email, searching employee).
        !!IMPORTANT!! When sending an email, must use the Employee Search API to retrieve recipient information.
        !!IMPORTANT!! When you don't know who to send the email to, ask to User.
        "#;

pub fn demo_model(api_key: Option<String>) -> NewModel {
    NewModel {
        user_id: Some(DEMO_USER_ID.to_string()),
        model: "gpt-4o-mini".to_string(),
        api_key,
        base_url: None,
        api_type: ModelApiType::OpenAi,
        api_version: None,
        description: Some("OpenAI gpt-4o-mini model".to_string()),
    }
}

/// Demo HTTP tools keyed by the agent that uses them
pub struct DemoTools {
    pub confluence_search: NewTool,
    pub jira_issue_create: NewTool,
    pub send_knox_email: NewTool,
    pub search_employee: NewTool,
    pub summary_content: NewTool,
}

pub fn demo_tools() -> DemoTools {
    let owned = |mut tool: NewTool| {
        tool.user_id = Some(DEMO_USER_ID.to_string());
        tool
    };
    DemoTools {
        confluence_search: owned(NewTool::new(
            "confluence_search_tool",
            "Confluence Search",
            "get",
            &format!("{}/confluence/search", PLUGIN_API),
            &[("query", "str")],
            "confluence",
        )),
        jira_issue_create: owned(NewTool::new(
            "jira_issue_create_tool",
            "Jira Issue Create",
            "post",
            &format!("{}/jira/create", PLUGIN_API),
            &[
                ("summary", "str"),
                ("description", "str"),
                ("projectKey", "str | None = 'GAI21'"),
                ("issuetype", "str | None = 'Story'"),
            ],
            "jira",
        )),
        send_knox_email: owned(NewTool::new(
            "send_knox_email_tool",
            "Send Knox mail",
            "post",
            &format!("{}/knox/send-mail", PLUGIN_API),
            &[
                ("recipients", "list[str]"),
                ("title", "str"),
                ("content", "str"),
                ("sender", "str = 'yolo@yolo.com'"),
            ],
            "knox",
        )),
        search_employee: owned(NewTool::new(
            "search_employee_tool",
            "Search knox employee information.",
            "get",
            &format!("{}/knox/search-employee", PLUGIN_API),
            &[("nickname", "str")],
            "knox",
        )),
        summary_content: owned(NewTool::new(
            "summary_content_tool",
            "Summary Content Tool",
            "post",
            &format!("{}/summary", PLUGIN_API),
            &[("content", "str")],
            "summary",
        )),
    }
}

fn zero_temperature() -> LlmSetting {
    LlmSetting::Config(LlmConfig {
        temperature: 0.0,
        ..Default::default()
    })
}

fn agent(agent_type: AgentType, config: AgentConfig) -> NewAgent {
    NewAgent {
        user_id: Some(DEMO_USER_ID.to_string()),
        agent_type,
        config,
        task_instruction: None,
    }
}

fn assistant(name: &str, description: &str, system_message: String) -> NewAgent {
    agent(
        AgentType::Assistant,
        AgentConfig {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            human_input_mode: "NEVER".to_string(),
            max_consecutive_auto_reply: 25,
            system_message: Some(system_message),
            code_execution_config: CodeExecution::None,
            llm_config: zero_temperature(),
            ..Default::default()
        },
    )
}

pub struct DemoAgents {
    pub user_proxy: NewAgent,
    pub tool_agent: NewAgent,
    pub confluence: NewAgent,
    pub jira: NewAgent,
    pub knox: NewAgent,
    pub summary: NewAgent,
    pub groupchat: NewAgent,
}

pub fn demo_agents() -> DemoAgents {
    let user_proxy = agent(
        AgentType::UserProxy,
        AgentConfig {
            name: Some("user_proxy_agent".to_string()),
            description: Some("User Proxy Agent Configuration".to_string()),
            human_input_mode: "NEVER".to_string(),
            max_consecutive_auto_reply: 25,
            system_message: Some("You are a helpful assistant".to_string()),
            code_execution_config: CodeExecution::Local,
            default_auto_reply: Some(String::new()),
            llm_config: zero_temperature(),
            ..Default::default()
        },
    );

    let mut tool_agent = assistant(
        "tool_agent",
        "Tool Agent Configuration",
        TOOL_AGENT_PROMPT.to_string(),
    );
    tool_agent.config.default_auto_reply = Some("TERMINATE".to_string());

    let confluence = assistant(
        "confluence_agent",
        "Confluence Assistant Agent. Solve the problem related to confluence",
        format!(
            "You are a helpful Confluence assistant. You can help with searching in confluence.{}",
            PARAMETER_AGENT_INSTRUCTIONS
        ),
    );
    let jira = assistant(
        "jira_agent",
        "Jira Assistant Agent. Solve the problem related to jira",
        format!(
            "You are a helpful Jira assistant. You can help with creating jira issue.{}",
            PARAMETER_AGENT_INSTRUCTIONS
        ),
    );
    let knox = assistant(
        "knox_agent",
        "Knox Assistant Agent. Solve the problem related to knox",
        format!("{}{}", KNOX_AGENT_PROMPT, PARAMETER_AGENT_INSTRUCTIONS),
    );
    let summary = assistant(
        "summary_agent",
        "Summary Assistant Agent. Summary the content",
        format!(
            "You are a helpful summary assistant. You can help with creating summary content.{}",
            PARAMETER_AGENT_INSTRUCTIONS
        ),
    );

    let groupchat = agent(
        AgentType::GroupChat,
        AgentConfig {
            name: Some("yolo_groupchat".to_string()),
            admin_name: Some("groupchat".to_string()),
            description: Some("Group Chat Agent Configuration".to_string()),
            human_input_mode: "NEVER".to_string(),
            max_consecutive_auto_reply: 25,
            system_message: Some("You are a group chat manager".to_string()),
            code_execution_config: CodeExecution::None,
            default_auto_reply: Some("TERMINATE".to_string()),
            llm_config: zero_temperature(),
            speaker_selection_method: Some("auto".to_string()),
            ..Default::default()
        },
    );

    DemoAgents {
        user_proxy,
        tool_agent,
        confluence,
        jira,
        knox,
        summary,
        groupchat,
    }
}

pub fn demo_workflow() -> NewWorkflow {
    NewWorkflow {
        user_id: Some(DEMO_USER_ID.to_string()),
        name: DEMO_WORKFLOW_NAME.to_string(),
        description: "yolo workflow".to_string(),
        workflow_type: WorkflowType::Autonomous,
        summary_method: Some(SummaryMethod::Last),
        sample_tasks: vec![
            "'Scaled Agile'로 confluence에서 검색한 후 해당 내용을 요약해서 jira 이슈로 생성 한 후 그 결과를 knox mail로 jason과 milo에게 보내줘."
                .to_string(),
        ],
    }
}
