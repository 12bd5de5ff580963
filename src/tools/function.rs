/// HTTP tool functions
///
/// A [`ToolFunction`] is the callable form of a declarative HTTP tool: a
/// name, an ordered parameter list, a method and a URL. Calling it binds the
/// arguments against the declaration and issues exactly one request.
/// GET sends the arguments as query parameters, every other method as a
/// JSON body. No retries and no timeout; transport, status and decode
/// failures come back as `HttpCall` with the reqwest error intact.

use crate::{
    config::DEFAULT_TOOL_BEARER_TOKEN,
    datamodel::{AgentDocument, Tool},
    error::{StudioError, StudioResult},
    tools::args::{is_identifier, parse_args_info, ToolParam},
};
use reqwest::{Method, Url};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
pub struct ToolFunction {
    name: String,
    description: Option<String>,
    method: Method,
    url: Url,
    params: Vec<ToolParam>,
    auth_provider_id: Option<String>,
    bearer_token: String,
    client: reqwest::Client,
}

/// Build a tool function from its declaration
///
/// Fails with `InvalidToolSpec` when the name or an argument is not an
/// identifier, an annotation or default is malformed, or the method/URL cannot
/// be parsed.
pub fn make_tool_function(
    name: &str,
    args_info: &Map<String, Value>,
    method: &str,
    url: &str,
) -> StudioResult<ToolFunction> {
    if !is_identifier(name) {
        return Err(StudioError::InvalidToolSpec(format!(
            "function name '{}' is not an identifier",
            name
        )));
    }

    let params = parse_args_info(args_info)?;

    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| StudioError::InvalidToolSpec(format!("unsupported HTTP method '{}'", method)))?;

    let url = Url::parse(url)
        .map_err(|e| StudioError::InvalidToolSpec(format!("invalid URL '{}': {}", url, e)))?;

    tracing::debug!("🛠️ Built tool function {} ({} {}, {} params)", name, method, url, params.len());

    Ok(ToolFunction {
        name: name.to_string(),
        description: None,
        method,
        url,
        params,
        auth_provider_id: None,
        bearer_token: DEFAULT_TOOL_BEARER_TOKEN.to_string(),
        client: reqwest::Client::new(),
    })
}

impl ToolFunction {
    /// Build the callable for a stored tool row
    pub fn from_tool(tool: &Tool) -> StudioResult<Self> {
        let mut function = make_tool_function(&tool.name, &tool.args_info, &tool.method, &tool.url)?;
        function.description = tool.description.clone();
        function.auth_provider_id = tool.auth_provider_id.clone();
        Ok(function)
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into();
        self
    }

    /// Share one HTTP client across many tool functions
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn params(&self) -> &[ToolParam] {
        &self.params
    }

    pub fn auth_provider_id(&self) -> Option<&str> {
        self.auth_provider_id.as_deref()
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// Match keyword arguments against the declaration, filling defaults
    ///
    /// The result is in declaration order.
    pub fn bind_arguments(&self, mut kwargs: Map<String, Value>) -> StudioResult<Map<String, Value>> {
        let mut bound = Map::new();
        for param in &self.params {
            match kwargs.remove(&param.name).or_else(|| param.default.clone()) {
                Some(value) => {
                    bound.insert(param.name.clone(), value);
                }
                None => {
                    return Err(StudioError::InvalidArguments(format!(
                        "{}() missing required argument '{}'",
                        self.name, param.name
                    )));
                }
            }
        }
        if let Some(unexpected) = kwargs.keys().next() {
            return Err(StudioError::InvalidArguments(format!(
                "{}() got an unexpected argument '{}'",
                self.name, unexpected
            )));
        }
        Ok(bound)
    }

    /// Map positional arguments onto parameter names in declaration order
    pub fn positional_arguments(&self, args: Vec<Value>) -> StudioResult<Map<String, Value>> {
        if args.len() > self.params.len() {
            return Err(StudioError::InvalidArguments(format!(
                "{}() takes {} arguments but {} were given",
                self.name,
                self.params.len(),
                args.len()
            )));
        }
        let kwargs = self
            .params
            .iter()
            .zip(args)
            .map(|(param, value)| (param.name.clone(), value))
            .collect();
        self.bind_arguments(kwargs)
    }

    /// Invoke with keyword arguments and return the decoded JSON response
    pub async fn call(&self, kwargs: Map<String, Value>) -> StudioResult<Value> {
        let arguments = self.bind_arguments(kwargs)?;
        self.send(arguments).await
    }

    /// Invoke with positional arguments
    pub async fn call_positional(&self, args: Vec<Value>) -> StudioResult<Value> {
        let arguments = self.positional_arguments(args)?;
        self.send(arguments).await
    }

    async fn send(&self, arguments: Map<String, Value>) -> StudioResult<Value> {
        tracing::debug!("🌍 Tool call {}: {} {}", self.name, self.method, self.url);

        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .bearer_auth(&self.bearer_token);

        request = if self.method == Method::GET {
            request.query(&query_pairs(&arguments))
        } else {
            request.json(&arguments)
        };

        let response = request.send().await?.error_for_status()?;
        let status = response.status();
        let body = response.json::<Value>().await?;

        tracing::info!("✅ Tool call {} completed (status: {})", self.name, status);
        Ok(body)
    }

    /// Function-calling schema registered with the LLM
    pub fn schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|param| {
                let mut schema = param.json_schema();
                if let (Some(default), Some(obj)) = (&param.default, schema.as_object_mut()) {
                    obj.insert("default".to_string(), default.clone());
                }
                (param.name.clone(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.is_required())
            .map(|param| param.name.as_str())
            .collect();

        json!({
            "name": self.name,
            "description": self.description.clone().unwrap_or_default(),
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}

/// Query-string pairs: nulls are dropped and arrays repeat their key
fn query_pairs(arguments: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in arguments {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((name.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((name.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Callables for every tool attached to `agent` or any agent nested in it
pub fn agent_tool_functions(agent: &AgentDocument, bearer_token: &str) -> StudioResult<Vec<ToolFunction>> {
    let client = reqwest::Client::new();
    let mut functions = Vec::new();
    for nested in agent.descendants() {
        for tool in &nested.tools {
            let function = ToolFunction::from_tool(tool)?
                .with_bearer_token(bearer_token)
                .with_client(client.clone());
            functions.push(function);
        }
    }
    Ok(functions)
}
