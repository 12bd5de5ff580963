/// Tool argument declarations
///
/// Parses `args_info` entries such as `"str"` or `"str | None = 'GAI21'"`
/// into typed parameters. Names must be identifiers, annotations may only use
/// type-expression characters and defaults must be plain literals. Anything
/// else is rejected before a tool function exists.

use crate::error::{StudioError, StudioResult};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\[\]|,. ]+$").expect("valid annotation regex"))
}

pub fn is_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

/// One declared argument of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    /// Type expression without the default suffix (e.g., "str | None")
    pub annotation: String,
    pub default: Option<Value>,
}

impl ToolParam {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// JSON schema fragment describing this parameter's type
    pub fn json_schema(&self) -> Value {
        let member = self
            .annotation
            .split('|')
            .map(str::trim)
            .find(|m| *m != "None")
            .unwrap_or("str");
        type_schema(strip_optional(member))
    }
}

fn strip_optional(member: &str) -> &str {
    member
        .strip_prefix("Optional[")
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(member)
}

fn type_schema(member: &str) -> Value {
    let (base, inner) = match member.find('[') {
        Some(i) => (&member[..i], member[i + 1..].strip_suffix(']')),
        None => (member, None),
    };
    match base.trim() {
        "int" => serde_json::json!({"type": "integer"}),
        "float" => serde_json::json!({"type": "number"}),
        "bool" => serde_json::json!({"type": "boolean"}),
        "dict" | "Dict" => serde_json::json!({"type": "object"}),
        "list" | "List" | "tuple" | "Tuple" | "set" => {
            let items = inner
                .map(|item| type_schema(item.split(',').next().unwrap_or("str").trim()))
                .unwrap_or_else(|| serde_json::json!({}));
            serde_json::json!({"type": "array", "items": items})
        }
        _ => serde_json::json!({"type": "string"}),
    }
}

/// Parse every `args_info` entry, keeping declaration order
pub fn parse_args_info(args_info: &Map<String, Value>) -> StudioResult<Vec<ToolParam>> {
    let mut params = Vec::with_capacity(args_info.len());
    for (name, raw) in args_info {
        if !is_identifier(name) {
            return Err(StudioError::InvalidToolSpec(format!(
                "argument name '{}' is not an identifier",
                name
            )));
        }
        let raw = raw.as_str().ok_or_else(|| {
            StudioError::InvalidToolSpec(format!("annotation of '{}' must be a string", name))
        })?;
        let (annotation, default) = parse_annotation(raw)
            .map_err(|reason| StudioError::InvalidToolSpec(format!("argument '{}': {}", name, reason)))?;
        params.push(ToolParam {
            name: name.clone(),
            annotation,
            default,
        });
    }
    Ok(params)
}

/// Split `"<type>[ = <default>]"` and validate both halves
fn parse_annotation(raw: &str) -> Result<(String, Option<Value>), String> {
    let (type_part, default_part) = match split_default(raw) {
        Some((t, d)) => (t, Some(d)),
        None => (raw, None),
    };

    let annotation = type_part.trim();
    if annotation.is_empty() || !annotation_re().is_match(annotation) {
        return Err(format!("unsupported type annotation '{}'", annotation));
    }

    let default = match default_part {
        Some(literal) => Some(parse_literal(literal.trim())?),
        None => None,
    };

    Ok((annotation.to_string(), default))
}

/// Position of the first `=` outside quotes
fn split_default(raw: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '=') => return Some((&raw[..i], &raw[i + 1..])),
            _ => {}
        }
    }
    None
}

fn parse_literal(literal: &str) -> Result<Value, String> {
    match literal {
        "" => return Err("empty default value".to_string()),
        "None" => return Ok(Value::Null),
        "True" => return Ok(Value::Bool(true)),
        "False" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(quote) = literal.chars().next().filter(|c| *c == '\'' || *c == '"') {
        return parse_string_literal(literal, quote);
    }

    if let Some(inner) = literal.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let items = split_list(inner)?
            .into_iter()
            .map(|item| {
                if item.starts_with('[') {
                    Err("nested list defaults are not supported".to_string())
                } else {
                    parse_literal(item)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(items));
    }

    if let Ok(i) = literal.parse::<i64>() {
        return Ok(Value::Number(i.into()));
    }
    if let Some(n) = literal.parse::<f64>().ok().and_then(Number::from_f64) {
        return Ok(Value::Number(n));
    }

    Err(format!("default '{}' is not a literal", literal))
}

fn parse_string_literal(literal: &str, quote: char) -> Result<Value, String> {
    let body = literal
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .filter(|_| literal.len() >= 2)
        .ok_or_else(|| format!("unterminated string default {}", literal))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err("dangling escape in string default".to_string()),
            },
            c if c == quote => return Err(format!("unescaped quote in string default {}", literal)),
            c => out.push(c),
        }
    }
    Ok(Value::String(out))
}

/// Split list contents on commas outside quotes
fn split_list(inner: &str) -> Result<Vec<&str>, String> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string in list default".to_string());
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        items.push(last);
    }
    Ok(items)
}
