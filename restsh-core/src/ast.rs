//! AST types for parsed shell input.

use std::fmt;

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Float,
    Hex,
    Oct,
    Bin,
}

/// A value in a payload, an option, or a function argument.
///
/// Strings are stored decoded; numbers keep their source spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(Vec<(String, Value)>),
    Array(Vec<Value>),
    String(String),
    Number { text: String, kind: NumberKind },
    Bool(bool),
    Null,
    /// A bare word: a file path, a name, anything unquoted.
    Literal(String),
}

impl Value {
    /// Convert to JSON. Literals become strings; radix-prefixed numbers become integers.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Object(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::String(s) | Value::Literal(s) => Json::String(s.clone()),
            Value::Number { text, kind } => number_to_json(text, *kind),
            Value::Bool(b) => Json::Bool(*b),
            Value::Null => Json::Null,
        }
    }

    /// Plain text of a scalar, used for option values such as `conn=1` or `runas=bob`.
    pub fn as_text(&self) -> String {
        match self {
            Value::String(s) | Value::Literal(s) => s.clone(),
            Value::Number { text, .. } => text.clone(),
            other => other.to_json().to_string(),
        }
    }
}

fn number_to_json(text: &str, kind: NumberKind) -> serde_json::Value {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let parsed = match kind {
        NumberKind::Float => {
            return digits
                .parse::<f64>()
                .ok()
                .and_then(|f| serde_json::Number::from_f64(if negative { -f } else { f }))
                .map_or(serde_json::Value::Null, serde_json::Value::Number);
        }
        NumberKind::Integer => digits.trim_end_matches('L').parse::<i64>(),
        NumberKind::Hex => i64::from_str_radix(&digits[2..], 16),
        NumberKind::Bin => i64::from_str_radix(&digits[2..], 2),
        NumberKind::Oct => i64::from_str_radix(&digits[1..], 8),
    };
    match parsed {
        Ok(n) => serde_json::Value::from(if negative { -n } else { n }),
        Err(_) => serde_json::Value::String(text.to_string()),
    }
}

/// `METHOD /path options` followed by zero or more payload objects.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub method: HttpMethod,
    /// Always starts with `/`.
    pub path: String,
    pub options: Vec<(String, Value)>,
    /// One object per payload line (bulk requests carry several).
    pub payload: Vec<Value>,
    pub offset: usize,
}

impl ApiCall {
    /// Newline-delimited compact JSON, one object per line, or `None` without a payload.
    pub fn payload_text(&self) -> Option<String> {
        if self.payload.is_empty() {
            return None;
        }
        let mut text = String::new();
        for object in &self.payload {
            text.push_str(&object.to_json().to_string());
            text.push('\n');
        }
        Some(text)
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// Equality ignores where the statement was found.
impl PartialEq for ApiCall {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.path == other.path
            && self.options == other.options
            && self.payload == other.payload
    }
}

/// `name args... key=value...`, or `%name ...` in the leading-symbol form.
#[derive(Debug, Clone)]
pub struct FuncCall {
    pub name: String,
    pub symbol: bool,
    pub args: Vec<Value>,
    pub options: Vec<(String, Value)>,
    pub offset: usize,
}

impl FuncCall {
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

impl PartialEq for FuncCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.symbol == other.symbol
            && self.args == other.args
            && self.options == other.options
    }
}

/// One parsed unit of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ApiCall(ApiCall),
    FuncCall(FuncCall),
    Comment(String),
    Blank,
}

impl Statement {
    /// Comments and blank lines do nothing when executed.
    pub fn is_executable(&self) -> bool {
        matches!(self, Statement::ApiCall(_) | Statement::FuncCall(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(text: &str, kind: NumberKind) -> Value {
        Value::Number {
            text: text.to_string(),
            kind,
        }
    }

    #[test]
    fn test_method_from_str_is_case_insensitive() {
        assert_eq!("pUt".parse::<HttpMethod>(), Ok(HttpMethod::Put));
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_numbers_to_json() {
        assert_eq!(number("0x1F", NumberKind::Hex).to_json(), json!(31));
        assert_eq!(number("-0b101", NumberKind::Bin).to_json(), json!(-5));
        assert_eq!(number("017", NumberKind::Oct).to_json(), json!(15));
        assert_eq!(number("42L", NumberKind::Integer).to_json(), json!(42));
        assert_eq!(number("-1.5", NumberKind::Float).to_json(), json!(-1.5));
    }

    #[test]
    fn test_payload_text_is_ndjson() {
        let call = ApiCall {
            method: HttpMethod::Post,
            path: "/_bulk".to_string(),
            options: Vec::new(),
            payload: vec![
                Value::Object(vec![(
                    "index".to_string(),
                    Value::Object(vec![("_id".to_string(), Value::String("1".to_string()))]),
                )]),
                Value::Object(vec![("f".to_string(), Value::Bool(true))]),
            ],
            offset: 0,
        };
        assert_eq!(
            call.payload_text().unwrap(),
            "{\"index\":{\"_id\":\"1\"}}\n{\"f\":true}\n"
        );
    }

    #[test]
    fn test_equality_ignores_offset() {
        let a = FuncCall {
            name: "echo".to_string(),
            symbol: false,
            args: vec![Value::Literal("x".to_string())],
            options: Vec::new(),
            offset: 0,
        };
        let b = FuncCall { offset: 17, ..a.clone() };
        assert_eq!(a, b);
    }
}
