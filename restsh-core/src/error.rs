//! Error types for parsing and statement execution.

/// A required construct is missing from the input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: expected {expected}, found {found}")]
pub struct SyntaxError {
    /// Byte offset of the offending token (or end of input).
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn new(
        text: &str,
        offset: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let before = &text[..offset.min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
        Self {
            offset,
            line,
            column,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Failure reported by a transport implementation.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid connection option {name}: {reason}")]
    InvalidOption { name: String, reason: String },
}

/// Failure while executing a parsed statement.
#[derive(thiserror::Error, Debug)]
pub enum ExecError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown option for {target}: {name}")]
    UnknownOption { target: String, name: String },

    #[error("invalid value for option {name}: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("no such connection: {0}")]
    NoSuchConnection(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_position() {
        let text = "get abc\nqrs";
        let err = SyntaxError::new(text, 8, "payload object", "'qrs'");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);
        assert_eq!(
            err.to_string(),
            "line 2, column 1: expected payload object, found 'qrs'"
        );
    }
}
