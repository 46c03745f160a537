//! Pretty and compact rendering of statements.
//!
//! Both renderings parse back to an equal statement. The head line
//! (method, path, options, or a function call) is identical in both; they
//! differ only in how payload objects are laid out.

use crate::ast::{Statement, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Payload objects expanded, two-space indentation.
    Pretty,
    /// Payload objects on one line without insignificant whitespace.
    Compact,
}

impl Statement {
    pub fn format_pretty(&self) -> String {
        render(self, Style::Pretty)
    }

    pub fn format_compact(&self) -> String {
        render(self, Style::Compact)
    }

    pub fn format(&self, style: Style) -> String {
        render(self, style)
    }
}

/// Render a sequence of statements; blank statements keep statements apart.
pub fn format_statements(statements: &[Statement], style: Style) -> String {
    statements.iter().map(|s| render(s, style)).collect()
}

fn render(statement: &Statement, style: Style) -> String {
    let mut out = String::new();
    match statement {
        Statement::ApiCall(call) => {
            out.push_str(call.method.as_str());
            out.push(' ');
            out.push_str(&call.path);
            write_options(&mut out, &call.options);
            out.push('\n');
            for object in &call.payload {
                write_value(&mut out, object, style, 0);
                out.push('\n');
            }
        }
        Statement::FuncCall(call) => {
            if call.symbol {
                out.push('%');
            }
            out.push_str(&call.name);
            for arg in &call.args {
                out.push(' ');
                write_value(&mut out, arg, Style::Compact, 0);
            }
            write_options(&mut out, &call.options);
            out.push('\n');
        }
        Statement::Comment(text) => {
            out.push_str(text);
            out.push('\n');
        }
        Statement::Blank => out.push('\n'),
    }
    out
}

fn write_options(out: &mut String, options: &[(String, Value)]) {
    for (name, value) in options {
        out.push(' ');
        out.push_str(name);
        out.push('=');
        write_value(out, value, Style::Compact, 0);
    }
}

fn write_value(out: &mut String, value: &Value, style: Style, depth: usize) {
    match value {
        Value::Object(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Object(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                break_line(out, style, depth + 1);
                write_string(out, key);
                out.push(':');
                if style == Style::Pretty {
                    out.push(' ');
                }
                write_value(out, value, style, depth + 1);
            }
            break_line(out, style, depth);
            out.push('}');
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                break_line(out, style, depth + 1);
                write_value(out, item, style, depth + 1);
            }
            break_line(out, style, depth);
            out.push(']');
        }
        Value::String(s) => write_string(out, s),
        Value::Number { text, .. } => out.push_str(text),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        Value::Literal(text) => out.push_str(text),
    }
}

fn break_line(out: &mut String, style: Style, depth: usize) {
    if style == Style::Pretty {
        out.push('\n');
        for _ in 0..depth {
            out.push_str("  ");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push_str(&serde_json::Value::String(s.to_string()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn first(text: &str) -> Statement {
        parse(text).unwrap().remove(0)
    }

    #[test]
    fn test_format_compact() {
        let statement = first("get / conn = 1 runas = \"foo\"\n{\n  \"a\": \"b\", \"q\": [1, 2]\n}");
        assert_eq!(
            statement.format_compact(),
            "GET / conn=1 runas=\"foo\"\n{\"a\":\"b\",\"q\":[1,2]}\n"
        );
    }

    #[test]
    fn test_format_pretty() {
        let statement = first("get / conn=1 runas=\"foo\"\n{\"a\":\"b\",\"q\":[1,2],\"e\":{}}");
        assert_eq!(
            statement.format_pretty(),
            "GET / conn=1 runas=\"foo\"\n{\n  \"a\": \"b\",\n  \"q\": [\n    1,\n    2\n  ],\n  \"e\": {}\n}\n"
        );
    }

    #[test]
    fn test_format_function_call() {
        let statement = first("%connect  hosts = 'http://x:9200'   name=a");
        assert_eq!(
            statement.format_pretty(),
            "%connect hosts=\"http://x:9200\" name=a\n"
        );
        let statement = first("echo {\"a\": [1]} 0x1F // trailing");
        assert_eq!(statement.format_pretty(), "echo {\"a\":[1]} 0x1F\n");
    }

    #[test]
    fn test_round_trip_examples() {
        let inputs = [
            "GET /_cat/indices?v",
            "post /idx/_doc {\"text\": 'it\\'s \\u00e9', \"n\": -0.5e3, \"x\": [true, null, {}]}",
            "POST /_bulk\n{\"index\": {}}\n{\"f\": 0b101}\n",
            "PUT /a conn=2\n{\"deep\": {\"er\": [[1], [2, [3]]]}, \"name\": bare}",
            "f @abc 1 \"a\" b=a",
            "%session current=0",
            "// just a comment",
            "PUT /t\n{\"a\": [1, 2,], \"b\": {\"c\": 3,},}",
            "POST /t\n{\"s\": \"\"\"two\nlines \"quoted\" ok\"\"\",\"e\": \"\\ud83d\\ude00\"}",
            "echo '''it's''' done",
        ];
        for input in inputs {
            let original = first(input);
            assert_eq!(first(&original.format_pretty()), original, "pretty: {}", input);
            assert_eq!(first(&original.format_compact()), original, "compact: {}", input);
        }
    }

    #[test]
    fn test_trailing_commas_are_dropped() {
        let call = first("PUT /t\n{\"a\": [1, 2,],}");
        assert_eq!(call.format_compact(), "PUT /t\n{\"a\":[1,2]}\n");
    }

    #[test]
    fn test_format_statements_preserves_blank_lines() {
        let text = "GET /a\n\nGET /b\n";
        let statements = parse(text).unwrap();
        let rendered = format_statements(&statements, Style::Compact);
        assert_eq!(rendered, text);
        assert_eq!(parse(&rendered).unwrap(), statements);
    }
}
