//! Context-aware completion over partially typed input.
//!
//! Every request re-lexes the text before the cursor from scratch; the only
//! state kept between calls is the read-only spec and function table.

use std::sync::Arc;

use tracing::debug;

use crate::ast::HttpMethod;
use crate::functions::{FunctionTable, CALL_OPTIONS};
use crate::fuzzy;
use crate::lexer::{tokenize, HTTP_METHODS};
use crate::normalize::process_tokens;
use crate::spec::ApiSpec;
use crate::token::{Category, Token, TokenKind};
use crate::url_lexer::tokenize_url;

/// One candidate: insert `text` at `cursor + start_position`, replacing what lies between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Zero or negative: how many characters before the cursor the candidate replaces.
    pub start_position: isize,
}

/// Whether typed path segments `typed` fit template segments `template` over their common prefix.
///
/// Literal segments must be equal. A `{placeholder}` accepts any segment
/// except one starting with `_`, which names a reserved action.
pub fn can_match(typed: &[&str], template: &[&str]) -> bool {
    typed.iter().zip(template).all(|(t, p)| {
        if t == p {
            true
        } else if t.starts_with('_') {
            false
        } else {
            p.starts_with('{') && p.ends_with('}')
        }
    })
}

#[derive(Debug, Clone)]
pub struct Completer {
    spec: Arc<ApiSpec>,
    functions: Arc<FunctionTable>,
}

impl Completer {
    pub fn new(spec: Arc<ApiSpec>, functions: Arc<FunctionTable>) -> Self {
        Self { spec, functions }
    }

    pub fn complete(&self, text: &str, cursor: usize) -> Vec<Completion> {
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        let prefix = &text[..cursor];
        let tokens = process_tokens(tokenize(prefix));

        let located = match tokens.last() {
            Some(last) if last.end() == cursor => tokens.len() - 1,
            _ => return self.complete_after_space(prefix, &tokens),
        };
        let token = &tokens[located];
        let previous = located.checked_sub(1).map(|i| &tokens[i]);
        debug!(kind = ?token.kind, text = %token.text, "completing token");

        match token.kind {
            TokenKind::HttpMethod | TokenKind::FuncName => {
                let candidates = HTTP_METHODS
                    .iter()
                    .map(|m| m.to_string())
                    .chain(self.functions.keys().cloned());
                respond(&token.text, candidates)
            }
            TokenKind::Percent => respond("", self.functions.keys().cloned()),
            TokenKind::CommandName => respond(&token.text, self.functions.keys().cloned()),
            TokenKind::Literal if previous.is_some_and(|p| p.kind == TokenKind::HttpMethod) => {
                match previous.and_then(|p| p.text.parse::<HttpMethod>().ok()) {
                    Some(method) => self.complete_url(method, token, cursor),
                    None => Vec::new(),
                }
            }
            TokenKind::Error | TokenKind::KeyName | TokenKind::Literal => {
                self.complete_option(&tokens[..located], &token.text)
            }
            _ => Vec::new(),
        }
    }

    /// The cursor sits in whitespace after the last token.
    fn complete_after_space(&self, prefix: &str, tokens: &[Token]) -> Vec<Completion> {
        let Some(last) = tokens.last() else {
            return Vec::new();
        };
        if prefix[last.end()..].contains('\n') {
            return Vec::new();
        }
        if last.kind == TokenKind::HttpMethod {
            if let Ok(method) = last.text.parse::<HttpMethod>() {
                debug!(%method, "completing empty path");
                return self.complete_path(method, &[], "");
            }
        }
        self.complete_option(tokens, "")
    }

    fn complete_url(&self, method: HttpMethod, path: &Token, cursor: usize) -> Vec<Completion> {
        let url_tokens = tokenize_url(&path.text, path.start);
        let Some(current) = url_tokens.iter().rev().find(|t| t.contains(cursor)) else {
            return self.complete_path(method, &[], "");
        };
        debug!(kind = ?current.kind, "completing url token");

        match current.kind {
            TokenKind::PathPart | TokenKind::Slash => {
                let mut typed: Vec<&str> = path.text.split('/').filter(|s| !s.is_empty()).collect();
                let fragment = if current.kind == TokenKind::PathPart {
                    typed.pop();
                    current.text.as_str()
                } else {
                    ""
                };
                self.complete_path(method, &typed, fragment)
            }
            TokenKind::QuestionMark | TokenKind::Ampersand | TokenKind::ParamName => {
                let typed: Vec<&str> = url_tokens
                    .iter()
                    .filter(|t| t.kind == TokenKind::PathPart)
                    .map(|t| t.text.as_str())
                    .collect();
                let fragment = if current.kind == TokenKind::ParamName {
                    current.text.as_str()
                } else {
                    ""
                };
                self.complete_params(method, &typed, fragment)
            }
            _ => Vec::new(),
        }
    }

    /// Remaining template segments after the complete segments already typed.
    fn complete_path(&self, method: HttpMethod, typed: &[&str], fragment: &str) -> Vec<Completion> {
        let candidates = self.spec.templates(method).filter_map(|(_, template)| {
            let segments = template.segments();
            (typed.len() < segments.len() && can_match(typed, &segments))
                .then(|| segments[typed.len()..].join("/"))
        });
        respond(fragment, candidates)
    }

    /// Parameter names of every endpoint whose template the typed path fills exactly.
    fn complete_params(&self, method: HttpMethod, typed: &[&str], fragment: &str) -> Vec<Completion> {
        let candidates = self
            .spec
            .templates(method)
            .filter(|(endpoint, template)| {
                let segments = template.segments();
                endpoint.has_params() && typed.len() == segments.len() && can_match(typed, &segments)
            })
            .flat_map(|(endpoint, _)| endpoint.param_names().map(str::to_string))
            .collect::<Vec<_>>();
        respond(fragment, candidates)
    }

    /// Option keys of the enclosing call, found by scanning back from the cursor.
    fn complete_option(&self, before: &[Token], fragment: &str) -> Vec<Completion> {
        if before.last().is_some_and(|t| t.kind == TokenKind::Assign) {
            return Vec::new();
        }
        let mut crossed_payload = false;
        for (i, token) in before.iter().enumerate().rev() {
            match token.kind {
                TokenKind::BlankLine => return Vec::new(),
                TokenKind::HttpMethod if crossed_payload => return Vec::new(),
                TokenKind::HttpMethod => {
                    // `POST myfunc` names a function in path position.
                    let target = before
                        .get(i + 1)
                        .filter(|t| t.kind == TokenKind::Literal)
                        .and_then(|t| self.option_names(&t.text));
                    return match target {
                        Some(names) => respond(fragment, names),
                        None => respond(fragment, CALL_OPTIONS.iter().map(|o| format!("{}=", o))),
                    };
                }
                TokenKind::FuncName | TokenKind::CommandName => {
                    let names = self.option_names(&token.text).unwrap_or_default();
                    return respond(fragment, names);
                }
                kind if kind.category() == Category::Punctuation
                    && !matches!(kind, TokenKind::Assign) =>
                {
                    crossed_payload = true;
                }
                _ => {}
            }
        }
        Vec::new()
    }

    /// `name=` keys declared by a known function, if it declares any.
    fn option_names(&self, function: &str) -> Option<Vec<String>> {
        self.functions
            .get(function)
            .and_then(|f| f.option_names.as_ref())
            .map(|names| names.iter().map(|o| format!("{}=", o)).collect())
    }
}

/// Fuzzy-filter `candidates` against the typed `fragment`.
fn respond<I, S>(fragment: &str, candidates: I) -> Vec<Completion>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let start_position = -(fragment.chars().count() as isize);
    fuzzy::filter(fragment, candidates)
        .into_iter()
        .map(|text| Completion {
            text,
            start_position,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{builtin_functions, FunctionDescriptor};
    use crate::spec::{EndpointSpec, PathSpec, UrlSpec};
    use std::collections::BTreeMap;

    fn search_spec() -> ApiSpec {
        let mut spec = ApiSpec::new();
        spec.insert(
            "search",
            EndpointSpec {
                url: UrlSpec {
                    paths: vec![PathSpec::new("/{index}/_search", &[HttpMethod::Get, HttpMethod::Post])],
                },
                params: Some(BTreeMap::from([
                    ("q".to_string(), serde_json::Value::Null),
                    ("size".to_string(), serde_json::Value::Null),
                ])),
            },
        );
        spec
    }

    fn completer() -> Completer {
        let mut functions = builtin_functions();
        functions.insert("myfunc".to_string(), FunctionDescriptor::new("test", &["a", "b"]));
        Completer::new(Arc::new(search_spec()), Arc::new(functions))
    }

    fn texts(text: &str) -> Vec<String> {
        completer()
            .complete(text, text.len())
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    #[test]
    fn test_can_match() {
        assert!(can_match(&["users", "123"], &["users", "{id}"]));
        assert!(!can_match(&["_search"], &["{index}"]));
        assert!(!can_match(&["a"], &["b"]));
        assert!(can_match(&[], &["a"]));
        assert!(can_match(&["a", "b"], &["a"]));
    }

    #[test]
    fn test_path_after_slash() {
        assert_eq!(texts("GET /prod/"), vec!["_search"]);
    }

    #[test]
    fn test_path_mid_segment() {
        let completions = completer().complete("GET /prod/_sear", 15);
        assert_eq!(
            completions,
            vec![Completion {
                text: "_search".to_string(),
                start_position: -5,
            }]
        );
    }

    #[test]
    fn test_path_respects_method() {
        assert!(texts("DELETE /prod/").is_empty());
    }

    #[test]
    fn test_path_from_nothing() {
        assert_eq!(texts("get "), vec!["{index}/_search"]);
        assert_eq!(texts("get /"), vec!["{index}/_search"]);
    }

    #[test]
    fn test_reserved_action_never_fills_placeholder() {
        assert!(texts("GET /_search/").is_empty());
    }

    #[test]
    fn test_params() {
        assert_eq!(texts("GET /prod/_search?"), vec!["q", "size"]);
        assert_eq!(texts("GET /prod/_search?q=x&si"), vec!["size"]);
        assert!(texts("GET /prod/_search?q=").is_empty());
        assert!(texts("GET /prod?").is_empty());
    }

    #[test]
    fn test_method_and_function_names() {
        let names = texts("con");
        assert_eq!(names[0], "connect");
        assert!(texts("pu").contains(&"PUT".to_string()));
        assert_eq!(texts("%sess"), vec!["session"]);
    }

    #[test]
    fn test_function_options() {
        assert_eq!(texts("myfunc "), vec!["a=", "b="]);
        assert_eq!(texts("%myfunc "), vec!["a=", "b="]);
        assert_eq!(texts("POST myfunc "), vec!["a=", "b="]);
        assert!(texts("POST myfunc a=").is_empty());
        assert_eq!(texts("myfunc x b"), vec!["b="]);
        assert!(texts("myfunc a=").is_empty());
        assert!(texts("myfunc a= ").is_empty());
        assert!(texts("echo ").is_empty());
        assert!(texts("nosuch ").is_empty());
    }

    #[test]
    fn test_call_options() {
        assert_eq!(texts("GET /prod "), vec!["conn=", "runas="]);
        assert_eq!(texts("GET /prod ru"), vec!["runas="]);
        assert_eq!(texts("GET /prod conn=1 "), vec!["conn=", "runas="]);
    }

    #[test]
    fn test_nothing_on_fresh_line() {
        assert!(texts("GET /prod\n").is_empty());
        assert!(texts("myfunc x\n\n").is_empty());
        assert!(texts("").is_empty());
    }

    #[test]
    fn test_nothing_inside_payload() {
        assert!(texts("POST /prod/_search\n{\"query\": ").is_empty());
        assert!(texts("POST /prod/_search\n{\"query\": 1} ").is_empty());
    }

    #[test]
    fn test_cursor_in_the_middle() {
        let text = "GET /prod/ conn=1";
        let completions = completer().complete(text, 10);
        assert_eq!(completions[0].text, "_search");
    }

    #[test]
    fn test_empty_spec_offers_no_paths() {
        let completer = Completer::new(Arc::new(ApiSpec::new()), Arc::new(builtin_functions()));
        assert!(completer.complete("GET /prod/", 10).is_empty());
    }
}
