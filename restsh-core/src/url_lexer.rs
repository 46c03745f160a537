//! Tokenizer for the text of a single path token (`/index/_search?q=x&size=1`).
//!
//! Runs on the path token in isolation and is only used for completion.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlState {
    Path,
    ParamName,
    ParamValue,
}

/// Split `text` into path segments, slashes and query parameters.
/// Offsets are shifted by `base` so they line up with the full input.
pub fn tokenize_url(text: &str, base: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut state = UrlState::Path;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let first = rest.as_bytes()[0];
        let (kind, len) = match state {
            UrlState::Path => match first {
                b'/' => (TokenKind::Slash, 1),
                b'?' => {
                    state = UrlState::ParamName;
                    (TokenKind::QuestionMark, 1)
                }
                _ => (
                    TokenKind::PathPart,
                    rest.find(['/', '?']).unwrap_or(rest.len()),
                ),
            },
            UrlState::ParamName => match first {
                b'&' => (TokenKind::Ampersand, 1),
                b'=' => {
                    state = UrlState::ParamValue;
                    (TokenKind::Equals, 1)
                }
                _ => (
                    TokenKind::ParamName,
                    rest.find(['&', '=']).unwrap_or(rest.len()),
                ),
            },
            UrlState::ParamValue => match first {
                b'&' => {
                    state = UrlState::ParamName;
                    (TokenKind::Ampersand, 1)
                }
                _ => (
                    TokenKind::ParamValue,
                    rest.find('&').unwrap_or(rest.len()),
                ),
            },
        };
        tokens.push(Token::new(kind, &rest[..len], base + pos));
        pos += len;
    }

    tokens
}
