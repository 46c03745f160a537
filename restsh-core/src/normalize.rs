//! Token-stream normalization shared by the parser and the completer.

use tracing::trace;

use crate::token::{Token, TokenKind};

/// Drop whitespace, coalesce contiguous error characters, and join the pieces
/// of each quoted string into one token.
///
/// Applying it twice gives the same result as applying it once.
pub fn process_tokens(tokens: impl IntoIterator<Item = Token>) -> Vec<Token> {
    let mut processed: Vec<Token> = Vec::new();

    for token in tokens {
        if token.kind == TokenKind::Whitespace {
            continue;
        }
        if let Some(last) = processed.last_mut() {
            if last.end() == token.start && absorbs(last, &token) {
                last.text.push_str(&token.text);
                continue;
            }
        }
        processed.push(token);
    }

    trace!(count = processed.len(), "normalized tokens");
    processed
}

fn absorbs(last: &Token, next: &Token) -> bool {
    match last.kind {
        TokenKind::Error => next.kind == TokenKind::Error,
        kind if kind.is_string() => {
            (next.kind == kind || next.kind == TokenKind::StringEscape)
                && !is_closed_string(&last.text)
        }
        _ => false,
    }
}

/// True once the opening quote reappears unescaped; tripled openers need a tripled close.
pub(crate) fn is_closed_string(text: &str) -> bool {
    let mut chars = text.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return false,
    };
    let needed = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        chars.nth(1);
        3
    } else {
        1
    };
    let mut escaped = false;
    let mut run = 0;
    for c in chars {
        if escaped {
            escaped = false;
            run = 0;
        } else if c == '\\' {
            escaped = true;
            run = 0;
        } else if c == quote {
            run += 1;
            if run == needed {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::lexer::tokenize;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_process_tokens_idempotent(s in "[ -~\n]{0,80}") {
            let raw: Vec<Token> = tokenize(&s).collect();
            let once = process_tokens(raw.clone());
            let twice = process_tokens(once.clone());
            prop_assert!(once.len() <= raw.len());
            prop_assert_eq!(once, twice);
        }
    }
}
