//! Token model shared by the lexer, the URL sub-lexer, the parser and the completer.

use std::fmt;

/// Coarse grouping of token kinds, used by highlighting and by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Whitespace,
    Comment,
    Error,
    Keyword,
    Name,
    Punctuation,
    String,
    Number,
    Literal,
    Url,
}

/// Every kind of token the lexers can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    Whitespace,
    Comment,
    BlankLine,
    Error,

    // Statement head
    HttpMethod,
    FuncName,
    Percent,
    CommandName,

    // URL region
    PathPart,
    Slash,
    QuestionMark,
    Ampersand,
    ParamName,
    ParamValue,
    Equals,

    // Payload region
    CurlyLeft,
    CurlyRight,
    BracketLeft,
    BracketRight,
    Colon,
    Comma,
    StringSymbol,
    StringDouble,
    StringSingle,
    StringEscape,
    NumberInteger,
    NumberFloat,
    NumberHex,
    NumberOct,
    NumberBin,
    BuiltinLiteral,

    // Function-call region
    KeyName,
    Assign,
    Literal,
}

impl TokenKind {
    pub fn category(self) -> Category {
        use TokenKind::*;
        match self {
            Whitespace | BlankLine => Category::Whitespace,
            Comment => Category::Comment,
            Error => Category::Error,
            HttpMethod | Percent | CommandName => Category::Keyword,
            FuncName | KeyName | ParamName => Category::Name,
            CurlyLeft | CurlyRight | BracketLeft | BracketRight | Colon | Comma | Assign
            | Equals => Category::Punctuation,
            StringSymbol | StringDouble | StringSingle | StringEscape => Category::String,
            NumberInteger | NumberFloat | NumberHex | NumberOct | NumberBin => Category::Number,
            BuiltinLiteral | Literal | ParamValue => Category::Literal,
            PathPart | Slash | QuestionMark | Ampersand => Category::Url,
        }
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::StringSymbol | TokenKind::StringDouble | TokenKind::StringSingle
        )
    }

    pub fn is_number(self) -> bool {
        self.category() == Category::Number
    }

    /// Kinds that open a new statement.
    pub fn is_statement_head(self) -> bool {
        matches!(
            self,
            TokenKind::HttpMethod | TokenKind::FuncName | TokenKind::Percent
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::BlankLine => "blank line",
            TokenKind::Error => "unrecognized text",
            TokenKind::HttpMethod => "HTTP method",
            TokenKind::FuncName => "function name",
            TokenKind::Percent => "'%'",
            TokenKind::CommandName => "command name",
            TokenKind::PathPart => "path segment",
            TokenKind::Slash => "'/'",
            TokenKind::QuestionMark => "'?'",
            TokenKind::Ampersand => "'&'",
            TokenKind::ParamName => "parameter name",
            TokenKind::ParamValue => "parameter value",
            TokenKind::Equals => "'='",
            TokenKind::CurlyLeft => "'{'",
            TokenKind::CurlyRight => "'}'",
            TokenKind::BracketLeft => "'['",
            TokenKind::BracketRight => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::StringSymbol => "object key",
            TokenKind::StringDouble | TokenKind::StringSingle => "string",
            TokenKind::StringEscape => "escape sequence",
            TokenKind::NumberInteger
            | TokenKind::NumberFloat
            | TokenKind::NumberHex
            | TokenKind::NumberOct
            | TokenKind::NumberBin => "number",
            TokenKind::BuiltinLiteral => "literal",
            TokenKind::KeyName => "option name",
            TokenKind::Assign => "'='",
            TokenKind::Literal => "path or bare word",
        };
        f.write_str(s)
    }
}

/// A token with its absolute byte offset in the lexed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
        }
    }

    /// Byte offset one past the last byte of the token.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Right-inclusive containment: a cursor sitting just after the token is inside it.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_right_inclusive() {
        let token = Token::new(TokenKind::FuncName, "echo", 3);
        assert!(token.contains(3));
        assert!(token.contains(7));
        assert!(!token.contains(2));
        assert!(!token.contains(8));
        assert_eq!(token.end(), 7);
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::CurlyLeft.category(), Category::Punctuation);
        assert_eq!(TokenKind::NumberHex.category(), Category::Number);
        assert!(TokenKind::StringSingle.is_string());
        assert!(!TokenKind::StringEscape.is_string());
        assert!(TokenKind::Percent.is_statement_head());
        assert!(!TokenKind::CommandName.is_statement_head());
    }
}
