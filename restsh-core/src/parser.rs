/// Parser: converts the normalized token stream into statements.
use tracing::debug;

use crate::ast::{ApiCall, FuncCall, HttpMethod, NumberKind, Statement, Value};
use crate::error::SyntaxError;
use crate::lexer::tokenize;
use crate::normalize::{is_closed_string, process_tokens};
use crate::token::{Token, TokenKind};

/// Parse shell input into statements, in input order.
pub fn parse(text: &str) -> Result<Vec<Statement>, SyntaxError> {
    let tokens = process_tokens(tokenize(text));
    debug!(tokens = tokens.len(), "parsing input");
    Parser {
        text,
        tokens,
        pos: 0,
    }
    .statements()
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Error pointing at the current token, or at end of input.
    fn error(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => SyntaxError::new(self.text, token.start, expected, describe(token)),
            None => SyntaxError::new(self.text, self.text.len(), expected, "end of input"),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, SyntaxError> {
        if self.peek_kind() == Some(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.error(expected))
    }

    /// Whether the current token is the first one on its line.
    fn at_line_start(&self) -> bool {
        self.peek().is_some_and(|token| {
            let line_start = self.text[..token.start].rfind('\n').map_or(0, |i| i + 1);
            self.text[line_start..token.start].trim().is_empty()
        })
    }

    fn skip_comments(&mut self) {
        while self.peek_kind() == Some(TokenKind::Comment) {
            self.pos += 1;
        }
    }

    fn statements(mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut statements = Vec::new();
        while let Some(token) = self.peek() {
            let kind = token.kind;
            let statement = match kind {
                TokenKind::Comment => {
                    let text = token.text.clone();
                    self.pos += 1;
                    Statement::Comment(text)
                }
                TokenKind::BlankLine => {
                    self.pos += 1;
                    Statement::Blank
                }
                TokenKind::HttpMethod => Statement::ApiCall(self.api_call()?),
                TokenKind::FuncName | TokenKind::Percent => Statement::FuncCall(self.func_call()?),
                _ => return Err(self.error("statement")),
            };
            statements.push(statement);
        }
        debug!(count = statements.len(), "parsed statements");
        Ok(statements)
    }

    fn api_call(&mut self) -> Result<ApiCall, SyntaxError> {
        let head = self.expect(TokenKind::HttpMethod, "HTTP method")?;
        let method: HttpMethod = head
            .text
            .parse()
            .map_err(|_| SyntaxError::new(self.text, head.start, "HTTP method", describe(&head)))?;

        let path = self.expect(TokenKind::Literal, "path")?;
        let path = if path.text.starts_with('/') {
            path.text
        } else {
            format!("/{}", path.text)
        };

        let mut options = Vec::new();
        let mut payload = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::BlankLine | TokenKind::Percent) => break,
                Some(TokenKind::HttpMethod) if self.at_line_start() => break,
                Some(TokenKind::Comment) => self.pos += 1,
                Some(TokenKind::KeyName) if payload.is_empty() => options.push(self.option()?),
                Some(TokenKind::CurlyLeft) => payload.push(self.value()?),
                Some(_) if payload.is_empty() => {
                    return Err(self.error("call option or payload object"))
                }
                Some(_) => return Err(self.error("payload object")),
            }
        }

        Ok(ApiCall {
            method,
            path,
            options,
            payload,
            offset: head.start,
        })
    }

    fn func_call(&mut self) -> Result<FuncCall, SyntaxError> {
        let offset = self.peek().map_or(self.text.len(), |t| t.start);
        let symbol = self.peek_kind() == Some(TokenKind::Percent);
        let name = if symbol {
            self.pos += 1;
            self.expect(TokenKind::CommandName, "command name")?
        } else {
            self.expect(TokenKind::FuncName, "function name")?
        };

        let mut args = Vec::new();
        let mut options = Vec::new();
        let mut last_end = name.end();
        while let Some(token) = self.peek() {
            let kind = token.kind;
            if kind == TokenKind::BlankLine
                || kind.is_statement_head()
                || self.text[last_end..token.start].contains('\n')
            {
                break;
            }
            match kind {
                TokenKind::Comment => self.pos += 1,
                TokenKind::KeyName => options.push(self.option()?),
                _ => args.push(self.value()?),
            }
            last_end = self.tokens[self.pos - 1].end();
        }

        Ok(FuncCall {
            name: name.text,
            symbol,
            args,
            options,
            offset,
        })
    }

    fn option(&mut self) -> Result<(String, Value), SyntaxError> {
        let name = self.expect(TokenKind::KeyName, "option name")?;
        self.expect(TokenKind::Assign, "'=' after option name")?;
        let value = self.value()?;
        Ok((name.text, value))
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("value"));
        };
        let value = match token.kind {
            TokenKind::CurlyLeft => return self.object(),
            TokenKind::BracketLeft => return self.array(),
            kind if kind.is_string() => Value::String(self.string(&token)?),
            TokenKind::NumberInteger => number(token.text, NumberKind::Integer),
            TokenKind::NumberFloat => number(token.text, NumberKind::Float),
            TokenKind::NumberHex => number(token.text, NumberKind::Hex),
            TokenKind::NumberOct => number(token.text, NumberKind::Oct),
            TokenKind::NumberBin => number(token.text, NumberKind::Bin),
            TokenKind::BuiltinLiteral => match token.text.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Null,
            },
            TokenKind::Literal => Value::Literal(token.text),
            _ => return Err(self.error("value")),
        };
        self.pos += 1;
        Ok(value)
    }

    fn object(&mut self) -> Result<Value, SyntaxError> {
        self.expect(TokenKind::CurlyLeft, "'{'")?;
        let mut entries = Vec::new();
        self.skip_comments();
        if self.peek_kind() == Some(TokenKind::CurlyRight) {
            self.pos += 1;
            return Ok(Value::Object(entries));
        }
        loop {
            self.skip_comments();
            let key = match self.peek().cloned() {
                Some(token) if token.kind == TokenKind::StringSymbol => {
                    let key = self.string(&token)?;
                    self.pos += 1;
                    key
                }
                _ => return Err(self.error("object key")),
            };
            self.skip_comments();
            self.expect(TokenKind::Colon, "':'")?;
            self.skip_comments();
            entries.push((key, self.value()?));
            self.skip_comments();
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.pos += 1;
                    self.skip_comments();
                    if self.peek_kind() == Some(TokenKind::CurlyRight) {
                        self.pos += 1;
                        return Ok(Value::Object(entries));
                    }
                }
                Some(TokenKind::CurlyRight) => {
                    self.pos += 1;
                    return Ok(Value::Object(entries));
                }
                _ => return Err(self.error("',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Value, SyntaxError> {
        self.expect(TokenKind::BracketLeft, "'['")?;
        let mut items = Vec::new();
        self.skip_comments();
        if self.peek_kind() == Some(TokenKind::BracketRight) {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_comments();
            items.push(self.value()?);
            self.skip_comments();
            match self.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.pos += 1;
                    self.skip_comments();
                    if self.peek_kind() == Some(TokenKind::BracketRight) {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                }
                Some(TokenKind::BracketRight) => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                _ => return Err(self.error("',' or ']'")),
            }
        }
    }

    fn string(&self, token: &Token) -> Result<String, SyntaxError> {
        if !is_closed_string(&token.text) {
            return Err(SyntaxError::new(
                self.text,
                token.end(),
                "closing quote",
                "end of line",
            ));
        }
        unquote(&token.text).ok_or_else(|| {
            SyntaxError::new(
                self.text,
                token.start,
                "four hex digits after \\u",
                describe(token),
            )
        })
    }
}

fn number(text: String, kind: NumberKind) -> Value {
    Value::Number { text, kind }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::BlankLine => "blank line".to_string(),
        _ => format!("'{}'", token.text),
    }
}

/// Strip the surrounding quotes (single or tripled) and resolve escape sequences.
///
/// `None` when a `\u` escape is not followed by four hex digits. Unpaired
/// surrogates decode to U+FFFD.
fn unquote(text: &str) -> Option<String> {
    let quote_len = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = &text[quote_len..text.len() - quote_len];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let unit = hex4(&mut chars)?;
                let decoded = match unit {
                    0xD800..=0xDBFF => {
                        let mut ahead = chars.clone();
                        let low = match (ahead.next(), ahead.next()) {
                            (Some('\\'), Some('u')) => hex4(&mut ahead)
                                .filter(|low| (0xDC00..=0xDFFF).contains(low)),
                            _ => None,
                        };
                        match low {
                            Some(low) => {
                                chars = ahead;
                                char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                            }
                            None => None,
                        }
                    }
                    _ => char::from_u32(unit),
                };
                out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Some(out)
}

/// Exactly four hex digits (no sign) as one UTF-16 code unit.
fn hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut unit = 0;
    for _ in 0..4 {
        unit = unit * 16 + chars.next()?.to_digit(16)?;
    }
    Some(unit)
}
