//! Lexer (tokenizer) for shell input.
//!
//! The lexer keeps an explicit stack of [`Mode`]s. Every mode owns an ordered
//! list of rule groups; at each position the first rule of the top mode that
//! matches consumes its text, emits one token per non-empty group, and then
//! moves the mode stack. When nothing matches, a single character is emitted
//! as [`TokenKind::Error`] so scanning always advances.

use std::collections::VecDeque;

use crate::token::{Token, TokenKind as K};

pub const HTTP_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Lexical regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Root,
    /// The single path token after an HTTP method.
    Path,
    /// `name=value` call options on the rest of the request line.
    Options,
    /// Top-level payload objects following the request line.
    Payload,
    /// The name after a `%`.
    Command,
    /// Arguments of a function call, up to the end of the line.
    Args,
    /// Exactly one value after `name=`.
    Value,
    DictKey,
    DictValue,
    ArrayValues,
    Dqs,
    Sqs,
    DqsKey,
    SqsKey,
    /// `"""…"""`, may span lines.
    Tdqs,
    /// `'''…'''`, may span lines.
    Tsqs,
}

impl Mode {
    /// Regions that only close on an explicit delimiter.
    fn is_open(self) -> bool {
        matches!(
            self,
            Mode::DictKey
                | Mode::DictValue
                | Mode::ArrayValues
                | Mode::Dqs
                | Mode::Sqs
                | Mode::DqsKey
                | Mode::SqsKey
                | Mode::Tdqs
                | Mode::Tsqs
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Goto {
    Stay,
    Push(Mode),
    Pop,
    /// Replace the top mode.
    Switch(Mode),
    SwitchPush(Mode, Mode),
    /// A complete scalar value: ends a `Value` region, otherwise stays.
    Scalar,
    /// A value that opens a region: replaces a `Value` region, otherwise pushes.
    Open(Mode),
}

/// Returns the byte length of each matched group, or `None` when the rule does not apply.
type Matcher = fn(&Scanner<'_>) -> Option<Vec<usize>>;

struct Rule {
    matcher: Matcher,
    kinds: &'static [K],
    goto: Goto,
}

const fn rule(matcher: Matcher, kinds: &'static [K], goto: Goto) -> Rule {
    Rule {
        matcher,
        kinds,
        goto,
    }
}

// ── Rule tables ──────────────────────────────────────────────────────

const ROOT: &[&[Rule]] = &[&[
    rule(blank_line, &[K::BlankLine], Goto::Stay),
    rule(horizontal_space, &[K::Whitespace], Goto::Stay),
    rule(newline, &[K::Whitespace], Goto::Stay),
    rule(comment, &[K::Comment], Goto::Stay),
    rule(http_method, &[K::HttpMethod], Goto::Push(Mode::Path)),
    rule(leading_percent, &[K::Percent], Goto::Push(Mode::Command)),
    rule(identifier, &[K::FuncName], Goto::Push(Mode::Args)),
]];

const PATH: &[&[Rule]] = &[&[
    rule(
        path_literal,
        &[K::Whitespace, K::Literal],
        Goto::Switch(Mode::Options),
    ),
    rule(nothing, &[], Goto::Pop),
]];

const OPTIONS: &[&[Rule]] = &[&[
    rule(blank_line, &[K::BlankLine], Goto::Pop),
    rule(horizontal_space, &[K::Whitespace], Goto::Stay),
    rule(newline, &[K::Whitespace], Goto::Switch(Mode::Payload)),
    rule(comment, &[K::Comment], Goto::Stay),
    rule(
        option_assign,
        &[K::KeyName, K::Whitespace, K::Assign, K::Whitespace],
        Goto::Push(Mode::Value),
    ),
    rule(identifier, &[K::KeyName], Goto::Stay),
    rule(
        curly_left,
        &[K::CurlyLeft],
        Goto::SwitchPush(Mode::Payload, Mode::DictKey),
    ),
]];

const PAYLOAD: &[&[Rule]] = &[&[
    rule(blank_line, &[K::BlankLine], Goto::Pop),
    rule(horizontal_space, &[K::Whitespace], Goto::Stay),
    rule(newline, &[K::Whitespace], Goto::Stay),
    rule(comment, &[K::Comment], Goto::Stay),
    rule(curly_left, &[K::CurlyLeft], Goto::Push(Mode::DictKey)),
    rule(nothing, &[], Goto::Pop),
]];

const COMMAND: &[&[Rule]] = &[&[
    rule(horizontal_space, &[K::Whitespace], Goto::Stay),
    rule(identifier, &[K::CommandName], Goto::Switch(Mode::Args)),
    rule(nothing, &[], Goto::Pop),
]];

const ARGS: &[&[Rule]] = &[
    &[
        rule(line_end, &[], Goto::Pop),
        rule(horizontal_space, &[K::Whitespace], Goto::Stay),
        rule(comment, &[K::Comment], Goto::Stay),
        rule(
            option_assign,
            &[K::KeyName, K::Whitespace, K::Assign, K::Whitespace],
            Goto::Push(Mode::Value),
        ),
    ],
    VALUES,
    NUMBERS,
    &[rule(bare_word, &[K::Literal], Goto::Stay)],
];

const VALUE: &[&[Rule]] = &[
    &[rule(horizontal_space, &[K::Whitespace], Goto::Stay)],
    VALUES,
    NUMBERS,
    &[
        rule(bare_word, &[K::Literal], Goto::Scalar),
        rule(nothing, &[], Goto::Pop),
    ],
];

const DICT_KEY: &[&[Rule]] = &[&[
    rule(any_space, &[K::Whitespace], Goto::Stay),
    rule(comment, &[K::Comment], Goto::Stay),
    rule(double_quote, &[K::StringSymbol], Goto::Push(Mode::DqsKey)),
    rule(single_quote, &[K::StringSymbol], Goto::Push(Mode::SqsKey)),
    rule(colon, &[K::Colon], Goto::Switch(Mode::DictValue)),
    rule(curly_right, &[K::CurlyRight], Goto::Pop),
]];

const DICT_VALUE: &[&[Rule]] = &[
    &[
        rule(any_space, &[K::Whitespace], Goto::Stay),
        rule(comment, &[K::Comment], Goto::Stay),
        rule(comma, &[K::Comma], Goto::Switch(Mode::DictKey)),
        rule(curly_right, &[K::CurlyRight], Goto::Pop),
    ],
    VALUES,
    NUMBERS,
    NAMES,
];

const ARRAY_VALUES: &[&[Rule]] = &[
    &[
        rule(any_space, &[K::Whitespace], Goto::Stay),
        rule(comment, &[K::Comment], Goto::Stay),
        rule(comma, &[K::Comma], Goto::Stay),
        rule(bracket_right, &[K::BracketRight], Goto::Pop),
    ],
    VALUES,
    NUMBERS,
    NAMES,
];

const VALUES: &[Rule] = &[
    rule(curly_left, &[K::CurlyLeft], Goto::Open(Mode::DictKey)),
    rule(bracket_left, &[K::BracketLeft], Goto::Open(Mode::ArrayValues)),
    rule(triple_double, &[K::StringDouble], Goto::Open(Mode::Tdqs)),
    rule(triple_single, &[K::StringSingle], Goto::Open(Mode::Tsqs)),
    rule(double_quote, &[K::StringDouble], Goto::Open(Mode::Dqs)),
    rule(single_quote, &[K::StringSingle], Goto::Open(Mode::Sqs)),
    rule(builtin_literal, &[K::BuiltinLiteral], Goto::Scalar),
];

/// Order matters: floats before octal before plain integers.
const NUMBERS: &[Rule] = &[
    rule(float, &[K::NumberFloat], Goto::Scalar),
    rule(octal, &[K::NumberOct], Goto::Scalar),
    rule(binary, &[K::NumberBin], Goto::Scalar),
    rule(hex, &[K::NumberHex], Goto::Scalar),
    rule(long_integer, &[K::NumberInteger], Goto::Scalar),
    rule(integer, &[K::NumberInteger], Goto::Scalar),
];

const NAMES: &[Rule] = &[rule(identifier, &[K::Literal], Goto::Scalar)];

const DQS: &[&[Rule]] = &[&[
    rule(double_quote, &[K::StringDouble], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(double_quoted_run, &[K::StringDouble], Goto::Stay),
    rule(nothing, &[], Goto::Pop),
]];

const SQS: &[&[Rule]] = &[&[
    rule(single_quote, &[K::StringSingle], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(single_quoted_run, &[K::StringSingle], Goto::Stay),
    rule(nothing, &[], Goto::Pop),
]];

const DQS_KEY: &[&[Rule]] = &[&[
    rule(double_quote, &[K::StringSymbol], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(double_quoted_run, &[K::StringSymbol], Goto::Stay),
    rule(nothing, &[], Goto::Pop),
]];

const SQS_KEY: &[&[Rule]] = &[&[
    rule(single_quote, &[K::StringSymbol], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(single_quoted_run, &[K::StringSymbol], Goto::Stay),
    rule(nothing, &[], Goto::Pop),
]];

const TDQS: &[&[Rule]] = &[&[
    rule(triple_double, &[K::StringDouble], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(triple_double_run, &[K::StringDouble], Goto::Stay),
    rule(any_char, &[K::StringDouble], Goto::Stay),
]];

const TSQS: &[&[Rule]] = &[&[
    rule(triple_single, &[K::StringSingle], Goto::Pop),
    rule(escape, &[K::StringEscape], Goto::Stay),
    rule(triple_single_run, &[K::StringSingle], Goto::Stay),
    rule(any_char, &[K::StringSingle], Goto::Stay),
]];

fn rules(mode: Mode) -> &'static [&'static [Rule]] {
    match mode {
        Mode::Root => ROOT,
        Mode::Path => PATH,
        Mode::Options => OPTIONS,
        Mode::Payload => PAYLOAD,
        Mode::Command => COMMAND,
        Mode::Args => ARGS,
        Mode::Value => VALUE,
        Mode::DictKey => DICT_KEY,
        Mode::DictValue => DICT_VALUE,
        Mode::ArrayValues => ARRAY_VALUES,
        Mode::Dqs => DQS,
        Mode::Sqs => SQS,
        Mode::DqsKey => DQS_KEY,
        Mode::SqsKey => SQS_KEY,
        Mode::Tdqs => TDQS,
        Mode::Tsqs => TSQS,
    }
}

// ── Matchers ─────────────────────────────────────────────────────────

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Only horizontal whitespace between the start of the line and the current position.
    fn at_line_start(&self) -> bool {
        let line_start = self.text[..self.pos].rfind('\n').map_or(0, |i| i + 1);
        self.text[line_start..self.pos]
            .bytes()
            .all(is_horizontal_space)
    }
}

fn is_horizontal_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c')
}

fn horizontal_len(s: &str) -> usize {
    s.bytes().take_while(|b| is_horizontal_space(*b)).count()
}

fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
            1 + bytes[1..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count()
        }
        _ => 0,
    }
}

fn single(len: usize) -> Option<Vec<usize>> {
    (len > 0).then(|| vec![len])
}

fn prefix(s: &str, p: &str) -> Option<Vec<usize>> {
    s.starts_with(p).then(|| vec![p.len()])
}

fn nothing(_: &Scanner<'_>) -> Option<Vec<usize>> {
    Some(Vec::new())
}

fn line_end(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    sc.rest().starts_with('\n').then(Vec::new)
}

fn blank_line(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    if !s.starts_with('\n') {
        return None;
    }
    let mut end = None;
    let mut i = 1;
    loop {
        let ws = horizontal_len(&s[i..]);
        if s[i + ws..].starts_with('\n') {
            i += ws + 1;
            end = Some(i);
        } else {
            break;
        }
    }
    end.map(|e| vec![e])
}

fn horizontal_space(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    single(horizontal_len(sc.rest()))
}

fn any_space(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(|c: char| !c.is_whitespace()).unwrap_or(s.len()))
}

fn newline(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "\n")
}

fn comment(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    s.starts_with("//")
        .then(|| vec![s.find('\n').unwrap_or(s.len())])
}

fn identifier(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    single(identifier_len(sc.rest()))
}

fn http_method(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let len = identifier_len(s);
    let word = &s[..len];
    HTTP_METHODS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(word))
        .then(|| vec![len])
}

fn leading_percent(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    if sc.rest().starts_with('%') && sc.at_line_start() {
        Some(vec![1])
    } else {
        None
    }
}

fn path_literal(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let ws = horizontal_len(s);
    let word = &s[ws..];
    let len = word.find(char::is_whitespace).unwrap_or(word.len());
    (len > 0).then(|| vec![ws, len])
}

fn option_assign(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let name = identifier_len(s);
    if name == 0 {
        return None;
    }
    let before = horizontal_len(&s[name..]);
    let at = name + before;
    if !s[at..].starts_with('=') {
        return None;
    }
    let after = horizontal_len(&s[at + 1..]);
    Some(vec![name, before, 1, after])
}

fn bare_word(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(char::is_whitespace).unwrap_or(s.len()))
}

fn curly_left(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "{")
}

fn curly_right(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "}")
}

fn bracket_left(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "[")
}

fn bracket_right(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "]")
}

fn colon(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), ":")
}

fn comma(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), ",")
}

fn double_quote(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "\"")
}

fn single_quote(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "'")
}

fn triple_double(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "\"\"\"")
}

fn triple_single(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    prefix(sc.rest(), "'''")
}

fn any_char(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    single(sc.rest().chars().next().map_or(0, char::len_utf8))
}

fn escape(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let mut chars = sc.rest().chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), Some(c)) if c != '\n' => Some(vec![1 + c.len_utf8()]),
        _ => None,
    }
}

fn double_quoted_run(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(['\\', '\n', '"']).unwrap_or(s.len()))
}

fn single_quoted_run(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(['\\', '\n', '\'']).unwrap_or(s.len()))
}

/// Newlines included; a lone quote is left for `any_char`.
fn triple_double_run(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(['\\', '"']).unwrap_or(s.len()))
}

fn triple_single_run(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    single(s.find(['\\', '\'']).unwrap_or(s.len()))
}

fn builtin_literal(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let len = identifier_len(s);
    matches!(&s[..len], "true" | "false" | "null").then(|| vec![len])
}

// ── Numbers ──

fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+' | b'-')))
}

fn count_from(bytes: &[u8], from: usize, pred: fn(&u8) -> bool) -> usize {
    bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| pred(*b)).count())
}

fn exponent_len(bytes: &[u8], at: usize) -> usize {
    if !matches!(bytes.get(at), Some(b'e' | b'E')) {
        return 0;
    }
    let sign = usize::from(matches!(bytes.get(at + 1), Some(b'+' | b'-')));
    let digits = count_from(bytes, at + 1 + sign, u8::is_ascii_digit);
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

/// A number must not run straight into a word character.
fn bounded(s: &str, len: usize) -> Option<Vec<usize>> {
    match s[len..].chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '.' => None,
        _ => Some(vec![len]),
    }
}

fn float(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let int = count_from(bytes, sign, u8::is_ascii_digit);
    let mut end = sign + int;
    if bytes.get(end) == Some(&b'.') {
        let frac = count_from(bytes, end + 1, u8::is_ascii_digit);
        if int + frac > 0 {
            end += 1 + frac;
            end += exponent_len(bytes, end);
            return bounded(s, end);
        }
    }
    if int > 0 {
        let exp = exponent_len(bytes, end);
        if exp > 0 {
            return bounded(s, end + exp);
        }
    }
    None
}

fn octal(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    if bytes.get(sign) != Some(&b'0') {
        return None;
    }
    let digits = count_from(bytes, sign + 1, |b| (b'0'..=b'7').contains(b));
    if digits == 0 {
        return None;
    }
    bounded(s, sign + 1 + digits)
}

fn radix_prefixed(sc: &Scanner<'_>, marker: u8, pred: fn(&u8) -> bool) -> Option<Vec<usize>> {
    let s = sc.rest();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    if bytes.get(sign) != Some(&b'0')
        || !bytes
            .get(sign + 1)
            .is_some_and(|b| b.eq_ignore_ascii_case(&marker))
    {
        return None;
    }
    let digits = count_from(bytes, sign + 2, pred);
    if digits == 0 {
        return None;
    }
    bounded(s, sign + 2 + digits)
}

fn binary(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    radix_prefixed(sc, b'b', |b| matches!(b, b'0' | b'1'))
}

fn hex(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    radix_prefixed(sc, b'x', u8::is_ascii_hexdigit)
}

fn long_integer(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = count_from(bytes, sign, u8::is_ascii_digit);
    if digits == 0 || bytes.get(sign + digits) != Some(&b'L') {
        return None;
    }
    bounded(s, sign + digits + 1)
}

fn integer(sc: &Scanner<'_>) -> Option<Vec<usize>> {
    let s = sc.rest();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = count_from(bytes, sign, u8::is_ascii_digit);
    if digits == 0 {
        return None;
    }
    bounded(s, sign + digits)
}

// ── Lexer ────────────────────────────────────────────────────────────

/// A lazy token stream over one input text.
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    stack: Vec<Mode>,
    pending: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            stack: vec![Mode::Root],
            pending: VecDeque::new(),
        }
    }

    /// The innermost active region.
    pub fn mode(&self) -> Mode {
        self.stack.last().copied().unwrap_or(Mode::Root)
    }

    /// True while an object, array or string is still waiting for its closing delimiter.
    pub fn is_open(&self) -> bool {
        self.stack.iter().any(|m| m.is_open())
    }

    fn push(&mut self, kind: K, len: usize) {
        let text = &self.text[self.pos..self.pos + len];
        self.pending.push_back(Token::new(kind, text, self.pos));
        self.pos += len;
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn switch(&mut self, mode: Mode) {
        self.pop();
        self.stack.push(mode);
    }

    fn apply(&mut self, goto: Goto) {
        match goto {
            Goto::Stay => {}
            Goto::Push(mode) => self.stack.push(mode),
            Goto::Pop => self.pop(),
            Goto::Switch(mode) => self.switch(mode),
            Goto::SwitchPush(mode, inner) => {
                self.switch(mode);
                self.stack.push(inner);
            }
            Goto::Scalar => {
                if self.mode() == Mode::Value {
                    self.pop();
                }
            }
            Goto::Open(mode) => {
                if self.mode() == Mode::Value {
                    self.switch(mode);
                } else {
                    self.stack.push(mode);
                }
            }
        }
    }

    /// Run one rule of the current mode, or emit one error character.
    fn step(&mut self) {
        let scanner = Scanner {
            text: self.text,
            pos: self.pos,
        };
        for group in rules(self.mode()) {
            for rule in group.iter() {
                let Some(lengths) = (rule.matcher)(&scanner) else {
                    continue;
                };
                let consumed: usize = lengths.iter().sum();
                // Zero-width matches may only leave a region, never loop inside one.
                if consumed == 0 && !(matches!(rule.goto, Goto::Pop) && self.stack.len() > 1) {
                    continue;
                }
                for (kind, len) in rule.kinds.iter().zip(lengths) {
                    if len > 0 {
                        self.push(*kind, len);
                    }
                }
                self.apply(rule.goto);
                return;
            }
        }
        let len = self.text[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.push(K::Error, len);
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.pos >= self.text.len() {
                return None;
            }
            self.step();
        }
    }
}

/// Tokenize `text` from the beginning.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}

/// Whether `text` ends inside an unclosed object, array or string.
pub fn is_open(text: &str) -> bool {
    let mut lexer = Lexer::new(text);
    lexer.by_ref().for_each(drop);
    lexer.is_open()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<K> {
        tokenize(text)
            .filter(|t| t.kind != K::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    fn texts(text: &str) -> Vec<(K, String)> {
        tokenize(text)
            .filter(|t| t.kind != K::Whitespace)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_tokenize_method_and_path() {
        assert_eq!(
            texts("get /my-index/_doc/1?pretty"),
            vec![
                (K::HttpMethod, "get".to_string()),
                (K::Literal, "/my-index/_doc/1?pretty".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_options() {
        assert_eq!(
            kinds("GET / conn = 1 runas = \"foo\""),
            vec![
                K::HttpMethod,
                K::Literal,
                K::KeyName,
                K::Assign,
                K::NumberInteger,
                K::KeyName,
                K::Assign,
                K::StringDouble,
                K::StringDouble,
                K::StringDouble,
            ]
        );
    }

    #[test]
    fn test_tokenize_payload() {
        let input = "PUT /idx/_doc/1 // here\n{\n  \"a\": [1.5, true, null, 'x'],\n  \"b\": {\"c\": -3}\n}";
        assert_eq!(
            kinds(input),
            vec![
                K::HttpMethod,
                K::Literal,
                K::Comment,
                K::CurlyLeft,
                K::StringSymbol,
                K::StringSymbol,
                K::StringSymbol,
                K::Colon,
                K::BracketLeft,
                K::NumberFloat,
                K::Comma,
                K::BuiltinLiteral,
                K::Comma,
                K::BuiltinLiteral,
                K::Comma,
                K::StringSingle,
                K::StringSingle,
                K::StringSingle,
                K::BracketRight,
                K::Comma,
                K::StringSymbol,
                K::StringSymbol,
                K::StringSymbol,
                K::Colon,
                K::CurlyLeft,
                K::StringSymbol,
                K::StringSymbol,
                K::StringSymbol,
                K::Colon,
                K::NumberInteger,
                K::CurlyRight,
                K::CurlyRight,
            ]
        );
    }

    #[test]
    fn test_tokenize_number_family() {
        let input = "f 1.5 2e10 017 0b101 0x1F 42L 42 -7 1abc";
        assert_eq!(
            kinds(input),
            vec![
                K::FuncName,
                K::NumberFloat,
                K::NumberFloat,
                K::NumberOct,
                K::NumberBin,
                K::NumberHex,
                K::NumberInteger,
                K::NumberInteger,
                K::NumberInteger,
                K::Literal,
            ]
        );
    }

    #[test]
    fn test_tokenize_escapes() {
        let tokens = texts(r#"f "a\"b""#);
        assert_eq!(tokens[2], (K::StringDouble, "a".to_string()));
        assert_eq!(tokens[3], (K::StringEscape, "\\\"".to_string()));
        assert_eq!(tokens.last().unwrap(), &(K::StringDouble, "\"".to_string()));
    }

    #[test]
    fn test_tokenize_percent_command() {
        assert_eq!(
            texts("%conn foo=bar  // comment"),
            vec![
                (K::Percent, "%".to_string()),
                (K::CommandName, "conn".to_string()),
                (K::KeyName, "foo".to_string()),
                (K::Assign, "=".to_string()),
                (K::Literal, "bar".to_string()),
                (K::Comment, "// comment".to_string()),
            ]
        );
    }

    #[test]
    fn test_percent_only_at_line_start() {
        assert_eq!(kinds("  %help"), vec![K::Percent, K::CommandName]);
        assert_eq!(kinds("echo %x"), vec![K::FuncName, K::Literal]);
    }

    #[test]
    fn test_tokenize_function_call() {
        assert_eq!(
            texts("f @abc 1 \"a\" b=a"),
            vec![
                (K::FuncName, "f".to_string()),
                (K::Literal, "@abc".to_string()),
                (K::NumberInteger, "1".to_string()),
                (K::StringDouble, "\"".to_string()),
                (K::StringDouble, "a".to_string()),
                (K::StringDouble, "\"".to_string()),
                (K::KeyName, "b".to_string()),
                (K::Assign, "=".to_string()),
                (K::Literal, "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_line_ends_payload() {
        let input = "get a\n\n  \nget b";
        assert_eq!(
            kinds(input),
            vec![K::HttpMethod, K::Literal, K::BlankLine, K::HttpMethod, K::Literal]
        );
    }

    #[test]
    fn test_method_without_path() {
        assert_eq!(kinds("GET\n"), vec![K::HttpMethod]);
    }

    #[test]
    fn test_unrecognized_characters_become_errors() {
        assert_eq!(
            texts("$x"),
            vec![(K::Error, "$".to_string()), (K::FuncName, "x".to_string())]
        );
    }

    #[test]
    fn test_unterminated_constructs_terminate() {
        let input = "post /a\n{\"a\": \"unterminated\n";
        let joined: String = tokenize(input).map(|t| t.text).collect();
        assert_eq!(joined, input);
        assert!(is_open(input));
        assert!(!is_open("post /a\n{\"a\": 1}"));
    }

    #[test]
    fn test_tokenize_triple_quoted_strings() {
        let input = "f \"\"\"one \"two\"\nthree\"\"\" '''x''' 1";
        let tokens = texts(input);
        assert_eq!(tokens[1], (K::StringDouble, "\"\"\"".to_string()));
        assert!(tokens.iter().all(|(kind, _)| *kind != K::Error));
        assert_eq!(tokens.last().unwrap(), &(K::NumberInteger, "1".to_string()));
        assert!(tokens.contains(&(K::StringSingle, "'''".to_string())));
        let joined: String = tokenize(input).map(|t| t.text).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_triple_quoted_string_stays_open_across_lines() {
        assert!(is_open("post /a\n{\"s\": \"\"\"first\nsecond"));
        assert!(is_open("echo '''a\\'''"));
        assert!(!is_open("post /a\n{\"s\": \"\"\"first\nsecond\"\"\"}"));
        assert!(!is_open("post /a\n{\"s\": \"\"}"));
    }

    #[test]
    fn test_multibyte_error_characters() {
        let joined: String = tokenize("€ f ü").map(|t| t.text).collect();
        assert_eq!(joined, "€ f ü");
    }
}
