//! Interactive host: reedline editing with completion, highlighting and history.

use std::borrow::Cow;
use std::path::PathBuf;

use colored::Colorize;
use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Completer, Emacs, FileBackedHistory, Highlighter,
    KeyCode, KeyModifiers, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, Reedline, ReedlineEvent, ReedlineMenu, Signal, Span, StyledText,
    Suggestion, ValidationResult, Validator,
};
use restsh_core::completer::Completer as ShellCompletion;
use restsh_core::lexer::{self, tokenize};
use restsh_core::token::{Category, TokenKind};
use restsh_core::url_lexer::tokenize_url;
use restsh_core::vm::Vm;
use tracing::warn;

use crate::display::print_outcome;

/// Adapts the core completer to reedline suggestions.
pub struct ShellCompleter {
    inner: ShellCompletion,
}

impl ShellCompleter {
    pub fn new(inner: ShellCompletion) -> Self {
        Self { inner }
    }
}

impl Completer for ShellCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        self.inner
            .complete(line, pos)
            .into_iter()
            .map(|c| {
                let start = replaced_start(line, pos, c.start_position);
                Suggestion {
                    value: c.text,
                    description: None,
                    style: None,
                    extra: None,
                    span: Span::new(start, pos),
                    append_whitespace: false,
                    match_indices: None,
                }
            })
            .collect()
    }
}

/// Byte offset `chars` characters before `pos` (`chars` is zero or negative).
fn replaced_start(line: &str, pos: usize, chars: isize) -> usize {
    let back = chars.unsigned_abs();
    line[..pos]
        .char_indices()
        .rev()
        .nth(back.saturating_sub(1))
        .map_or(pos, |(i, _)| if back == 0 { pos } else { i })
}

/// Colours tokens by category; paths are split into their URL parts.
#[derive(Default)]
pub struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        let mut previous = None;
        for token in tokenize(line) {
            if token.kind == TokenKind::Literal && previous == Some(TokenKind::HttpMethod) {
                for part in tokenize_url(&token.text, token.start) {
                    styled.push((style_for(part.kind), part.text));
                }
            } else {
                styled.push((style_for(token.kind), token.text.clone()));
            }
            if token.kind != TokenKind::Whitespace {
                previous = Some(token.kind);
            }
        }
        styled
    }
}

fn style_for(kind: TokenKind) -> Style {
    match kind.category() {
        Category::Whitespace => Style::new(),
        Category::Comment => Style::new().fg(Color::DarkGray).italic(),
        Category::Error => Style::new().fg(Color::Red).underline(),
        Category::Keyword => Style::new().fg(Color::Cyan).bold(),
        Category::Name => Style::new().fg(Color::Blue),
        Category::Punctuation => Style::new().fg(Color::LightGray),
        Category::String => Style::new().fg(Color::Green),
        Category::Number => Style::new().fg(Color::Magenta),
        Category::Literal => Style::new().fg(Color::Yellow),
        Category::Url => Style::new().fg(Color::Yellow).underline(),
    }
}

/// Enter inserts a newline while an object, array or string is still open.
pub struct ShellValidator;

impl Validator for ShellValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        if lexer::is_open(line) {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

struct ShellPrompt {
    label: String,
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(Color::Blue.bold().paint(self.label.as_str()).to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Owned(format!("{} ", Color::Green.bold().paint(">")))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("restsh").join("history.txt"))
}

fn line_editor(completer: ShellCompletion, history_size: usize) -> Reedline {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("completion_menu")
            .with_text_style(Style::new().fg(Color::Cyan))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan).bold()),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    let mut editor = Reedline::create()
        .with_completer(Box::new(ShellCompleter::new(completer)))
        .with_highlighter(Box::new(ShellHighlighter))
        .with_validator(Box::new(ShellValidator))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if let Some(path) = history_path() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(history_size, path) {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(e) => warn!(error = %e, "history disabled"),
        }
    }
    editor
}

/// Read, execute and print until end of input.
pub fn run(vm: &mut Vm, completer: ShellCompletion, history_size: usize, pretty: bool) {
    let mut editor = line_editor(completer, history_size);
    loop {
        let prompt = ShellPrompt {
            label: match vm.connections().get(vm.current()) {
                Some(c) => format!("[{}] {}", vm.current(), c.name),
                None => String::new(),
            },
        };
        match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match vm.run_source(&line) {
                    Ok(outcomes) => outcomes.iter().for_each(|o| print_outcome(o, pretty)),
                    Err(e) => eprintln!("{} {}", "✖".red().bold(), e),
                }
            }
            Ok(Signal::CtrlC) => continue,
            Ok(Signal::CtrlD) => break,
            Err(e) => {
                eprintln!("{} {}", "✖".red().bold(), e);
                break;
            }
        }
    }
}
