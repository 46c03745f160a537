use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use restsh_core::client::ConnectOptions;
use restsh_core::completer::Completer;
use restsh_core::format::{format_statements, Style};
use restsh_core::functions::builtin_functions;
use restsh_core::parser;
use restsh_core::spec::ApiSpec;
use restsh_core::vm::Vm;
use tracing_subscriber::EnvFilter;

mod config;
mod display;
mod repl;
mod reqwest_client;

use config::Config;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatStyle {
    Pretty,
    Compact,
}

/// restsh: an interactive shell for document-store REST APIs
#[derive(Parser, Debug)]
#[command(name = "restsh", version, about = "Interactive shell for document-store REST APIs")]
struct Cli {
    /// Script to execute; starts the interactive shell when omitted
    file: Option<PathBuf>,

    /// Settings file (defaults to restsh/config.toml in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated host URLs
    #[arg(long, value_delimiter = ',')]
    hosts: Vec<String>,

    #[arg(short, long)]
    username: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    /// Directory of endpoint spec JSON files used for completion
    #[arg(long)]
    spec_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Print requests instead of sending them
    #[arg(short, long)]
    dry_run: bool,

    /// Reformat the script and print it instead of executing
    #[arg(long, value_enum, requires = "file")]
    format: Option<FormatStyle>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if !self.hosts.is_empty() {
            config.hosts = self.hosts.clone();
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        if self.api_key.is_some() {
            config.api_key = self.api_key.clone();
        }
        if self.spec_dir.is_some() {
            config.spec_dir = self.spec_dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✖".red().bold(), message);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => fail(e),
    };
    cli.apply(&mut config);
    init_tracing(&config.log_level);

    let script = cli.file.as_ref().map(|path| match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => fail(format!(
            "Error reading file '{}': {}",
            path.display().to_string().bold(),
            e
        )),
    });

    if let (Some(style), Some(text)) = (cli.format, &script) {
        let style = match style {
            FormatStyle::Pretty => Style::Pretty,
            FormatStyle::Compact => Style::Compact,
        };
        match parser::parse(text) {
            Ok(statements) => print!("{}", format_statements(&statements, style)),
            Err(e) => fail(e),
        }
        return;
    }

    let options = ConnectOptions {
        hosts: config.hosts.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
        api_key: config.api_key.clone(),
    };
    let client = match reqwest_client::ReqwestClient::new(options) {
        Ok(c) => c,
        Err(e) => fail(e),
    };
    let functions = Arc::new(builtin_functions());
    let mut vm = Vm::new(
        Box::new(client),
        Box::new(reqwest_client::ReqwestConnector),
        Arc::clone(&functions),
    )
    .with_dry_run(cli.dry_run);

    match script {
        Some(text) => {
            let statements = match parser::parse(&text) {
                Ok(s) => s,
                Err(e) => fail(e),
            };
            for statement in &statements {
                match vm.execute(statement) {
                    Ok(outcomes) => outcomes
                        .iter()
                        .for_each(|o| display::print_outcome(o, config.pretty)),
                    Err(e) => fail(e),
                }
            }
        }
        None => {
            let spec = Arc::new(ApiSpec::load_dir(&config.spec_dir()));
            let completer = Completer::new(spec, functions);
            repl::run(&mut vm, completer, config.history_size, config.pretty);
        }
    }
}
