//! Statement execution: API calls go to the current connection, function
//! calls are dispatched to the built-in functions.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::ast::{ApiCall, FuncCall, Statement, Value};
use crate::client::{ConnectOptions, Connector, HttpClient, HttpResponse};
use crate::error::ExecError;
use crate::functions::FunctionTable;
use crate::parser::parse;

/// Header carrying the `runas` call option.
pub const RUNAS_HEADER: &str = "es-security-runas-user";

/// How deeply `run` may nest files inside files.
pub const MAX_RUN_DEPTH: usize = 8;

/// Result of executing one statement.
#[derive(Debug, Clone)]
pub enum Outcome {
    Response(HttpResponse),
    /// Rendered request, produced instead of sending in dry-run mode.
    Request(String),
    Text(String),
}

pub struct Connection {
    pub name: String,
    pub client: Box<dyn HttpClient>,
}

pub struct Vm {
    connections: Vec<Connection>,
    current: usize,
    connector: Box<dyn Connector>,
    functions: Arc<FunctionTable>,
    dry_run: bool,
    run_depth: usize,
}

impl Vm {
    pub fn new(
        client: Box<dyn HttpClient>,
        connector: Box<dyn Connector>,
        functions: Arc<FunctionTable>,
    ) -> Self {
        let name = client.describe();
        Self {
            connections: vec![Connection { name, client }],
            current: 0,
            connector,
            functions,
            dry_run: false,
            run_depth: 0,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn functions(&self) -> &Arc<FunctionTable> {
        &self.functions
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Parse `text` and execute every statement, stopping at the first failure.
    pub fn run_source(&mut self, text: &str) -> Result<Vec<Outcome>, ExecError> {
        let statements = parse(text)?;
        let mut outcomes = Vec::new();
        for statement in &statements {
            outcomes.extend(self.execute(statement)?);
        }
        Ok(outcomes)
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<Vec<Outcome>, ExecError> {
        match statement {
            Statement::ApiCall(call) => self.api_call(call).map(|o| vec![o]),
            Statement::FuncCall(call) => self.func_call(call),
            Statement::Comment(_) | Statement::Blank => Ok(Vec::new()),
        }
    }

    fn api_call(&mut self, call: &ApiCall) -> Result<Outcome, ExecError> {
        let mut index = self.current;
        let mut headers = Vec::new();
        for (name, value) in &call.options {
            match name.as_str() {
                "conn" => index = self.resolve(value)?,
                "runas" => headers.push((RUNAS_HEADER.to_string(), value.as_text())),
                _ => {
                    return Err(ExecError::UnknownOption {
                        target: "API call".to_string(),
                        name: name.clone(),
                    })
                }
            }
        }

        if self.dry_run {
            return Ok(Outcome::Request(
                Statement::ApiCall(call.clone()).format_pretty(),
            ));
        }

        let connection = &self.connections[index];
        debug!(method = %call.method, path = %call.path, connection = %connection.name, "sending request");
        let payload = call.payload_text();
        let response =
            connection
                .client
                .perform_request(call.method, &call.path, payload.as_deref(), &headers)?;
        Ok(Outcome::Response(response))
    }

    /// Find a connection by index or name.
    fn resolve(&self, value: &Value) -> Result<usize, ExecError> {
        let key = value.as_text();
        let found = match key.parse::<usize>() {
            Ok(index) => (index < self.connections.len()).then_some(index),
            Err(_) => self.connections.iter().position(|c| c.name == key),
        };
        found.ok_or(ExecError::NoSuchConnection(key))
    }

    fn func_call(&mut self, call: &FuncCall) -> Result<Vec<Outcome>, ExecError> {
        let descriptor = self
            .functions
            .get(&call.name)
            .ok_or_else(|| ExecError::UnknownFunction(call.name.clone()))?;
        if let Some((name, _)) = call.options.iter().find(|(name, _)| !descriptor.accepts(name)) {
            return Err(ExecError::UnknownOption {
                target: call.name.clone(),
                name: name.clone(),
            });
        }
        debug!(function = %call.name, args = call.args.len(), "calling function");

        let text = match call.name.as_str() {
            "connect" => self.connect(call)?,
            "session" => self.session(call)?,
            "run" => return self.run_file(call),
            "help" => self.help(call)?,
            "echo" => echo(&call.args),
            other => return Err(ExecError::UnknownFunction(other.to_string())),
        };
        Ok(vec![Outcome::Text(text)])
    }

    fn connect(&mut self, call: &FuncCall) -> Result<String, ExecError> {
        let text = |name: &str| call.option(name).map(Value::as_text);
        let hosts = text("hosts")
            .or_else(|| call.args.first().map(Value::as_text))
            .ok_or_else(|| ExecError::InvalidOption {
                name: "hosts".to_string(),
                reason: "at least one host is required".to_string(),
            })?;
        let options = ConnectOptions {
            hosts: hosts
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
            username: text("username"),
            password: text("password"),
            api_key: text("api_key"),
        };

        let client = self.connector.connect(&options)?;
        let name = text("name").unwrap_or_else(|| client.describe());
        self.connections.push(Connection { name, client });
        self.current = self.connections.len() - 1;
        info!(connection = self.current, "connected");
        Ok(self.list_connections())
    }

    fn session(&mut self, call: &FuncCall) -> Result<String, ExecError> {
        if let Some(value) = call.option("current") {
            self.current = self.resolve(value)?;
        }
        if let Some(value) = call.option("remove") {
            let index = self.resolve(value)?;
            if self.connections.len() == 1 {
                return Err(ExecError::InvalidOption {
                    name: "remove".to_string(),
                    reason: "cannot remove the only connection".to_string(),
                });
            }
            self.connections.remove(index);
            if self.current > index || self.current >= self.connections.len() {
                self.current = self.current.saturating_sub(1);
            }
        }
        Ok(self.list_connections())
    }

    fn list_connections(&self) -> String {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let marker = if i == self.current { '*' } else { ' ' };
                format!("{} {} {} ({})", marker, i, c.name, c.client.describe())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn run_file(&mut self, call: &FuncCall) -> Result<Vec<Outcome>, ExecError> {
        let path = call
            .args
            .first()
            .map(Value::as_text)
            .ok_or_else(|| ExecError::InvalidOption {
                name: "file".to_string(),
                reason: "a file path is required".to_string(),
            })?;
        if self.run_depth >= MAX_RUN_DEPTH {
            return Err(ExecError::InvalidOption {
                name: "file".to_string(),
                reason: format!("run files nest deeper than {}", MAX_RUN_DEPTH),
            });
        }
        let text = std::fs::read_to_string(Path::new(&path))?;
        info!(file = %path, depth = self.run_depth, "running file");
        self.run_depth += 1;
        let result = self.run_source(&text);
        self.run_depth -= 1;
        result
    }

    fn help(&self, call: &FuncCall) -> Result<String, ExecError> {
        match call.args.first().map(Value::as_text) {
            Some(name) => {
                let descriptor = self
                    .functions
                    .get(&name)
                    .ok_or_else(|| ExecError::UnknownFunction(name.clone()))?;
                let options = descriptor
                    .option_names
                    .as_ref()
                    .map_or_else(|| "none".to_string(), |names| names.join(", "));
                Ok(format!("{}: {}\noptions: {}", name, descriptor.summary, options))
            }
            None => Ok(self
                .functions
                .iter()
                .map(|(name, f)| format!("{:<10} {}", name, f.summary))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

fn echo(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::Literal(text) => text.clone(),
            other => other.to_json().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
