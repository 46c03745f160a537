//! Registry of callable functions, as seen by the completer and the VM.

use std::collections::BTreeMap;

/// What the completer may know about a function without calling it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Accepted `name=value` options, in declaration order.
    pub option_names: Option<Vec<String>>,
    pub summary: String,
}

impl FunctionDescriptor {
    pub fn new(summary: impl Into<String>, option_names: &[&str]) -> Self {
        Self {
            option_names: (!option_names.is_empty())
                .then(|| option_names.iter().map(|s| s.to_string()).collect()),
            summary: summary.into(),
        }
    }

    pub fn accepts(&self, option: &str) -> bool {
        self.option_names
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == option))
    }
}

pub type FunctionTable = BTreeMap<String, FunctionDescriptor>;

/// Options accepted by every API call.
pub const CALL_OPTIONS: [&str; 2] = ["conn", "runas"];

/// The functions the VM implements.
pub fn builtin_functions() -> FunctionTable {
    [
        (
            "connect",
            FunctionDescriptor::new(
                "Open a new connection and make it current",
                &["hosts", "username", "password", "api_key", "name"],
            ),
        ),
        (
            "session",
            FunctionDescriptor::new("List, switch or remove connections", &["current", "remove"]),
        ),
        (
            "run",
            FunctionDescriptor::new("Execute the statements in a file", &[]),
        ),
        (
            "help",
            FunctionDescriptor::new("List functions or describe one", &[]),
        ),
        (
            "echo",
            FunctionDescriptor::new("Print the arguments", &[]),
        ),
    ]
    .into_iter()
    .map(|(name, descriptor)| (name.to_string(), descriptor))
    .collect()
}
