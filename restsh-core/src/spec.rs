//! Repository of REST endpoint specifications used for path and parameter completion.
//!
//! Each file in the spec directory maps endpoint names to their URL templates
//! and accepted query parameters:
//!
//! ```json
//! { "search": { "url": { "paths": [ { "path": "/{index}/_search", "methods": ["GET", "POST"] } ] },
//!               "params": { "q": { "type": "string" } } } }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ast::HttpMethod;

/// Shared definitions file; never contains endpoints.
pub const COMMON_FILE: &str = "_common.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    #[serde(default)]
    pub url: UrlSpec,
    /// Parameter names with their (unused) descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlSpec {
    #[serde(default)]
    pub paths: Vec<PathSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub path: String,
    #[serde(default)]
    pub methods: BTreeSet<String>,
}

impl PathSpec {
    pub fn new(path: impl Into<String>, methods: &[HttpMethod]) -> Self {
        Self {
            path: path.into(),
            methods: methods.iter().map(|m| m.as_str().to_string()).collect(),
        }
    }

    pub fn supports(&self, method: HttpMethod) -> bool {
        self.methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method.as_str()))
    }

    /// Template segments, empty ones dropped.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl EndpointSpec {
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().flat_map(|p| p.keys().map(String::as_str))
    }

    pub fn has_params(&self) -> bool {
        self.params.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Flat `endpoint name -> spec` mapping, read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiSpec {
    endpoints: BTreeMap<String, EndpointSpec>,
}

impl ApiSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` except [`COMMON_FILE`], in file-name order.
    ///
    /// Later files replace same-named endpoints from earlier ones. A missing or
    /// unreadable directory, or a malformed file, is logged and skipped.
    pub fn load_dir(dir: &Path) -> Self {
        let mut spec = Self::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "spec directory unavailable, path completion disabled");
                return spec;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "json")
                    && path.file_name().is_some_and(|name| name != COMMON_FILE)
            })
            .collect();
        files.sort();

        for file in &files {
            let text = match fs::read_to_string(file) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "cannot read spec file");
                    continue;
                }
            };
            match serde_json::from_str::<ApiSpec>(&text) {
                Ok(parsed) => {
                    debug!(file = %file.display(), endpoints = parsed.len(), "loaded spec file");
                    spec.merge(parsed);
                }
                Err(e) => warn!(file = %file.display(), error = %e, "skipping malformed spec file"),
            }
        }

        info!(files = files.len(), endpoints = spec.len(), "loaded API spec");
        spec
    }

    /// Add `other`'s endpoints, replacing existing ones with the same name.
    pub fn merge(&mut self, other: ApiSpec) {
        self.endpoints.extend(other.endpoints);
    }

    pub fn insert(&mut self, name: impl Into<String>, endpoint: EndpointSpec) {
        self.endpoints.insert(name.into(), endpoint);
    }

    pub fn get(&self, name: &str) -> Option<&EndpointSpec> {
        self.endpoints.get(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &EndpointSpec)> {
        self.endpoints.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every path template accepting `method`, paired with its endpoint.
    pub fn templates(&self, method: HttpMethod) -> impl Iterator<Item = (&EndpointSpec, &PathSpec)> {
        self.endpoints.values().flat_map(move |endpoint| {
            endpoint
                .url
                .paths
                .iter()
                .filter(move |path| path.supports(method))
                .map(move |path| (endpoint, path))
        })
    }
}
