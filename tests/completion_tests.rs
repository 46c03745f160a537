use std::fs;
use std::path::Path;
use std::sync::Arc;

use restsh_core::completer::{Completer, Completion};
use restsh_core::functions::builtin_functions;
use restsh_core::spec::ApiSpec;
use tempfile::TempDir;

fn bundled() -> Completer {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("specs");
    let spec = ApiSpec::load_dir(&dir);
    assert!(!spec.is_empty(), "bundled specs missing from {}", dir.display());
    Completer::new(Arc::new(spec), Arc::new(builtin_functions()))
}

fn texts(completer: &Completer, text: &str) -> Vec<String> {
    completer
        .complete(text, text.len())
        .into_iter()
        .map(|c| c.text)
        .collect()
}

#[test]
fn test_bundled_specs_skip_common_file() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("specs");
    let spec = ApiSpec::load_dir(&dir);
    assert!(spec.get("search").is_some());
    assert!(spec.get("cat.indices").is_some());
    assert!(spec.get("params").is_none());
    assert!(spec.get("documentation").is_none());
}

#[test]
fn test_path_segments_after_reserved_action() {
    let completer = bundled();
    assert_eq!(
        texts(&completer, "GET /_cat/"),
        vec!["health", "indices", "indices/{index}"]
    );
}

#[test]
fn test_paths_filtered_by_method() {
    let completer = bundled();
    assert_eq!(
        texts(&completer, "DELETE /"),
        vec!["{index}", "{index}/_doc/{id}"]
    );
}

#[test]
fn test_search_params() {
    let completer = bundled();
    assert_eq!(
        texts(&completer, "GET /logs/_search?"),
        vec!["from", "q", "scroll", "size", "sort", "track_total_hits"]
    );
    assert_eq!(texts(&completer, "PUT /logs/_doc/1?op"), vec!["op_type"]);
}

#[test]
fn test_function_and_call_options() {
    let completer = bundled();
    assert_eq!(texts(&completer, "connect h"), vec!["hosts="]);
    assert_eq!(texts(&completer, "session "), vec!["current=", "remove="]);
    assert_eq!(texts(&completer, "GET /logs "), vec!["conn=", "runas="]);
    assert_eq!(
        texts(&completer, "%"),
        vec!["connect", "echo", "help", "run", "session"]
    );
}

#[test]
fn test_spec_directory_from_disk() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("widgets.json"),
        r#"{"widget.get": {"url": {"paths": [{"path": "/_widgets/{name}", "methods": ["GET"]}]},
             "params": {"verbose": {"type": "boolean"}}}}"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("_common.json"), r#"{"params": {"pretty": {}}}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let spec = ApiSpec::load_dir(dir.path());
    assert_eq!(spec.len(), 1);
    let completer = Completer::new(Arc::new(spec), Arc::new(builtin_functions()));

    assert_eq!(
        completer.complete("GET /_w", 7),
        vec![Completion {
            text: "_widgets/{name}".to_string(),
            start_position: -2,
        }]
    );
    assert_eq!(texts(&completer, "GET /_widgets/gear?v"), vec!["verbose"]);
    assert!(texts(&completer, "POST /_widgets/").is_empty());
}

#[test]
fn test_missing_spec_directory_still_completes_functions() {
    let dir = TempDir::new().unwrap();
    let spec = ApiSpec::load_dir(&dir.path().join("absent"));
    assert!(spec.is_empty());
    let completer = Completer::new(Arc::new(spec), Arc::new(builtin_functions()));
    assert!(texts(&completer, "GET /").is_empty());
    assert_eq!(texts(&completer, "ech")[0], "echo");
}
