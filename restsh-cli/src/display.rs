use colored::Colorize;
use restsh_core::client::HttpResponse;
use restsh_core::vm::Outcome;

/// Longest non-JSON body printed before truncating.
const MAX_LINES: usize = 200;

pub fn print_outcome(outcome: &Outcome, pretty: bool) {
    match outcome {
        Outcome::Response(response) => print_response(response, pretty),
        Outcome::Request(text) => {
            print!("{}", text);
            println!("{}", "(dry-run: request not sent)".dimmed().italic());
        }
        Outcome::Text(text) => println!("{}", text),
    }
}

fn print_response(response: &HttpResponse, pretty: bool) {
    let status = response.status.to_string();
    let status_colored = if response.is_success() {
        status.green().bold()
    } else if response.is_client_error() {
        status.yellow().bold()
    } else if response.is_server_error() {
        status.red().bold()
    } else {
        status.white().bold()
    };
    println!("{} {}", "Status:".dimmed(), status_colored);

    let body = &response.body;
    if body.is_empty() {
        return;
    }
    println!("{}", render_body(body, pretty));
}

/// Re-indent JSON bodies when `pretty`; other bodies are truncated.
fn render_body(body: &str, pretty: bool) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let rendered = if pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        return rendered.unwrap_or_else(|_| body.to_string());
    }

    let lines: Vec<&str> = body.lines().collect();
    if lines.len() <= MAX_LINES {
        return body.trim_end().to_string();
    }
    let mut out = lines[..MAX_LINES].join("\n");
    out.push('\n');
    out.push_str(&format!("... ({} more lines)", lines.len() - MAX_LINES).dimmed().to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_body() {
        assert_eq!(render_body("{\"a\":[1]}", true), "{\n  \"a\": [\n    1\n  ]\n}");
        assert_eq!(render_body("{ \"a\" : 1 }", false), "{\"a\":1}");
    }

    #[test]
    fn test_render_text_body() {
        assert_eq!(render_body("green open idx\n", true), "green open idx");
        let long: String = (0..250).map(|i| format!("line {}\n", i)).collect();
        let rendered = render_body(&long, true);
        assert!(rendered.contains("line 199"));
        assert!(!rendered.contains("line 200\n"));
        assert!(rendered.contains("50 more lines"));
    }
}
