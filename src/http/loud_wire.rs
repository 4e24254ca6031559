//! Wire-level debugging via the `LOUD_WIRE` environment variable.
//!
//! When `LOUD_WIRE` is set to any value, prints requests and responses
//! exchanged with the backend to stderr with pretty formatting and colors.
//!
//! ```bash
//! LOUD_WIRE=1 cargo test --test dashboard_tests -- --nocapture
//! ```
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Yellow for wake-up probes and retries
//!
//! Credential fields are masked so wire dumps can be shared safely.

use super::error_helpers::truncate_for_context;
use colored::Colorize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Fields whose values are replaced before printing.
const REDACT_FIELDS: &[&str] = &["password", "currentPassword", "newPassword", "token"];

const MAX_PLAIN_BODY: usize = 1000;

/// Check if LOUD_WIRE debugging is enabled.
///
/// Cached after the first check, so `LOUD_WIRE` must be set before the
/// first request is made.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Walks the JSON tree and masks credential fields.
fn redact_secrets(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if REDACT_FIELDS.contains(&key.as_str()) {
                    if val.is_string() {
                        *val = serde_json::Value::String("***".to_string());
                    }
                } else {
                    redact_secrets(val);
                }
            }
        }
        serde_json::Value::Array(arr) => arr.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}

fn prefix(request_id: usize) -> String {
    let ts = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
        .dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{}]", request_id).cyan()
    )
}

fn print_body(prefix: &str, label: &str, body: &str) {
    if let Ok(mut parsed) = serde_json::from_str::<serde_json::Value>(body) {
        redact_secrets(&mut parsed);
        eprintln!("{prefix} {label}:");
        let rendered = colored_json::to_colored_json_auto(&parsed)
            .ok()
            .or_else(|| serde_json::to_string_pretty(&parsed).ok());
        if let Some(rendered) = rendered {
            for line in rendered.lines() {
                eprintln!("{prefix} {line}");
            }
        }
    } else {
        let truncated = truncate_for_context(body, MAX_PLAIN_BODY);
        eprintln!("{prefix} {label}: {truncated}");
    }
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&str>) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    eprintln!("{prefix} {} {method} {url}", ">>>".green().bold());
    if let Some(body) = body {
        print_body(&prefix, &"Body".green().to_string(), body);
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let status_text = if status < 300 {
        format!("{status} OK").green()
    } else {
        format!("{status} ERROR").red()
    };
    eprintln!("{prefix} {} {status_text}", "<<<".red().bold());
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() || body.trim().is_empty() {
        return;
    }

    print_body(&prefix(request_id), &"Response".red().to_string(), body);
}

/// Log a transport failure (timeout, connection error).
pub fn log_failure(request_id: usize, error: &str) {
    if !is_enabled() {
        return;
    }

    eprintln!("{} {} {error}", prefix(request_id), "<<< FAILED".red().bold());
}

/// Log a wake-up probe or retry decision.
pub fn log_retry(request_id: usize, note: &str) {
    if !is_enabled() {
        return;
    }

    eprintln!("{} {} {note}", prefix(request_id), "RETRY".yellow().bold());
}
