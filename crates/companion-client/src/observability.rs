//! Process-wide logging setup for examples and embedding binaries.
//!
//! The library itself only emits `tracing` events; nothing here runs
//! unless the host calls [`init_observability`].

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

/// Initializes logging once per process. Safe to call repeatedly.
///
/// Environment variables:
/// - `COMPANION_LOG`: enable/disable flag (default enabled).
/// - `COMPANION_LOG_LEVEL`: level or filter expression (`debug`,
///   `companion_client=trace`, ...).
/// - `COMPANION_LOG_JSON_PATH`: when set, JSONL output goes to that file
///   instead of the console.
/// - `RUST_LOG`: standard filter fallback.
///
/// Console output goes to stderr so streamed replies on stdout stay clean.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !logging_enabled() {
            return;
        }

        let env_filter = resolve_env_filter();
        match std::env::var("COMPANION_LOG_JSON_PATH") {
            Ok(path_raw) => {
                let path = std::path::PathBuf::from(path_raw);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    let _ = std::fs::create_dir_all(parent);
                }
                let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("companion.logs.jsonl");
                let writer = tracing_appender::rolling::never(dir, file_name);
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(writer);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            Err(_) => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init();
            }
        }
    });
}

fn logging_enabled() -> bool {
    match std::env::var("COMPANION_LOG") {
        Ok(value) => parse_bool(&value).unwrap_or(true),
        Err(_) => true,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn resolve_env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(level) = std::env::var("COMPANION_LOG_LEVEL")
        && let Ok(filter) = tracing_subscriber::EnvFilter::try_new(level)
    {
        return filter;
    }
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}
