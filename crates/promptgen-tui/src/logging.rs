//! File logging. The terminal belongs to the UI, so tracing output goes to
//! `~/.local/share/promptgen/promptgen.log`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptgen_core::config::log_path;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "PROMPTGEN_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Logging stays off if the log file cannot
/// be opened or a subscriber is already set.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    let _ = init_at(&path);
}

fn init_at(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();
    Ok(())
}

fn env_filter() -> EnvFilter {
    let directive = std::env::var(LOG_ENV).unwrap_or_default();
    filter_from(&directive)
}

/// Parse a filter directive, falling back to `info` for blank or invalid input.
fn filter_from(directive: &str) -> EnvFilter {
    if directive.trim().is_empty() {
        return EnvFilter::new(DEFAULT_DIRECTIVE);
    }
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
