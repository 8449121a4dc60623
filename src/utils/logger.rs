use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Level tag shown for warnings and errors; other levels print bare messages.
fn level_tag(level: Level) -> Option<ColoredString> {
    match level {
        Level::Error => Some("ERROR".red()),
        Level::Warn => Some("WARN".yellow()),
        _ => None,
    }
}

/// Module path without the crate prefix (`engine::builder` rather than `declgen::engine::builder`).
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(env!("CARGO_PKG_NAME"))
        .map(|t| t.trim_start_matches("::"))
        .filter(|t| !t.is_empty())
        .unwrap_or(target)
}

/// Crate logs at Debug (verbose) or Info, dependencies at Warn. `RUST_LOG` still applies.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init: the library may be driven more than once per process (tests, embedding).
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            match level_tag(record.level()) {
                Some(tag) => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    name,
                    tag,
                    short_target(record.target()).white(),
                    record.args()
                ),
                None => writeln!(buf, "[{}] {}", name, record.args()),
            }
        })
        .try_init();
}

/// Colors for run summaries.
pub struct Colors;

impl Colors {
    pub const ADDED: &'static str = "green";
    pub const CONFLICT: &'static str = "yellow";
    pub const FAILED: &'static str = "red";

    pub fn colorize(color: &str, text: &str) -> String {
        text.color(color).to_string()
    }
}
