/// Tracing subscriber setup
///
/// Filter priority (highest first):
/// 1. `PHOTO_SEARCH_LOG` (per-target directives, e.g. `photo_search=debug,warn`)
/// 2. `RUST_LOG`
/// 3. `PHOTO_SEARCH_VERBOSE=1` -> debug for this crate
/// 4. `warn`

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Target prefix of this crate's spans and events
const TARGET_PREFIX: &str = "photo_search";

/// How chatty the default filter is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Verbose,
}

impl Verbosity {
    /// Read `PHOTO_SEARCH_VERBOSE` ("1", "true", "yes" enable verbose output)
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "1" || v == "true" || v == "yes" => Verbosity::Verbose,
            _ => Verbosity::Normal,
        }
    }

    fn default_level(self) -> Level {
        match self {
            Verbosity::Normal => Level::WARN,
            Verbosity::Verbose => Level::DEBUG,
        }
    }
}

/// Variable holding per-target filter directives
const ENV_LOG: &str = "PHOTO_SEARCH_LOG";

/// Install the global subscriber. Call once, before loading config.
pub fn init(verbosity: Verbosity) {
    let directives = filter_directives(verbosity, |name| std::env::var(name).ok());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    // try_init: a second call (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer.with_timer(fmt::time::uptime()))
        .try_init();
}

/// Pick the filter directives from the first usable source
fn filter_directives(verbosity: Verbosity, env: impl Fn(&str) -> Option<String>) -> String {
    let usable = |directives: &String| {
        !directives.trim().is_empty() && EnvFilter::try_new(directives).is_ok()
    };

    if let Some(directives) = env(ENV_LOG).filter(usable) {
        return directives;
    }
    if let Some(directives) = env(EnvFilter::DEFAULT_ENV).filter(usable) {
        return directives;
    }

    match verbosity {
        Verbosity::Verbose => format!("{},{}={}", Level::WARN, TARGET_PREFIX, verbosity.default_level()),
        Verbosity::Normal => verbosity.default_level().to_string(),
    }
    .to_ascii_lowercase()
}
