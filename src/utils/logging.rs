//! Logging setup
//!
//! Builds the `env_logger` output pipeline from resolved settings. The global
//! `log` logger is installed once as a dispatcher whose inner logger is
//! swapped on every call, so re-running setup replaces the previous
//! configuration instead of stacking on top of it.

use colored::Colorize;
use env_logger::{Builder, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, error};
use serde_json::json;
use std::io::Write;
use std::panic;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::store::{ConfigStore, ConfigValue, Environment};

/// One stage of the output pipeline, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatStage {
    /// Colour the level label.
    Colorize,
    /// Attach a timestamp field to structured output.
    Timestamp,
    /// Render the record as a JSON object.
    Json,
    /// Prefix the level label with a timestamp and `port/pid` tag.
    LevelLabel { port: String, pid: u32 },
    /// Substitute message arguments.
    Interpolate,
    /// Render `label: message`.
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub stages: Vec<FormatStage>,
}

impl LogSettings {
    /// Read `log-colorize`, `json-logging`, `log-level` and `port`.
    pub fn from_store(store: &ConfigStore, production: bool) -> Self {
        let mut stages = Vec::new();

        // Only the exact string "false" turns colours off.
        let colorize = store
            .get("log-colorize")
            .is_none_or(|v| v.as_str() != Some("false"));
        if colorize {
            stages.push(FormatStage::Colorize);
        }

        if store.is_truthy("json-logging") {
            stages.push(FormatStage::Timestamp);
            stages.push(FormatStage::Json);
        } else {
            stages.push(FormatStage::LevelLabel {
                port: store
                    .get("port")
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                pid: std::process::id(),
            });
            stages.push(FormatStage::Interpolate);
            stages.push(FormatStage::Simple);
        }

        let default_level = if production {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        };
        let level = store
            .get("log-level")
            .filter(|v| v.is_truthy())
            .and_then(|v| parse_level(&v.to_string()))
            .unwrap_or(default_level);

        Self { level, stages }
    }

    pub fn colorize(&self) -> bool {
        self.stages.contains(&FormatStage::Colorize)
    }

    fn build_logger(&self) -> env_logger::Logger {
        let stages = self.stages.clone();
        let write_style = if self.colorize() {
            WriteStyle::Always
        } else {
            WriteStyle::Never
        };

        Builder::new()
            .filter_level(self.level)
            .target(Target::Stdout)
            .write_style(write_style)
            .format(move |buf, record| {
                let timestamp = buf.timestamp_millis().to_string();
                let message = record.args().to_string();
                let line = render(&stages, record.level(), &message, &timestamp);
                writeln!(buf, "{}", line)
            })
            .build()
    }
}

/// Map a level name onto `log` levels. Accepts the `error`..`silly` scale
/// as well as `trace` and `off`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" | "http" => Some(LevelFilter::Info),
        "verbose" | "debug" => Some(LevelFilter::Debug),
        "silly" | "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Render one record through `stages`.
pub fn render(stages: &[FormatStage], level: Level, message: &str, timestamp: &str) -> String {
    let mut label = level.as_str().to_ascii_lowercase();
    let mut stamp = None;
    let mut output = None;

    for stage in stages {
        match stage {
            FormatStage::Colorize => label = paint(&label, level),
            FormatStage::Timestamp => stamp = Some(timestamp),
            FormatStage::Json => {
                let mut object = json!({ "level": label, "message": message });
                if let Some(stamp) = stamp {
                    object["timestamp"] = json!(stamp);
                }
                output = Some(object.to_string());
            }
            FormatStage::LevelLabel { port, pid } => {
                label = format!("{} [{}/{}] - {}", timestamp, port, pid, label);
            }
            // `record.args()` has already substituted the arguments.
            FormatStage::Interpolate => {}
            FormatStage::Simple => output = Some(format!("{}: {}", label, message)),
        }
    }

    output.unwrap_or_else(|| format!("{}: {}", label, message))
}

fn paint(label: &str, level: Level) -> String {
    match level {
        Level::Error => label.red().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Trace => label.magenta().to_string(),
    }
}

/// Configure the global logger from the resolved store. Returns `false`
/// without doing anything when another logger already owns the `log` facade.
pub fn setup_logging(store: &ConfigStore, env: &Environment) -> bool {
    apply(&LogSettings::from_store(store, env.is_production()))
}

/// Install `settings`, replacing any configuration applied before.
pub fn apply(settings: &LogSettings) -> bool {
    if !install_dispatcher() {
        return false;
    }
    colored::control::set_override(settings.colorize());

    let logger = settings.build_logger();
    *DISPATCHER
        .inner
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(logger);
    log::set_max_level(settings.level);
    install_panic_hook();
    true
}

struct Dispatcher {
    inner: RwLock<Option<env_logger::Logger>>,
}

static DISPATCHER: Dispatcher = Dispatcher {
    inner: RwLock::new(None),
};

static INSTALLED: OnceLock<bool> = OnceLock::new();
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

impl Log for Dispatcher {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.as_ref().is_some_and(|logger| logger.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = inner.as_ref() {
            if logger.matches(record) {
                logger.log(record);
            }
        }
    }

    fn flush(&self) {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = inner.as_ref() {
            logger.flush();
        }
    }
}

fn install_dispatcher() -> bool {
    *INSTALLED.get_or_init(|| log::set_logger(&DISPATCHER).is_ok())
}

// Panics are reported through the configured logger before the default hook runs.
fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            error!("Uncaught panic: {}", info);
            previous(info);
        }));
    });
}

/// Current value of a logging key, for diagnostics.
pub fn describe(store: &ConfigStore) -> String {
    let show = |key: &str| {
        store
            .get(key)
            .map_or_else(|| "unset".to_string(), ConfigValue::to_string)
    };
    format!(
        "log-level={} log-colorize={} json-logging={}",
        show("log-level"),
        show("log-colorize"),
        show("json-logging")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Table;
    use pretty_assertions::assert_eq;

    fn store(file: &[(&str, ConfigValue)]) -> ConfigStore {
        let mut store = ConfigStore::new(&Environment::default());
        let table: Table = file
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        store.load_table(table);
        store
    }

    #[test]
    fn test_colorize_on_unless_exact_false_string() {
        assert!(LogSettings::from_store(&store(&[]), false).colorize());
        assert!(LogSettings::from_store(&store(&[("log-colorize", false.into())]), false).colorize());
        assert!(LogSettings::from_store(&store(&[("log-colorize", "no".into())]), false).colorize());
        assert!(!LogSettings::from_store(&store(&[("log-colorize", "false".into())]), false).colorize());
    }

    #[test]
    fn test_json_pipeline() {
        let settings = LogSettings::from_store(
            &store(&[
                ("json-logging", true.into()),
                ("log-colorize", "false".into()),
            ]),
            false,
        );

        assert_eq!(settings.stages, vec![FormatStage::Timestamp, FormatStage::Json]);
    }

    #[test]
    fn test_human_pipeline() {
        let settings = LogSettings::from_store(&store(&[("port", "4567".into())]), false);

        assert_eq!(
            settings.stages,
            vec![
                FormatStage::Colorize,
                FormatStage::LevelLabel {
                    port: "4567".into(),
                    pid: std::process::id(),
                },
                FormatStage::Interpolate,
                FormatStage::Simple,
            ]
        );
    }

    #[test]
    fn test_level_defaults_by_runtime_mode() {
        assert_eq!(LogSettings::from_store(&store(&[]), true).level, LevelFilter::Info);
        assert_eq!(LogSettings::from_store(&store(&[]), false).level, LevelFilter::Debug);
        assert_eq!(
            LogSettings::from_store(&store(&[("log-level", "warn".into())]), false).level,
            LevelFilter::Warn
        );
        assert_eq!(
            LogSettings::from_store(&store(&[("log-level", "bogus".into())]), true).level,
            LevelFilter::Info
        );
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!(parse_level("verbose"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("silly"), Some(LevelFilter::Trace));
        assert_eq!(parse_level("HTTP"), Some(LevelFilter::Info));
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_render_human_line() {
        let stages = vec![
            FormatStage::LevelLabel {
                port: "4567".into(),
                pid: 42,
            },
            FormatStage::Interpolate,
            FormatStage::Simple,
        ];

        assert_eq!(
            render(&stages, Level::Info, "listening", "2026-01-02T03:04:05.678Z"),
            "2026-01-02T03:04:05.678Z [4567/42] - info: listening"
        );
    }

    #[test]
    fn test_render_json_line() {
        let stages = vec![FormatStage::Timestamp, FormatStage::Json];
        let line = render(&stages, Level::Warn, "disk low", "2026-01-02T03:04:05.678Z");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["level"], "warn");
        assert_eq!(value["message"], "disk low");
        assert_eq!(value["timestamp"], "2026-01-02T03:04:05.678Z");
    }

    // Logger and colour state are process-global, so every `apply` check lives here.
    #[test]
    fn test_reconfigure_replaces_previous() {
        let verbose = LogSettings::from_store(&store(&[("log-level", "silly".into())]), false);
        let quiet = LogSettings::from_store(
            &store(&[("log-level", "error".into()), ("log-colorize", "false".into())]),
            false,
        );

        assert!(apply(&verbose));
        assert_eq!(log::max_level(), LevelFilter::Trace);
        let line = render(
            &[FormatStage::Colorize, FormatStage::Simple],
            Level::Error,
            "boom",
            "",
        );
        assert!(line.starts_with("\u{1b}["));
        assert!(line.ends_with(": boom"));

        assert!(apply(&quiet));
        assert_eq!(log::max_level(), LevelFilter::Error);
        assert_eq!(quiet.stages.len(), 3);
        assert_eq!("1.85".green().to_string(), "1.85");
    }

    #[test]
    fn test_describe() {
        let store = store(&[("log-level", "info".into())]);
        assert_eq!(
            describe(&store),
            "log-level=info log-colorize=unset json-logging=unset"
        );
    }
}
