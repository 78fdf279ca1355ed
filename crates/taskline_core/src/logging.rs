//! Logging bootstrap and the injectable service logger.
//!
//! # Responsibility
//! - Start the rolling file backend at most once per process.
//! - Provide `CoreLogger`, the handle services receive through their
//!   constructors.
//!
//! # Invariants
//! - A second `init_logging` with identical settings is a no-op; different
//!   settings are rejected and the running backend is left untouched.
//! - Initialization reports failures as strings and never panics.
//! - Service events are metadata-only `key=value` lines.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, Level, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fmt::{Arguments, Debug, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "taskline";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogging> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

struct ActiveLogging {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under `log_dir`.
///
/// A relative `log_dir` is resolved against the current working directory.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error` (`warning` accepted).
/// - `log_dir` is blank or cannot be created.
/// - Logging is already running with a different level or directory.
/// - The `flexi_logger` backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let wanted = LogSettings {
        level: normalize_level(level)?,
        dir: resolve_log_dir(log_dir)?,
    };

    let active = ACTIVE.get_or_try_init(|| start_backend(wanted.clone()))?;
    ensure_same_settings(&active.settings, &wanted)
}

fn start_backend(settings: LogSettings) -> Result<ActiveLogging, String> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            settings.dir.display()
        )
    })?;

    let file_spec = FileSpec::default()
        .directory(settings.dir.as_path())
        .basename(LOG_FILE_BASENAME);
    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", settings.level))?
        .log_to_file(file_spec)
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=logging_start module=logging status=ok version={} os={} debug_build={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        cfg!(debug_assertions),
        settings.level,
        settings.dir.display()
    );

    Ok(ActiveLogging {
        settings,
        _handle: handle,
    })
}

fn ensure_same_settings(active: &LogSettings, wanted: &LogSettings) -> Result<(), String> {
    if active.dir != wanted.dir {
        return Err(format!(
            "logging already writes to `{}`; cannot switch to `{}`",
            active.dir.display(),
            wanted.dir.display()
        ));
    }
    if active.level != wanted.level {
        return Err(format!(
            "logging already runs at level `{}`; cannot switch to `{}`",
            active.level, wanted.level
        ));
    }
    Ok(())
}

/// Returns `(level, log_dir)` of the running backend, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Logging capability handed to services.
///
/// `CoreLogger::global()` resolves the process-wide `log` backend on every
/// record, so services built before `init_logging` still reach the file
/// backend once it starts. Tests inject their own sink with `new`.
#[derive(Clone, Copy)]
pub struct CoreLogger {
    sink: Sink,
}

#[derive(Clone, Copy)]
enum Sink {
    Global,
    Fixed(&'static dyn Log),
}

impl CoreLogger {
    /// Forwards to whatever `log` backend is installed at emit time.
    pub fn global() -> Self {
        Self { sink: Sink::Global }
    }

    /// Forwards to `sink`.
    pub fn new(sink: &'static dyn Log) -> Self {
        Self {
            sink: Sink::Fixed(sink),
        }
    }

    pub fn debug(&self, target: &'static str, args: Arguments<'_>) {
        self.emit(Level::Debug, target, args);
    }

    pub fn info(&self, target: &'static str, args: Arguments<'_>) {
        self.emit(Level::Info, target, args);
    }

    pub fn warn(&self, target: &'static str, args: Arguments<'_>) {
        self.emit(Level::Warn, target, args);
    }

    pub fn error(&self, target: &'static str, args: Arguments<'_>) {
        self.emit(Level::Error, target, args);
    }

    fn emit(&self, level: Level, target: &'static str, args: Arguments<'_>) {
        let sink = match self.sink {
            Sink::Global => {
                if level > log::max_level() {
                    return;
                }
                log::logger()
            }
            Sink::Fixed(sink) => sink,
        };
        let metadata = Metadata::builder().level(level).target(target).build();
        if !sink.enabled(&metadata) {
            return;
        }
        sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(target))
                .build(),
        );
    }
}

impl Default for CoreLogger {
    fn default() -> Self {
        Self::global()
    }
}

impl Debug for CoreLogger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sink = match self.sink {
            Sink::Global => "global",
            Sink::Fixed(_) => "fixed",
        };
        f.debug_struct("CoreLogger").field("sink", &sink).finish()
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        other => {
            return Err(format!(
                "unsupported log level `{other}`; expected trace|debug|info|warn|error"
            ))
        }
    };
    Ok(level)
}

fn resolve_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log directory cannot be blank".to_string());
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve log directory `{trimmed}`: {err}"))
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            panic_payload(info)
        );
        previous(info);
    }));
}

// Payloads may carry user text; keep them on one line and short.
fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(text, PANIC_PAYLOAD_LIMIT)
}

fn single_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
