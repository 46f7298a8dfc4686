//! Core logging construction and event emission.
//!
//! # Responsibility
//! - Build file-based rolling or stderr loggers without touching the global
//!   `log` facade.
//! - Give every component an explicit `CoreLogger` handle at construction.
//! - Emit stable, metadata-only diagnostic events.
//!
//! # Invariants
//! - Building a logger never installs a process-wide logger.
//! - Logger construction must not panic.
//! - The panic hook is installed at most once per process.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_FILE_BASENAME: &str = "petstore";
const DEFAULT_TARGET: &str = "petstore";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Cloneable logging handle injected into repositories and request adapters.
///
/// Wraps any `log::Log` backend. Level filtering happens here, so backends
/// that do not filter (test capture sinks) still honor the configured level.
#[derive(Clone)]
pub struct CoreLogger {
    backend: Arc<dyn Log>,
    max_level: LevelFilter,
    target: &'static str,
    // Keeps flexi_logger writer threads alive for as long as any clone exists.
    _handle: Option<Arc<LoggerHandle>>,
}

impl fmt::Debug for CoreLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreLogger")
            .field("max_level", &self.max_level)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl CoreLogger {
    /// Wraps an arbitrary backend with `trace` as the effective level.
    pub fn new(backend: Arc<dyn Log>) -> Self {
        Self {
            backend,
            max_level: LevelFilter::Trace,
            target: DEFAULT_TARGET,
            _handle: None,
        }
    }

    /// Returns a logger that drops every event.
    pub fn discard() -> Self {
        Self {
            backend: Arc::new(DiscardLog),
            max_level: LevelFilter::Off,
            target: DEFAULT_TARGET,
            _handle: None,
        }
    }

    /// Builds a stderr logger at `level`.
    ///
    /// # Errors
    /// - Returns an error when `level` is unsupported or the backend fails to build.
    pub fn to_stderr(level: &str) -> Result<Self, String> {
        let normalized_level = normalize_level(level)?;
        let (backend, handle) = Logger::try_with_str(normalized_level)
            .map_err(|err| format!("invalid log level `{normalized_level}`: {err}"))?
            .log_to_stderr()
            .format(flexi_logger::detailed_format)
            .build()
            .map_err(|err| format!("failed to build logger: {err}"))?;

        Ok(Self::from_backend(backend, normalized_level, handle))
    }

    /// Builds a size-rotated file logger writing into `log_dir`.
    ///
    /// # Errors
    /// - Returns an error when `level` is unsupported.
    /// - Returns an error when `log_dir` is empty, non-absolute, or cannot be created.
    /// - Returns an error when the backend fails to build.
    pub fn to_files(level: &str, log_dir: &str) -> Result<Self, String> {
        let normalized_level = normalize_level(level)?;
        let normalized_dir = normalize_log_dir(log_dir)?;

        std::fs::create_dir_all(&normalized_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                normalized_dir.display()
            )
        })?;

        let (backend, handle) = Logger::try_with_str(normalized_level)
            .map_err(|err| format!("invalid log level `{normalized_level}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(normalized_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            // Format: [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
            .format_for_files(flexi_logger::detailed_format)
            .build()
            .map_err(|err| format!("failed to build logger: {err}"))?;

        let logger = Self::from_backend(backend, normalized_level, handle);
        logger.info(format_args!(
            "event=logger_init module=core status=ok level={} log_dir={}",
            normalized_level,
            normalized_dir.display()
        ));
        Ok(logger)
    }

    fn from_backend(backend: Box<dyn Log>, level: &'static str, handle: LoggerHandle) -> Self {
        let logger = Self {
            _handle: Some(Arc::new(handle)),
            ..Self::new(Arc::from(backend))
        };
        logger.with_max_level(level_filter(level))
    }

    /// Returns a clone that tags events with `target`.
    pub fn with_target(&self, target: &'static str) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Returns a clone that drops events less severe than `level`.
    pub fn with_max_level(&self, level: LevelFilter) -> Self {
        Self {
            max_level: level,
            ..self.clone()
        }
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    pub fn flush(&self) {
        self.backend.flush();
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if level > self.max_level {
            return;
        }

        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.backend.enabled(&metadata) {
            return;
        }

        self.backend
            .log(&Record::builder().metadata(metadata).args(args).build());
    }
}

struct DiscardLog;

impl Log for DiscardLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &Record<'_>) {}

    fn flush(&self) {}
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Routes panics through `logger` before delegating to the previous hook.
///
/// Only the first call installs a hook; later calls are no-ops.
pub fn install_panic_hook(logger: &CoreLogger) {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let logger = logger.clone();
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Panic payloads can carry request data; cap and flatten before logging.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        logger.error(format_args!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        ));
        logger.flush();
        previous_hook(panic_info);
    }));
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn level_filter(normalized_level: &str) -> LevelFilter {
    match normalized_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        _ => LevelFilter::Error,
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
