//! Logging bootstrap for the identity store core.
//!
//! # Responsibility
//! - Start rolling file logs once per process and keep the handle alive.
//! - Capture panics as structured log events.
//!
//! # Invariants
//! - Re-initialization is accepted only with the configuration already
//!   active.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "idvault";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGING: OnceCell<ActiveLogging> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct ActiveLogging {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Validated logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogConfig {
    level: &'static str,
    dir: PathBuf,
}

impl LogConfig {
    /// Validates a requested level and log directory.
    ///
    /// The level is case-insensitive; the directory must be absolute so log
    /// placement never depends on the process working directory.
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            other => {
                return Err(format!(
                    "unsupported log level `{other}`; expected trace|debug|info|warn|error"
                ));
            }
        };

        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let dir = Path::new(trimmed);
        if !dir.is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
        }

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

/// Initializes core logging with level and directory.
///
/// Returns `Ok(())` when logging is active, or a human-readable error string
/// when initialization fails. Errors stay plain strings so embedders can
/// surface them without depending on core error types.
///
/// # Invariants
/// - Calling this function repeatedly with the same configuration is
///   idempotent.
/// - Re-initialization with a different `level` or `log_dir` is rejected.
/// - Initialization never panics.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when `log_dir` is empty, non-absolute, or cannot be
///   created.
/// - Returns an error when logger backend setup fails.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogConfig::parse(level, log_dir)?;

    let active = ACTIVE_LOGGING.get_or_try_init(|| -> Result<ActiveLogging, String> {
        let handle = start_file_logger(&requested)?;
        install_panic_hook_once();

        info!(
            "event=core_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            build_mode(),
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=log_init module=core status=ok level={} log_dir={}",
            requested.level,
            requested.dir.display()
        );

        Ok(ActiveLogging {
            config: requested.clone(),
            _handle: handle,
        })
    })?;

    if active.config != requested {
        return Err(format!(
            "logging already initialized with level `{}` at `{}`; refusing to switch to `{}` at `{}`",
            active.config.level,
            active.config.dir.display(),
            requested.level,
            requested.dir.display()
        ));
    }

    Ok(())
}

/// Returns active logging status metadata.
///
/// Returns `None` when logging has not been initialized, and
/// `(level, log_dir)` when it is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGING
        .get()
        .map(|active| (active.config.level, active.config.dir.clone()))
}

/// Returns the default log level for the current build mode.
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

fn start_file_logger(config: &LogConfig) -> Result<LoggerHandle, String> {
    std::fs::create_dir_all(&config.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            config.dir.display()
        )
    })?;

    Logger::try_with_str(config.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", config.level))?
        .log_to_file(
            FileSpec::default()
                .directory(config.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // detailed_format: [timestamp TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = match panic_info.location() {
            Some(location) => format!("{}:{}", location.file(), location.line()),
            None => "unknown".to_string(),
        };
        // Payload text can be user controlled; capped and stripped of
        // control characters before it reaches the log line.
        let payload = sanitize_message(&payload_text(panic_info), MAX_PANIC_PAYLOAD_CHARS);
        error!(
            "event=panic_captured module=core status=error location={location} payload={payload}"
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn payload_text(info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let mut cleaned = String::with_capacity(value.len().min(max_chars));
    for (seen, c) in value.chars().enumerate() {
        if seen == max_chars {
            cleaned.push_str("...");
            break;
        }
        cleaned.push(if c.is_control() { ' ' } else { c });
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, sanitize_message, LogConfig};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_log_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("idvault-logs-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn config_parse_normalizes_level_case_and_aliases() {
        let config = LogConfig::parse("INFO", "/var/log/idvault").expect("INFO should parse");
        assert_eq!(config.level, "info");

        let config = LogConfig::parse(" warning ", "/var/log/idvault").expect("warning should parse");
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn config_parse_rejects_bad_level_and_relative_dir() {
        assert!(LogConfig::parse("verbose", "/var/log/idvault").is_err());

        let error = LogConfig::parse("info", "logs/dev").expect_err("relative dir must be rejected");
        assert!(error.contains("absolute"));

        assert!(LogConfig::parse("info", "   ").is_err());
    }

    #[test]
    fn sanitize_message_strips_control_chars_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));

        assert_eq!(sanitize_message("short", 8), "short");
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let log_dir = scratch_log_dir("idempotent");
        let log_dir_str = log_dir
            .to_str()
            .expect("temp dir should be valid UTF-8")
            .to_string();
        let second_dir = scratch_log_dir("different");
        let second_dir_str = second_dir
            .to_str()
            .expect("temp dir should be valid UTF-8")
            .to_string();

        init_logging("info", &log_dir_str).expect("first init should succeed");
        init_logging("info", &log_dir_str).expect("same config should be idempotent");

        let level_error =
            init_logging("debug", &log_dir_str).expect_err("level conflict should fail");
        assert!(level_error.contains("refusing to switch"));

        let dir_error =
            init_logging("info", &second_dir_str).expect_err("directory conflict should fail");
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().expect("logging should be active");
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, log_dir);
    }
}
