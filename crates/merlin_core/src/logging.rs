//! Rolling file logs for the core and its hosts.
//!
//! The first successful [`init_logging`] call fixes the log target (level
//! plus absolute directory) for the life of the process. Repeating the call
//! with the same target is a no-op; any other target is refused. A started
//! logger also records panics as `event=panic_captured` lines before the
//! previously installed hook runs.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "merlin";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where and how verbosely the process logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level={} dir={}", self.level, self.dir.display())
    }
}

#[derive(Debug)]
pub enum LogInitError {
    InvalidLevel(String),
    RelativeDir(PathBuf),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Start(FlexiLoggerError),
    /// Logging already runs with `active`; `requested` was refused.
    Conflict {
        active: LogTarget,
        requested: LogTarget,
    },
}

impl Display for LogInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Start(err) => write!(f, "cannot start logger: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LogInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Start(err) => Some(err),
            _ => None,
        }
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts rolling file logs at `level` under the absolute `log_dir`.
///
/// `level` is case-insensitive and accepts `warning` for `warn`.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LogInitError> {
    let requested = LogTarget {
        level: parse_level(level)?,
        dir: absolute_dir(log_dir.as_ref())?,
    };

    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    if active.target == requested {
        Ok(())
    } else {
        Err(LogInitError::Conflict {
            active: active.target.clone(),
            requested,
        })
    }
}

/// The target fixed by the first successful [`init_logging`], if any.
pub fn logging_status() -> Option<LogTarget> {
    ACTIVE.get().map(|active| active.target.clone())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(target: LogTarget) -> Result<ActiveLogger, LogInitError> {
    std::fs::create_dir_all(&target.dir).map_err(|source| LogInitError::CreateDir {
        dir: target.dir.clone(),
        source,
    })?;

    let handle = Logger::with(LogSpecification::builder().default(target.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(&target.dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LogInitError::Start)?;

    // Runs at most once: a started logger is never replaced.
    chain_panic_hook();

    info!(
        "event=app_start module=core status=ok platform={} version={} {target}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
    );

    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

fn parse_level(raw: &str) -> Result<LevelFilter, LogInitError> {
    let trimmed = raw.trim();
    let name = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };

    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LogInitError::InvalidLevel(trimmed.to_string())),
        Ok(level) => Ok(level),
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, LogInitError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LogInitError::RelativeDir(dir.to_path_buf()))
    }
}

fn chain_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log_panic(info);
        previous(info);
    }));
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);
    // Panic text can carry customer names or plates.
    let message = one_line_excerpt(panic_text(info.payload()), MAX_PANIC_MESSAGE_CHARS);
    error!("event=panic_captured module=core status=error location={location} message={message}");
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Collapses whitespace runs (newlines included) to single spaces and keeps
/// at most `max_chars` characters, marking a cut with `...`.
fn one_line_excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively_with_warning_alias() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("Trace").unwrap(), LevelFilter::Trace);
    }

    #[test]
    fn off_and_unknown_levels_are_rejected() {
        assert!(matches!(parse_level("off"), Err(LogInitError::InvalidLevel(_))));
        let err = parse_level("verbose").unwrap_err();
        assert!(err.to_string().contains("`verbose`"));
    }

    #[test]
    fn relative_and_empty_dirs_are_rejected() {
        assert!(matches!(
            absolute_dir(Path::new("logs/dev")),
            Err(LogInitError::RelativeDir(_))
        ));
        assert!(absolute_dir(Path::new("")).is_err());
    }

    #[test]
    fn excerpt_flattens_lines_and_marks_truncation() {
        assert_eq!(one_line_excerpt("placa\nABC1D23\r\n  ok", 40), "placa ABC1D23 ok");
        assert_eq!(one_line_excerpt("line1\nline2\rline3", 8), "line1 li...");
        assert_eq!(one_line_excerpt("çãõ", 3), "çãõ");
    }

    #[test]
    fn panic_text_reads_both_string_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_text(owned.as_ref()), "owned");
        assert_eq!(panic_text(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_text(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn same_target_is_idempotent_and_other_targets_conflict() {
        let log_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();

        init_logging("info", log_dir.path()).expect("first init should succeed");
        init_logging("INFO", log_dir.path()).expect("same target should be idempotent");

        let level_error = init_logging("debug", log_dir.path()).unwrap_err();
        assert!(matches!(level_error, LogInitError::Conflict { .. }));

        let dir_error = init_logging("info", other_dir.path()).unwrap_err();
        assert!(dir_error.to_string().contains("refusing to switch"));

        let active = logging_status().expect("logging should be active");
        assert_eq!(active.level, LevelFilter::Info);
        assert_eq!(active.dir, log_dir.path());
    }
}
