use crate::config::{Environment, LogConfig};
use crate::nice_display::NiceDisplay;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub enum Error {
    CreatingLogDir(std::io::Error),
    Appender(String),
    InvalidFilter(String),
    Init(String),
}

impl NiceDisplay for Error {
    fn message(&self) -> String {
        match self {
            Error::CreatingLogDir(err) => format!("Failed to create logs directory: {}", err),
            Error::Appender(err) => format!("Failed to open the log file: {}", err),
            Error::InvalidFilter(err) => format!("Invalid log filter: {}", err),
            Error::Init(err) => format!("Failed to install the log subscriber: {}", err),
        }
    }
}

/// Installs the process subscriber: stdout plus a daily rolling file next to
/// `LOG_FILE`. Text in development, JSON lines elsewhere. `RUST_LOG` takes
/// precedence over `LOG_LEVEL`. Log lines are flushed until the guard drops.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, Error> {
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(config)?);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_directive()))
        .map_err(|err| Error::InvalidFilter(err.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.environment {
        Environment::Development => registry
            .with(fmt::layer().with_target(true))
            .with(fmt::layer().with_ansi(false).with_writer(file_writer))
            .try_init(),
        Environment::Production | Environment::Test => registry
            .with(fmt::layer().json())
            .with(fmt::layer().json().with_writer(file_writer))
            .try_init(),
    };

    installed.map_err(|err| Error::Init(err.to_string()))?;

    Ok(guard)
}

/// Daily rotation keeping at most `LOG_MAX_FILES` files.
fn file_appender(config: &LogConfig) -> Result<RollingFileAppender, Error> {
    let path = Path::new(&config.file_path);
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app.log".to_string());

    std::fs::create_dir_all(&dir).map_err(Error::CreatingLogDir)?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(config.max_files)
        .build(dir)
        .map_err(|err| Error::Appender(err.to_string()))
}
