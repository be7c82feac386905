use crate::nice_display::NiceDisplay;
use sqlx::postgres::PgSslMode;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
    pub enrichment: EnrichmentConfig,
    pub environment: Environment,
}

pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: LogLevel,
    pub file_path: String,
    /// Rotated files kept on disk, oldest pruned first.
    pub max_files: usize,
    pub environment: Environment,
}

#[derive(Clone, Debug)]
pub struct EnrichmentConfig {
    pub age_url: String,
    pub gender_url: String,
    pub nationality_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    OutOfRange { var: &'static str, value: String },
    Empty { var: &'static str },
    UnknownSslMode(String),
    UnknownLogLevel(String),
    UnknownEnvironment(String),
}

impl NiceDisplay for ConfigError {
    fn message(&self) -> String {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                format!("{} must be a number, got '{}'", var, value)
            }
            ConfigError::OutOfRange { var, value } => {
                format!("{} is out of range: {}", var, value)
            }
            ConfigError::Empty { var } => format!("{} cannot be empty", var),
            ConfigError::UnknownSslMode(mode) => format!("Unknown DB_SSLMODE: {}", mode),
            ConfigError::UnknownLogLevel(level) => {
                format!(
                    "Unknown LOG_LEVEL '{}', expected one of DEBUG, INFO, WARN, ERROR",
                    level
                )
            }
            ConfigError::UnknownEnvironment(env) => {
                format!(
                    "Unknown ENVIRONMENT '{}', expected one of development, production, test",
                    env
                )
            }
        }
    }
}

impl LogLevel {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ConfigError::UnknownLogLevel(s.to_string())),
        }
    }

    pub fn to_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Environment {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }

    pub fn to_name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl Config {
    /// Reads the process environment, which `main` has already merged with `.env`.
    pub fn load() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let environment = Environment::parse(&var("ENVIRONMENT", "development"))?;

        let db = DbConfig {
            host: non_empty("DB_HOST", var("DB_HOST", "localhost"))?,
            port: port("DB_PORT", &var("DB_PORT", "5432"))?,
            user: non_empty("DB_USER", var("DB_USER", "postgres"))?,
            password: var("DB_PASSWORD", "postgres"),
            name: non_empty("DB_NAME", var("DB_NAME", "postgres"))?,
            ssl_mode: {
                let mode = var("DB_SSLMODE", "disable");
                PgSslMode::from_str(&mode).map_err(|_| ConfigError::UnknownSslMode(mode))?
            },
            max_connections: positive("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "10"))?,
        };

        let server = ServerConfig {
            host: non_empty("SERVER_HOST", var("SERVER_HOST", "0.0.0.0"))?,
            // Older .env files carry the port in ":8080" form
            port: port(
                "SERVER_PORT",
                var("SERVER_PORT", "8080").trim_start_matches(':'),
            )?,
        };

        let log = LogConfig {
            level: LogLevel::parse(&var("LOG_LEVEL", "INFO"))?,
            file_path: non_empty("LOG_FILE", var("LOG_FILE", "logs/app.log"))?,
            max_files: positive("LOG_MAX_FILES", &var("LOG_MAX_FILES", "7"))?,
            environment,
        };

        let enrichment = EnrichmentConfig {
            age_url: non_empty("AGE_API_URL", var("AGE_API_URL", "https://api.agify.io"))?,
            gender_url: non_empty(
                "GENDER_API_URL",
                var("GENDER_API_URL", "https://api.genderize.io"),
            )?,
            nationality_url: non_empty(
                "NATIONALITY_API_URL",
                var("NATIONALITY_API_URL", "https://api.nationalize.io"),
            )?,
            timeout: Duration::from_secs(positive(
                "ENRICHMENT_TIMEOUT_SECS",
                &var("ENRICHMENT_TIMEOUT_SECS", "10"),
            )?),
        };

        Ok(Config {
            db,
            server,
            log,
            enrichment,
            environment,
        })
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Empty { var })
    } else {
        Ok(value)
    }
}

fn port(var: &'static str, value: &str) -> Result<u16, ConfigError> {
    let n: i64 = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })?;

    if (1..=65535).contains(&n) {
        Ok(n as u16)
    } else {
        Err(ConfigError::OutOfRange {
            var,
            value: value.to_string(),
        })
    }
}

fn positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let n: T = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })?;

    if n > T::default() {
        Ok(n)
    } else {
        Err(ConfigError::OutOfRange {
            var,
            value: value.to_string(),
        })
    }
}
