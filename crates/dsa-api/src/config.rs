use serde::Deserialize;

/// Deployment environment, read from `ENV`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Runtime configuration, deserialized from environment variables.
///
/// Field names map to upper-case variables (`database_url` -> `DATABASE_URL`).
/// List values such as `ALLOWED_ORIGINS` are comma separated.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Must be at least 64 bytes, it keys the private cookie jar
    pub cookie_secret: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Questions served per quiz attempt
    #[serde(default = "default_quiz_sample_size")]
    pub quiz_sample_size: usize,
    /// Interval of the roadmap stats refresh job
    #[serde(default = "default_stats_refresh_secs")]
    pub stats_refresh_secs: u64,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

const fn default_port() -> u16 {
    8080
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_quiz_sample_size() -> usize {
    10
}

const fn default_stats_refresh_secs() -> u64 {
    900
}

/// Shortest cookie secret `axum_extra::extract::cookie::Key::from` accepts.
pub const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("COOKIE_SECRET must be at least {MIN_COOKIE_SECRET_LEN} bytes long")]
    CookieSecretTooShort,
    #[error("QUIZ_SAMPLE_SIZE must be greater than zero")]
    EmptyQuizSample,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::validated(envy::from_env::<Self>()?)
    }

    /// Build a config from explicit key/value pairs, as if they were the environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::validated(envy::from_iter::<_, Self>(vars)?)
    }

    fn validated(config: Self) -> Result<Self, ConfigError> {
        if config.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::CookieSecretTooShort);
        }
        if config.quiz_sample_size == 0 {
            return Err(ConfigError::EmptyQuizSample);
        }
        Ok(config)
    }
}
