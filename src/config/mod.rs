use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Upper bound for `SECURITY_JWT_EXPIRY_HOURS`: one year
pub const MAX_JWT_EXPIRY_HOURS: u64 = 8760;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Empty means any origin is accepted
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment, test fixtures, ...)
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mut config = match environment {
            Environment::Production => Self::production(database_url, jwt_secret),
            Environment::Staging => Self::staging(database_url, jwt_secret),
            Environment::Development => Self::development(database_url, jwt_secret),
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(v) = lookup("MDM_API_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(ConfigError::Invalid {
                name: "SECURITY_JWT_EXPIRY_HOURS",
                reason: format!("token lifetime must be between 1 and {} hours", MAX_JWT_EXPIRY_HOURS),
            });
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(())
    }

    fn development(database_url: String, jwt_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 4000,
                max_request_size_bytes: 1024 * 1024, // 1MB
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging(database_url: String, jwt_secret: String) -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 4000,
                max_request_size_bytes: 256 * 1024,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }

    fn production(database_url: String, jwt_secret: String) -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: database_url,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 4000,
                max_request_size_bytes: 64 * 1024,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                cors_origins: Vec::new(),
            },
        }
    }
}
