use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app: AppInfo,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub assistant: AssistantConfig,
    pub log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Without one the server runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: Option<String>,
    pub jwt_expiry_hours: u64,
    pub password_salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_path: PathBuf,
    pub save_locations: Vec<String>,
    /// Empty accepts every extension.
    pub accepted_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub enabled: bool,
}

/// Shape of the optional config file. Keys follow the JSON config the service has always read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    version: Option<String>,
    title: Option<String>,
    db_connection_string: Option<String>,
    password_salt: Option<String>,
    jwt_secret: Option<String>,
    accepted_extensions: Option<Vec<String>>,
    save_locations: Option<Vec<String>>,
    storage_path: Option<PathBuf>,
    is_ai_assistant_enabled: Option<bool>,
    host: Option<String>,
    port: Option<u16>,
}

impl AppConfig {
    /// Preset for `APP_ENV`, then the optional `APP_CONFIG_FILE`, then environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| env::var(key).ok())
    }

    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        if let Some(path) = lookup("APP_CONFIG_FILE") {
            config = config.with_file(Path::new(&path))?;
        }

        Ok(config.with_env_overrides(lookup))
    }

    fn with_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let file: ConfigFile = serde_yaml::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        if let Some(v) = file.version { self.app.version = v; }
        if let Some(v) = file.title { self.app.title = v; }
        if let Some(v) = file.db_connection_string { self.database.url = Some(v); }
        if let Some(v) = file.password_salt { self.security.password_salt = v; }
        if let Some(v) = file.jwt_secret { self.security.jwt_secret = Some(v); }
        if let Some(v) = file.accepted_extensions { self.storage.accepted_extensions = v; }
        if let Some(v) = file.save_locations { self.storage.save_locations = v; }
        if let Some(v) = file.storage_path { self.storage.base_path = v; }
        if let Some(v) = file.is_ai_assistant_enabled { self.assistant.enabled = v; }
        if let Some(v) = file.host { self.server.host = v; }
        if let Some(v) = file.port { self.server.port = v; }
        Ok(self)
    }

    fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("APP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("APP_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("APP_DB_CONN_STR").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("APP_DB_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // App overrides
        if let Some(v) = lookup("APP_VERSION") {
            self.app.version = v;
        }
        if let Some(v) = lookup("APP_TITLE") {
            self.app.title = v;
        }

        // Security overrides
        if let Some(v) = lookup("APP_PASSWORD_SALT") {
            self.security.password_salt = v;
        }
        if let Some(v) = lookup("APP_JWT_SECRET") {
            self.security.jwt_secret = Some(v);
        }
        if let Some(v) = lookup("APP_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = lookup("APP_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        // Storage and assistant overrides
        if let Some(v) = lookup("APP_STORAGE_PATH") {
            self.storage.base_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("APP_AI_ASSISTANT_ENABLED") {
            self.assistant.enabled = v.parse().unwrap_or(self.assistant.enabled);
        }

        if let Some(v) = lookup("APP_LOG").or_else(|| lookup("RUST_LOG")) {
            self.log = v;
        }

        self
    }

    /// Rejects configurations the server cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.title.is_empty() { return Err(ConfigError::Missing("title")); }
        if self.app.version.is_empty() { return Err(ConfigError::Missing("version")); }
        if self.security.password_salt.is_empty() { return Err(ConfigError::Missing("password salt")); }
        if self.storage.save_locations.is_empty() { return Err(ConfigError::Missing("save locations")); }

        if self.environment == Environment::Production {
            if self.security.jwt_secret.is_none() { return Err(ConfigError::Missing("APP_JWT_SECRET")); }
            if self.database.url.is_none() { return Err(ConfigError::Missing("APP_DB_CONN_STR")); }
        }
        Ok(())
    }

    /// Key material for token signing and password hashing. Falls back to `<title>_V<version>`.
    pub fn secret_key(&self) -> String {
        match &self.security.jwt_secret {
            Some(secret) if !secret.is_empty() => secret.clone(),
            _ => format!("{}_V{}", self.app.title, self.app.version),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            app: AppInfo { title: "LanguHelp".to_string(), version: "1".to_string() },
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_request_size_bytes: 32 * 1024 * 1024, // 32MB
                default_page_size: 20,
                max_page_size: 1000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
                jwt_secret: None,
                jwt_expiry_hours: 8,
                password_salt: "development-salt".to_string(),
            },
            storage: StorageConfig {
                base_path: PathBuf::from("./storage"),
                save_locations: vec!["documents".to_string()],
                accepted_extensions: vec![],
            },
            assistant: AssistantConfig { enabled: false },
            log: "languhelp_api=debug,tower_http=debug,info".to_string(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_request_size_bytes = 16 * 1024 * 1024;
        config.api.max_page_size = 500;
        config.security.password_salt = String::new();
        config.storage.accepted_extensions = default_extensions();
        config.log = "languhelp_api=debug,info".to_string();
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.max_request_size_bytes = 8 * 1024 * 1024;
        config.api.max_page_size = 100;
        config.log = "info".to_string();
        config
    }
}

fn default_extensions() -> Vec<String> {
    ["txt", "md", "pdf", "docx", "png", "jpg"].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::load(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_expiry_hours, 8);
        assert!(config.database.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load(lookup_from(&[
            ("APP_PORT", "9191"),
            ("APP_DB_CONN_STR", "postgres://localhost/languhelp"),
            ("APP_VERSION", "3"),
            ("APP_PASSWORD_SALT", "pepper"),
            ("APP_AI_ASSISTANT_ENABLED", "true"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/languhelp"));
        assert_eq!(config.app.version, "3");
        assert_eq!(config.security.password_salt, "pepper");
        assert!(config.assistant.enabled);
    }

    #[test]
    fn test_secret_key_falls_back_to_title_and_version() {
        let config = AppConfig::development();
        assert_eq!(config.secret_key(), "LanguHelp_V1");
    }

    #[test]
    fn test_production_requires_secret_and_database() {
        let config = AppConfig::load(lookup_from(&[("APP_ENV", "production"), ("APP_PASSWORD_SALT", "s")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("APP_JWT_SECRET"))));
    }

    #[test]
    fn test_config_file_uses_json_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"version": "2", "title": "Echo", "passwordSalt": "abc", "saveLocations": ["docs", "images"], "isAiAssistantEnabled": false}"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = AppConfig::load(lookup_from(&[("APP_CONFIG_FILE", path_str.as_str())])).unwrap();
        assert_eq!(config.app.title, "Echo");
        assert_eq!(config.security.password_salt, "abc");
        assert_eq!(config.storage.save_locations, vec!["docs", "images"]);
    }
}
