//! Environment configuration and the secrets file.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use thiserror::Error;

/// Default location of the per-environment secrets file.
pub const DEFAULT_SECRETS_PATH: &str = "config/settings/secrets.json";

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "LOCAL";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Set the {0} variable on secrets.json file.")]
    MissingSecret(String),

    #[error("Invalid secrets file: {0}")]
    InvalidSecrets(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connection and table configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Table the helpers operate on (default: "messages")
    pub table_name: String,
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Custom endpoint URL (for local DynamoDB)
    pub endpoint_url: Option<String>,
    /// Country searches are scoped to
    pub country: Option<String>,
    /// Path to the secrets file
    pub secrets_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "messages")
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - Use local DynamoDB (e.g., http://localhost:8000)
    /// - `CBDYNAMO_COUNTRY` - Country to scope index searches to
    /// - `CBDYNAMO_SECRETS_PATH` - Secrets file (default: "config/settings/secrets.json")
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DYNAMODB_TABLE_NAME").unwrap_or_else(|_| "messages".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            country: env::var("CBDYNAMO_COUNTRY").ok(),
            secrets_path: env::var("CBDYNAMO_SECRETS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH)),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Values read from the secrets file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secrets {
    values: Map<String, Value>,
}

impl Secrets {
    /// Reads and parses a secrets file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_value(serde_json::from_str(&contents)?)
    }

    /// Reads a secrets file. An absent file is `Ok(None)`.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        match Self::load(path) {
            Ok(secrets) => Ok(Some(secrets)),
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Builds secrets from an already parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(ConfigError::InvalidSecrets(
                "top level must be a JSON object".to_string(),
            )),
        }
    }

    /// Returns a string secret.
    pub fn get_secret(&self, key: &str) -> Result<&str, ConfigError> {
        match self.values.get(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(ConfigError::InvalidSecrets(format!("{key} must be a string"))),
            None => Err(ConfigError::MissingSecret(key.to_string())),
        }
    }

    /// The current environment name (`ENVIRONMENT`), `LOCAL` when unset.
    pub fn environment(&self) -> &str {
        self.get_secret("ENVIRONMENT").unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// The configured log level (`LOG_LEVEL`), lowercased.
    pub fn log_level(&self) -> Option<String> {
        self.get_secret("LOG_LEVEL").ok().map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_display() {
        let mut config = Config {
            table_name: "messages_staging".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            country: Some("chile".to_string()),
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
        };
        assert_eq!(config.target_display(), "AWS DynamoDB (region: us-east-1)");

        config.endpoint_url = Some("http://localhost:8000".to_string());
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000)"
        );
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("DYNAMODB_TABLE_NAME");
        env::remove_var("AWS_REGION");
        env::remove_var("AWS_ENDPOINT_URL");
        env::remove_var("CBDYNAMO_COUNTRY");
        env::remove_var("CBDYNAMO_SECRETS_PATH");

        let config = Config::from_env();

        assert_eq!(config.table_name, "messages");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.country, None);
        assert_eq!(config.secrets_path, PathBuf::from(DEFAULT_SECRETS_PATH));
    }

    #[test]
    fn test_get_secret() {
        let secrets =
            Secrets::from_value(json!({"ENVIRONMENT": "staging", "LOG_LEVEL": "DEBUG", "PORT": 1}))
                .unwrap();

        assert_eq!(secrets.get_secret("ENVIRONMENT").unwrap(), "staging");
        assert_eq!(secrets.environment(), "staging");
        assert_eq!(secrets.log_level().as_deref(), Some("debug"));
        assert!(matches!(
            secrets.get_secret("PORT"),
            Err(ConfigError::InvalidSecrets(_))
        ));
    }

    #[test]
    fn test_missing_secret_message() {
        let secrets = Secrets::default();
        let err = secrets.get_secret("ENVIRONMENT").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Set the ENVIRONMENT variable on secrets.json file."
        );
        assert_eq!(secrets.environment(), "LOCAL");
        assert_eq!(secrets.log_level(), None);
    }

    #[test]
    fn test_secrets_must_be_object() {
        assert!(matches!(
            Secrets::from_value(json!(["ENVIRONMENT"])),
            Err(ConfigError::InvalidSecrets(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join(format!("cbdynamo-secrets-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{"ENVIRONMENT": "production"}"#).unwrap();

        let secrets = Secrets::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(secrets.environment(), "production");
    }

    #[test]
    fn test_load_optional_missing_file() {
        let path = env::temp_dir().join(format!("cbdynamo-missing-{}.json", uuid::Uuid::new_v4()));

        assert_eq!(Secrets::load_optional(&path).unwrap(), None);
    }

    #[test]
    fn test_load_optional_invalid_file_is_error() {
        let path = env::temp_dir().join(format!("cbdynamo-invalid-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "not json").unwrap();

        let result = Secrets::load_optional(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
