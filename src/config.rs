use crate::brightness::TrainingSettings;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject settings the trainer or the subscriber would refuse later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.training
            .boosting_params()
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.training.scenarios_per_hour == 0 {
            return Err(ConfigError::Invalid(
                "training.scenarios_per_hour must be at least 1".to_string(),
            ));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        self.logging
            .level
            .parse::<Level>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.logging.level)))
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_config(label: &str, contents: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("lumen-config-{label}-{unique}.toml"));
        fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn default_config_is_valid() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_default()?;
        assert_eq!(config.training.trees, 30);
        assert_eq!(config.log_level()?, Level::INFO);
        Ok(())
    }

    #[test]
    fn missing_training_section_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config(
            "no-training",
            r#"
[app]
name = "lumen-flow"

[logging]
level = "debug"
"#,
        )?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);
        let config = result?;

        assert_eq!(config.training, TrainingSettings::default());
        assert_eq!(config.server_port(), DEFAULT_SERVER_PORT);
        Ok(())
    }

    #[test]
    fn partial_training_section_keeps_other_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config(
            "partial",
            r#"
[app]
name = "lumen-flow"

[logging]
level = "info"

[training]
trees = 10
seed = 42

[server]
port = 9000
"#,
        )?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);
        let config = result?;

        assert_eq!(config.training.trees, 10);
        assert_eq!(config.training.seed, Some(42));
        assert_eq!(config.training.learning_rate, 0.1);
        assert_eq!(config.training.max_depth, 3);
        assert_eq!(config.server_port(), 9000);
        Ok(())
    }

    #[test]
    fn zero_learning_rate_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config(
            "bad-rate",
            r#"
[app]
name = "lumen-flow"

[logging]
level = "info"

[training]
learning_rate = 0.0
"#,
        )?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn zero_scenarios_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config(
            "no-scenarios",
            r#"
[app]
name = "lumen-flow"

[logging]
level = "info"

[training]
scenarios_per_hour = 0
"#,
        )?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn unknown_log_level_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config(
            "bad-level",
            r#"
[app]
name = "lumen-flow"

[logging]
level = "loud"
"#,
        )?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("lumen-config-missing-{unique}.toml"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn invalid_toml_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let path = temp_config("invalid", "not = [valid")?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }
}
