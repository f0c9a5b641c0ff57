use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WeebotConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the Gemini API key
    pub api_key_env: String,
    pub request_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    /// Empty values count as absent.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: ".weebot".to_string(),
        }
    }
}

impl WeebotConfig {
    /// Load config from an optional TOML file, then apply `WEEBOT__SECTION__KEY`
    /// environment overrides. Missing sections fall back to defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix("WEEBOT").separator("__"))
    }

    fn load_with_env(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = WeebotConfig::load("does-not-exist-weebot.toml").expect("defaults");
        assert_eq!(config.http.port, 8787);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.storage.data_dir, ".weebot");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weebot.toml");
        std::fs::write(&path, "[http]\nport = 9000\n\n[llm]\nmodel = \"gemini-2.5-pro\"\n").unwrap();

        let config = WeebotConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.request_timeout_seconds, 30);
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_env_override_of_single_field() {
        let vars = HashMap::from([
            ("WEEBOT__HTTP__PORT".to_string(), "9100".to_string()),
            ("WEEBOT__STORAGE__DATA_DIR".to_string(), "/tmp/weebot-data".to_string()),
        ]);
        let env = Environment::with_prefix("WEEBOT")
            .separator("__")
            .source(Some(vars));

        let config = WeebotConfig::load_with_env("does-not-exist-weebot.toml", env).unwrap();
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.storage.data_dir, "/tmp/weebot-data");
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_api_key_missing_env_is_none() {
        let llm = LlmConfig {
            api_key_env: "WEEBOT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(llm.api_key().is_none());
    }
}
