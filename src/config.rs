use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;

use crate::clients::openai_client::DEFAULT_OPENAI_BASE_URL;
use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATABASE: &str = "eventdb";
pub const DEFAULT_COLLECTION: &str = "events";

// Env-style key=value file, consulted before the process environment.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    pub fn get_prop(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }

    pub fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get_prop(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                key: key.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo {
        uri: String,
        database: String,
        collection: String,
    },
    Memory,
}

impl StoreBackend {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let backend = config
            .get_prop("STORE_BACKEND")
            .unwrap_or_else(|| "mongo".to_string());
        match backend.as_str() {
            "mongo" => Ok(StoreBackend::Mongo {
                uri: config.require("MONGO_URI")?,
                database: config
                    .get_prop("MONGO_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                collection: config
                    .get_prop("MONGO_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            }),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
}

impl ApiSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let raw = config
            .get_prop("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw.clone()))?;
        Ok(Self {
            bind_addr,
            store: StoreBackend::from_config(config)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
}

impl AssistantSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: resolve_api_key(|key| config.get_prop(key))?,
            assistant_id: config.require("ASSISTANT_ID")?,
            base_url: config
                .get_prop("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        })
    }
}

const API_KEY_NAMES: [&str; 2] = ["OPENAI_API_KEY", "openai_apikey"];

// First non-empty value wins; errors name the primary key.
fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    API_KEY_NAMES
        .iter()
        .find_map(|key| lookup(key).filter(|value| !value.is_empty()))
        .ok_or_else(|| ConfigError::Missing {
            key: API_KEY_NAMES[0].to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_style_lines() {
        let config = AppConfig::parse(
            "# comment\n\nexport MONGO_URI=\"mongodb://localhost:27017\"\nASSISTANT_ID = 'asst_1'\nRUN_MODE=api\n",
        )
        .unwrap();
        assert_eq!(config.get("MONGO_URI").as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(config.get("ASSISTANT_ID").as_deref(), Some("asst_1"));
        assert_eq!(config.get("RUN_MODE").as_deref(), Some("api"));
    }

    #[test]
    fn rejects_lines_without_equals() {
        let err = AppConfig::parse("GOOD=1\nnot a pair\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let config = AppConfig::parse("STORE_BACKEND=memory\nBIND_ADDR=0.0.0.0:8080\n").unwrap();
        let settings = ApiSettings::from_config(&config).unwrap();
        assert_eq!(settings.store, StoreBackend::Memory);
        assert_eq!(settings.bind_addr.port(), 8080);
    }

    #[test]
    fn mongo_backend_applies_defaults() {
        let config = AppConfig::parse("STORE_BACKEND=mongo\nMONGO_URI=mongodb://db:27017\n").unwrap();
        assert_eq!(
            StoreBackend::from_config(&config).unwrap(),
            StoreBackend::Mongo {
                uri: "mongodb://db:27017".to_string(),
                database: "eventdb".to_string(),
                collection: "events".to_string(),
            }
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = AppConfig::parse("STORE_BACKEND=sqlite\n").unwrap();
        assert!(matches!(
            StoreBackend::from_config(&config),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn api_key_falls_back_to_legacy_name() {
        let config = AppConfig::parse("openai_apikey=sk-legacy\n").unwrap();
        assert_eq!(resolve_api_key(|key| config.get(key)).unwrap(), "sk-legacy");
    }

    #[test]
    fn api_key_prefers_primary_name() {
        let config = AppConfig::parse("OPENAI_API_KEY=sk-new\nopenai_apikey=sk-legacy\n").unwrap();
        assert_eq!(resolve_api_key(|key| config.get(key)).unwrap(), "sk-new");
    }

    #[test]
    fn missing_api_key_names_primary_key() {
        let config = AppConfig::parse("OPENAI_API_KEY=\n").unwrap();
        let err = resolve_api_key(|key| config.get(key)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key } if key == "OPENAI_API_KEY"));
    }
}
