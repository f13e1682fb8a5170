//! Harness configuration
//!
//! One explicit structure handed to every runner and session. Values come from
//! a TOML file, then environment overrides, then [`HarnessConfig::validate`].
//!
//! ```toml
//! topic = "data"
//!
//! [broker]
//! host = "localhost"
//! port = 1883
//! keep_alive_secs = 60
//!
//! [publisher]
//! count = 20
//! device_id = 1
//! min_delay_secs = 1
//! max_delay_secs = 5
//!
//! [subscriber]
//! sessions = 2
//! ```

use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use telemq_core::{TopicName, DEFAULT_TOPIC};

use crate::error::ConfigError;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "TELEMQ_CONFIG";
/// Settings file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "telemq.toml";
pub const BROKER_HOST_ENV: &str = "TELEMQ_BROKER_HOST";
pub const BROKER_PORT_ENV: &str = "TELEMQ_BROKER_PORT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Topic shared by publishers and subscribers
    pub topic: String,
    pub broker: BrokerConfig,
    pub publisher: PublisherConfig,
    pub subscriber: SubscriberConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            broker: BrokerConfig::default(),
            publisher: PublisherConfig::default(),
            subscriber: SubscriberConfig::default(),
        }
    }
}

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Broker host name or address (default: localhost)
    pub host: String,
    /// Broker TCP port (default: 1883)
    pub port: u16,
    /// Keep-alive in seconds, 0 disables pings (default: 60)
    pub keep_alive_secs: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            keep_alive_secs: 60,
        }
    }
}

impl BrokerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn keep_alive(&self) -> Option<Duration> {
        match self.keep_alive_secs {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    /// Number of messages to publish (default: 20)
    pub count: u64,
    /// Device number embedded in every payload (default: 1)
    pub device_id: u32,
    /// Lower bound of the random delay before each publish (default: 1)
    pub min_delay_secs: u64,
    /// Upper bound of the random delay before each publish (default: 5)
    pub max_delay_secs: u64,
    pub client_id_prefix: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            count: 20,
            device_id: 1,
            min_delay_secs: 1,
            max_delay_secs: 5,
            client_id_prefix: "publisher".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriberConfig {
    pub client_id_prefix: String,
    /// Sessions started by the multi-subscriber coordinator (default: 2)
    pub sessions: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            client_id_prefix: "subscriber".to_string(),
            sessions: 2,
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Like [`HarnessConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Settings file from `TELEMQ_CONFIG` (or `telemq.toml`), then
    /// `TELEMQ_BROKER_HOST` / `TELEMQ_BROKER_PORT` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_or_default(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(BROKER_HOST_ENV) {
            debug!("Broker host overridden to {}", host);
            self.broker.host = host;
        }
        if let Some(port) = lookup(BROKER_PORT_ENV) {
            self.broker.port = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("{} is not a valid port: {:?}", BROKER_PORT_ENV, port))
            })?;
            debug!("Broker port overridden to {}", self.broker.port);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topic_name()?;
        if self.broker.host.is_empty() {
            return Err(ConfigError::Invalid("broker.host must not be empty".into()));
        }
        if self.broker.port == 0 {
            return Err(ConfigError::Invalid("broker.port must not be 0".into()));
        }
        if self.publisher.min_delay_secs > self.publisher.max_delay_secs {
            return Err(ConfigError::Invalid(format!(
                "publisher.min_delay_secs ({}) exceeds publisher.max_delay_secs ({})",
                self.publisher.min_delay_secs, self.publisher.max_delay_secs
            )));
        }
        if self.subscriber.sessions == 0 {
            return Err(ConfigError::Invalid("subscriber.sessions must be at least 1".into()));
        }
        Ok(())
    }

    pub fn topic_name(&self) -> Result<TopicName, ConfigError> {
        TopicName::new(&self.topic)
            .map_err(|e| ConfigError::Invalid(format!("topic {:?}: {}", self.topic, e)))
    }
}
