//! # Configuration
//!
//! [`Settings`] are assembled with `figment` from three layers, later layers winning:
//!
//! 1. built-in defaults ([`Settings::default`]);
//! 2. a YAML file, when one is given (explicitly or through `ORDER_SERVICE_CONFIG`);
//! 3. environment variables prefixed `ORDER_SERVICE_`, with `__` separating nested keys.
//!
//! ```yaml
//! customer_service:
//!   service_name: customerservice
//!   request_timeout_ms: 5000
//!   selection: round_robin
//! orders_by_customer:
//!   core_size: 30
//!   max_queue_size: 10
//!   timeout_ms: 7000
//! discovery:
//!   kind: consul
//!   base_url: http://localhost:8500
//! store:
//!   buffer_size: 32
//! ```
//!
//! `ORDER_SERVICE_ORDERS_BY_CUSTOMER__TIMEOUT_MS=2000` overrides the timeout from either.
//!
//! A configured static `services` table replaces the built-in one; the default
//! `customerservice` entry at `localhost:8080` only applies when no table is given.

use crate::clients::DEFAULT_SERVICE_NAME;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use resilience::invoker::DEFAULT_TIMEOUT;
use resilience::{BulkheadConfig, SelectionPolicy, ServiceInstance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "ORDER_SERVICE_";
pub const CONFIG_PATH_ENV: &str = "ORDER_SERVICE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Figment(#[from] figment::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub customer_service: CustomerServiceSettings,
    pub orders_by_customer: CommandSettings,
    pub discovery: DiscoverySettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerServiceSettings {
    /// Logical name resolved through the registry.
    pub service_name: String,
    pub request_timeout_ms: u64,
    pub selection: SelectionPolicy,
}

impl Default for CustomerServiceSettings {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            request_timeout_ms: 5000,
            selection: SelectionPolicy::First,
        }
    }
}

impl CustomerServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Bulkhead and deadline for one guarded command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub core_size: usize,
    pub max_queue_size: usize,
    pub timeout_ms: u64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        let bulkhead = BulkheadConfig::default();
        Self {
            core_size: bulkhead.core_size,
            max_queue_size: bulkhead.max_queue_size,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CommandSettings {
    pub fn bulkhead(&self) -> BulkheadConfig {
        BulkheadConfig::new(self.core_size, self.max_queue_size)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoverySettings {
    /// A fixed table of instances per service name.
    Static {
        #[serde(default)]
        services: HashMap<String, Vec<ServiceInstance>>,
    },
    /// A Consul agent, e.g. `http://localhost:8500`.
    Consul { base_url: String },
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings::Static {
            services: HashMap::from([(
                DEFAULT_SERVICE_NAME.to_string(),
                vec![ServiceInstance::new("localhost", 8080)],
            )]),
        }
    }
}

impl DiscoverySettings {
    fn unconfigured() -> Self {
        DiscoverySettings::Static {
            services: HashMap::new(),
        }
    }

    fn or_default_services(self) -> Self {
        match self {
            DiscoverySettings::Static { services } if services.is_empty() => Self::default(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub buffer_size: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

impl Settings {
    /// Loads settings, reading the YAML file named by `ORDER_SERVICE_CONFIG` if it is set.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load_from(Some(Path::new(&path))),
            None => Self::load_from(None),
        }
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
        }
        Self::from_figment(Self::figment(path))
    }

    /// The layered figment, without validation.
    ///
    /// Nested maps merge key by key, so the default static table is left out of the
    /// defaults layer and filled in by [`from_figment`](Self::from_figment) instead.
    pub fn figment(path: Option<&Path>) -> Figment {
        let defaults = Settings {
            discovery: DiscoverySettings::unconfigured(),
            ..Settings::default()
        };
        let mut figment = Figment::from(Serialized::defaults(defaults));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut settings: Settings = figment.extract()?;
        settings.discovery = settings.discovery.or_default_services();
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.customer_service.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "customer_service.service_name must not be empty".to_string(),
            ));
        }
        if self.customer_service.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "customer_service.request_timeout_ms must be at least 1".to_string(),
            ));
        }
        self.orders_by_customer
            .bulkhead()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("orders_by_customer: {e}")))?;
        if self.orders_by_customer.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "orders_by_customer.timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.store.buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "store.buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
