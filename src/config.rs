use std::env;
use std::path::PathBuf;

pub const LEDGER_ENV: &str = "SUPPLIER_DEALER_LEDGER";
pub const LOG_ENV: &str = "SUPPLIER_DEALER_LOG";

/// Host runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Name the chaincode is deployed under (used in logs)
    pub name: String,

    /// Snapshot file for a durable ledger; `None` keeps state in memory
    pub ledger_path: Option<PathBuf>,

    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub log_filter: String,
}

impl HostConfig {
    pub fn new() -> Self {
        Self {
            name: "supplier-dealer".to_string(),
            ledger_path: None,
            log_filter: "info".to_string(),
        }
    }

    /// Defaults overridden by `SUPPLIER_DEALER_LEDGER` and
    /// `SUPPLIER_DEALER_LOG` when they are set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(path) = non_empty_var(LEDGER_ENV) {
            config.ledger_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = non_empty_var(LOG_ENV) {
            config.log_filter = filter;
        }
        config
    }

    /// Set the deployment name
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Persist the ledger at `path`
    pub fn ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = Some(path.into());
        self
    }

    /// Keep the ledger in memory only
    pub fn in_memory(mut self) -> Self {
        self.ledger_path = None;
        self
    }

    /// Set the default log filter
    pub fn log_filter(mut self, filter: &str) -> Self {
        self.log_filter = filter.to_string();
        self
    }

    pub fn is_durable(&self) -> bool {
        self.ledger_path.is_some()
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.name, "supplier-dealer");
        assert_eq!(config.log_filter, "info");
        assert!(!config.is_durable());
    }

    #[test]
    fn test_builder() {
        let config = HostConfig::new()
            .name("dealer-7")
            .ledger_path("/tmp/dealer.ledger")
            .log_filter("supplier_dealer=debug");

        assert_eq!(config.name, "dealer-7");
        assert_eq!(config.ledger_path, Some(PathBuf::from("/tmp/dealer.ledger")));
        assert_eq!(config.log_filter, "supplier_dealer=debug");
        assert!(!config.in_memory().is_durable());
    }
}
