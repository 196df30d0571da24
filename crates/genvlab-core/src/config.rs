//! Configuration types for genvlab

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::device::Device;
use crate::error::{GenvError, GenvResult};
use crate::model::Environment;

/// API namespace of the directory service
pub const DEFAULT_NAMESPACE: &str = "jupyterlab-genv";

/// Name of the shared configuration terminal
pub const DEFAULT_TERMINAL_NAME: &str = "genv";

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> GenvResult<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GenvError::Config(format!("Failed to read config file: {}", e)))?;
    toml::from_str(&content)
        .map_err(|e| GenvError::Config(format!("Failed to parse config: {}", e)))
}

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory service connection
    pub server: ServerConfig,
    /// Configuration terminal settings
    pub terminal: TerminalConfig,
    /// Kernelspec installer settings
    pub kernelspec: KernelspecConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> GenvResult<Self> {
        read_toml(path)
    }
}

/// Directory service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the notebook server
    pub base_url: String,
    /// API namespace under the base URL
    pub namespace: String,
    /// Server token sent as `Authorization: token <token>`
    pub token: Option<String>,
    /// Request timeout in seconds (unset = transport default)
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            token: None,
            timeout_secs: None,
        }
    }
}

/// How configuration terminals are allocated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalPolicy {
    /// One terminal shared by every binding; commands are only delivered
    /// when the host creates the terminal
    #[default]
    Shared,
    /// One terminal per environment, reused across runs
    PerBinding,
}

/// Configuration terminal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Terminal name (prefix under the per-binding policy)
    pub name: String,
    /// Allocation policy
    pub policy: TerminalPolicy,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TERMINAL_NAME.to_string(),
            policy: TerminalPolicy::Shared,
        }
    }
}

/// Kernelspec installer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelspecConfig {
    /// Jupyter data directories searched for `kernels/*/kernel.json`
    pub data_dirs: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Reference directory daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Address to bind
    pub address: String,
    /// Port to bind
    pub port: u16,
    /// API namespace
    pub namespace: String,
    /// Device table, in physical index order
    pub devices: Vec<Device>,
    /// Active environments
    pub environments: Vec<Environment>,
    /// Initial kernel bindings (kernel id -> eid)
    pub bindings: BTreeMap<String, String>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8888,
            namespace: DEFAULT_NAMESPACE.to_string(),
            devices: Vec::new(),
            environments: Vec::new(),
            bindings: BTreeMap::new(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> GenvResult<Self> {
        read_toml(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server.namespace, "jupyterlab-genv");
        assert_eq!(config.server.timeout_secs, None);
        assert_eq!(config.terminal.name, "genv");
        assert_eq!(config.terminal.policy, TerminalPolicy::Shared);
    }

    #[test]
    fn test_partial_client_config() {
        let toml_str = r#"
[server]
base_url = "http://gpu-host:8888/lab"
token = "secret"

[terminal]
policy = "per-binding"
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://gpu-host:8888/lab");
        assert_eq!(config.server.namespace, "jupyterlab-genv");
        assert_eq!(config.server.token.as_deref(), Some("secret"));
        assert_eq!(config.terminal.name, "genv");
        assert_eq!(config.terminal.policy, TerminalPolicy::PerBinding);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_daemon_config_parse() {
        let toml_str = r#"
port = 9999
devices = [{ eid = "env-1" }, { eid = "" }]

[[environments]]
eid = "env-1"
user = "bob"
name = "train"

[bindings]
k1 = "env-1"
"#;
        let config: DaemonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.devices.len(), 2);
        assert!(config.devices[1].is_available());
        assert_eq!(config.environments[0].label(), "train (env-1)");
        assert_eq!(config.bindings.get("k1").map(String::as_str), Some("env-1"));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_missing_file() {
        let err = ClientConfig::from_file(Path::new("/nonexistent/genvlab.toml")).unwrap_err();
        assert!(matches!(err, GenvError::Config(_)));
    }
}
