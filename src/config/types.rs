use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    /// Basic-auth credentials for the documentation pages. The pages are not
    /// mounted when this section is absent.
    #[serde(default)]
    pub docs: Option<DocsConfig>,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected as the first path segment of every API route.
    pub api_secret: String,
    /// Serve `/inchi-to-inchikey-plain` without checking the secret, as the
    /// first release of the API did.
    #[serde(default)]
    pub allow_unauthenticated_inchi_key_plain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_username")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Python interpreter with RDKit, IsoSpecPy and matplotlib installed.
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            workers: default_workers(),
            request_timeout_secs: default_request_timeout_secs(),
            env: HashMap::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_docs_username() -> String {
    "user".to_string()
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_workers() -> usize {
    2
}

fn default_request_timeout_secs() -> u64 {
    30
}
