//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. statgate.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::Error;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "statgate.toml";

/// Statista MCP endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatistaConfig {
    /// Sent as the `x-api-key` header. Absence is reported as an
    /// authentication failure on first use, not at startup.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// MCP endpoint
    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,

    /// Upper bound for a single remote call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after the first attempt (timeouts and upstream errors only)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between attempts
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// `max_results` used when a search call does not give one
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
}

impl StatistaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.retry_delay_secs))
    }

    /// The API key, if set and not blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl Default for StatistaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            mcp_url: default_mcp_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            default_max_results: default_max_results(),
        }
    }
}

/// JSON-RPC host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Bearer token required on `/jsonrpc`. No token disables the check.
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,

    /// URL advertised in the agent card
    pub public_url: Option<String>,

    /// Session context logs kept in memory before the oldest is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl ApiConfig {
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            bearer_token: None,
            public_url: None,
            max_sessions: default_max_sessions(),
        }
    }
}

/// Main configuration for statgate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub statista: StatistaConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_mcp_url() -> String {
    "https://api.statista.ai/v1/mcp".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_max_results() -> usize {
    10
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8001
}

fn default_max_sessions() -> usize {
    crate::context::DEFAULT_MAX_SESSIONS
}

impl Config {
    /// `${VAR_NAME}` を `lookup` の値に置換する
    ///
    /// 未定義の変数は空文字列になります。
    fn expand_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Some(env_value) = lookup(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse TOML text, expanding `${VAR}` with `lookup`
    fn from_toml_str(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> crate::Result<Self> {
        let expanded = Self::expand_vars(content, lookup);
        toml::from_str(&expanded).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 環境変数による上書きが最後に適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content, env_lookup)?;
        cfg.apply_overrides(env_lookup);
        Ok(cfg)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./statgate.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_overrides(env_lookup);
        cfg
    }

    /// 環境変数で設定を上書きする
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Statista 設定の上書き
        if let Some(key) = lookup("STATISTA_API_KEY") {
            self.statista.api_key = Some(key);
        }
        if let Some(url) = lookup("STATISTA_MCP_URL") {
            self.statista.mcp_url = url;
        }
        if let Some(secs) = lookup("STATISTA_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.statista.request_timeout_secs = secs;
        }
        if let Some(n) = lookup("STATISTA_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            self.statista.max_retries = n;
        }
        if let Some(secs) = lookup("STATISTA_RETRY_DELAY_SECS").and_then(|v| v.parse().ok()) {
            self.statista.retry_delay_secs = secs;
        }

        // API 設定の上書き
        if let Some(host) = lookup("API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = port;
        }
        if let Some(token) = lookup("A2A_BEARER_TOKEN") {
            self.api.bearer_token = Some(token);
        }
        if let Some(url) = lookup("API_PUBLIC_URL") {
            self.api.public_url = Some(url);
        }
        if let Some(n) = lookup("API_MAX_SESSIONS").and_then(|v| v.parse().ok()) {
            self.api.max_sessions = n;
        }
    }
}

/// Non-empty environment variable
fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
