// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    /// Vision-capable model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o",
            Self::Anthropic => "claude-3-opus-20240229",
            Self::Ollama => "llava:13b",
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/data` (created on startup)
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Largest accepted upload body in bytes (default 20 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Origins allowed to call the API with credentials
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("storage")
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:80".into(),
        "http://localhost:3000".into(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage_path: default_storage_path(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// MongoDB connection used by the heartbeat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// host[:port], without scheme
    #[serde(default = "default_mongo_server_url")]
    pub server_url: String,

    #[serde(default = "default_mongo_username")]
    pub username: String,

    #[serde(default = "default_mongo_password")]
    pub password: String,

    #[serde(default = "default_mongo_db_name")]
    pub db_name: String,

    #[serde(default = "default_mongo_auth_source")]
    pub auth_source: String,

    #[serde(default = "default_mongo_auth_mechanism")]
    pub auth_mechanism: String,

    /// Server selection and connect timeout in milliseconds
    #[serde(default = "default_mongo_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_mongo_server_url() -> String {
    "localhost:27017".into()
}
fn default_mongo_username() -> String {
    "root".into()
}
fn default_mongo_password() -> String {
    "example".into()
}
fn default_mongo_db_name() -> String {
    "mydb".into()
}
fn default_mongo_auth_source() -> String {
    "admin".into()
}
fn default_mongo_auth_mechanism() -> String {
    "SCRAM-SHA-256".into()
}
fn default_mongo_timeout_ms() -> u64 {
    2_000
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            server_url: default_mongo_server_url(),
            username: default_mongo_username(),
            password: default_mongo_password(),
            db_name: default_mongo_db_name(),
            auth_source: default_mongo_auth_source(),
            auth_mechanism: default_mongo_auth_mechanism(),
            timeout_ms: default_mongo_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: Provider,

    /// Model name; falls back to the provider's default vision model
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for OpenAI-compatible APIs (default: https://api.openai.com/v1)
    #[serde(default)]
    pub openai_base_url: Option<String>,

    /// Base URL for the Anthropic API (default: https://api.anthropic.com/v1)
    #[serde(default)]
    pub anthropic_base_url: Option<String>,

    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    /// Request timeout in seconds (default 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// LLM temperature (0.0-2.0, default 0.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate (default 1024)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Extraction attempts before giving up on malformed output (default 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub mongo: MongoConfig,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_attempts() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            openai_base_url: None,
            anthropic_base_url: None,
            ollama_host: default_ollama_host(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            server: ServerConfig::default(),
            mongo: MongoConfig::default(),
        }
    }
}

impl Config {
    /// Load with priority: CLI > SPLITZIE_* > legacy ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (splitzie.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join("splitzie.toml");
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        // User-level config
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(&path));
        }

        // Deployment variables kept from the docker-compose setup
        figment = figment
            .merge(Env::raw().only(&["LLM_PROVIDER"]).map(|_| "provider".into()))
            .merge(
                Env::raw()
                    .only(&["DATA_STORAGE_PATH"])
                    .map(|_| "server.storage_path".into()),
            )
            .merge(Env::prefixed("MONGO_").map(|key| format!("mongo.{}", key.as_str()).into()));

        // Environment variables (SPLITZIE_MODEL, SPLITZIE_PROVIDER, etc.)
        // Use __ separator for nested keys (e.g., SPLITZIE_SERVER__PORT)
        figment = figment.merge(Env::prefixed("SPLITZIE_").split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // CLI overrides (highest priority)
        config.apply_cli(cli)?;

        // Provider-specific API key fallback, once the provider is final
        if config.api_key.is_none() {
            config.api_key = match config.provider {
                Provider::OpenAI => std::env::var("OPENAI_API_KEY").ok(),
                Provider::Anthropic => std::env::var("ANTHROPIC_API_KEY").ok(),
                Provider::Ollama => None,
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "splitzie").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Configured model, or the provider default.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(ref p) = cli.provider {
            self.provider = Provider::parse(p).ok_or_else(|| {
                Error::Config(format!(
                    "unknown provider '{p}', expected openai, anthropic or ollama"
                ))
            })?;
        }
        if let Some(ref m) = cli.model {
            self.model = Some(m.clone());
        }
        if let Some(ref host) = cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.requires_api_key()
            && self.api_key.as_deref().is_none_or(|k| k.trim().is_empty())
        {
            return Err(Error::Config(format!(
                "{} requires an API key. Set SPLITZIE_API_KEY or {}_API_KEY",
                self.provider,
                format!("{:?}", self.provider).to_uppercase()
            )));
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be 0.0–2.0, got {}",
                self.temperature
            )));
        }

        if !(64..=32_768).contains(&self.max_tokens) {
            return Err(Error::Config(format!(
                "max_tokens must be 64–32768, got {}",
                self.max_tokens
            )));
        }

        if !(1..=10).contains(&self.max_attempts) {
            return Err(Error::Config(format!(
                "max_attempts must be 1–10, got {}",
                self.max_attempts
            )));
        }

        Self::validate_base_url("ollama_host", &self.ollama_host)?;
        if let Some(ref url) = self.openai_base_url {
            Self::validate_base_url("openai_base_url", url)?;
        }
        if let Some(ref url) = self.anthropic_base_url {
            Self::validate_base_url("anthropic_base_url", url)?;
        }

        if self.server.port == 0 {
            return Err(Error::Config("server.port cannot be 0".into()));
        }

        if self.server.storage_path.as_os_str().is_empty() {
            return Err(Error::Config("server.storage_path cannot be empty".into()));
        }

        if self.mongo.server_url.contains("://") {
            return Err(Error::Config(format!(
                "mongo.server_url must be host[:port] without a scheme, got '{}'",
                self.mongo.server_url
            )));
        }

        Ok(())
    }

    fn validate_base_url(name: &str, value: &str) -> Result<()> {
        let parsed = url::Url::parse(value)
            .map_err(|e| Error::Config(format!("{name} is not a valid URL ('{value}'): {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "{name} must start with http:// or https://, got '{value}'"
            )));
        }

        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# Splitzie Configuration

# LLM provider: openai, anthropic, ollama
provider = "openai"

# Vision model (defaults: gpt-4o, claude-3-opus-20240229, llava:13b)
# model = "gpt-4o"

# API key (or set OPENAI_API_KEY / ANTHROPIC_API_KEY)
# api_key = ""

# Ollama server URL
ollama_host = "http://localhost:11434"

# Request timeout in seconds
timeout_secs = 60

# Extraction attempts before giving up on malformed LLM output
max_attempts = 5

[server]
host = "0.0.0.0"
port = 8000

# Files under this directory are served at /data/<path>
storage_path = "storage"

cors_origins = ["http://localhost:80", "http://localhost:3000"]

[mongo]
server_url = "localhost:27017"
username = "root"
password = "example"
db_name = "mydb"
auth_source = "admin"
auth_mechanism = "SCRAM-SHA-256"
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}
