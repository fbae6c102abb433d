//! Settings structures for med-aggregator configuration

use crate::search::SourceId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub sources: Vec<SourceConfig>,
    pub llm: LlmSettings,
    pub cache: CacheSettings,
    pub limiter: LimiterSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Overlay values from environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("HOST") {
            self.server.bind_address = val;
        }
        if let Some(port) = var("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("ALLOWED_ORIGINS") {
            self.server.allowed_origins = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(val) = var("LOG_LEVEL") {
            self.server.log_level = val.to_lowercase();
        }
        if let Some(val) = var("STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(val));
        }
        if let Some(timeout) = var("REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.outgoing.request_timeout = timeout;
        }

        if let Some(val) = var("FDA_API_KEY") {
            self.source_mut(SourceId::Fda).api_key = Some(val);
        }
        if let Some(val) = var("NCBI_API_KEY") {
            self.source_mut(SourceId::Ncbi).api_key = Some(val);
        }
        if let Some(val) = var("NCBI_EMAIL") {
            self.source_mut(SourceId::Ncbi).set_extra("email", val);
        }
        if let Some(val) = var("SERPER_API_KEY") {
            self.source_mut(SourceId::News).api_key = Some(val);
        }
        if let Some(val) = var("SEC_USER_AGENT") {
            self.source_mut(SourceId::Sec).set_extra("user_agent", val);
        }
        if let Some(val) = var("SNOMED_EDITION") {
            self.source_mut(SourceId::Snomed).set_extra("edition", val);
        }

        if let Some(val) = var("GROQ_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Some(val) = var("LLM_MODEL") {
            self.llm.model = val;
        }
        if let Some(val) = var("LLM_BASE_URL") {
            self.llm.base_url = val;
        }

        if let Some(val) = var("CACHE_ENABLED") {
            self.cache.enabled = parse_flag(&val);
        }
        if let Some(ttl) = var("CACHE_TTL").and_then(|v| v.parse().ok()) {
            self.cache.ttl = ttl;
        }
        if let Some(val) = var("RATE_LIMIT_ENABLED") {
            self.limiter.enabled = parse_flag(&val);
        }
        if let Some(n) = var("RATE_LIMIT_REQUESTS").and_then(|v| v.parse().ok()) {
            self.limiter.requests = n;
        }
        if let Some(n) = var("RATE_LIMIT_PERIOD").and_then(|v| v.parse().ok()) {
            self.limiter.period = n;
        }
    }

    /// Get source config by id
    pub fn get_source(&self, id: SourceId) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Get a mutable source config, creating a default entry if missing
    fn source_mut(&mut self, id: SourceId) -> &mut SourceConfig {
        let pos = match self.sources.iter().position(|s| s.id == id) {
            Some(pos) => pos,
            None => {
                self.sources.push(SourceConfig::new(id));
                self.sources.len() - 1
            }
        };
        &mut self.sources[pos]
    }
}

/// Convert a configured number of seconds, falling back when the value is
/// negative, NaN or too large for a `Duration`
pub fn secs_or(secs: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        warn!("Invalid timeout {}s, using {:?}", secs, fallback);
        fallback
    })
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "t" | "yes" | "on")
}

/// Inbound server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Allowed CORS origins, "*" allows any
    pub allowed_origins: Vec<String>,
    /// Directory holding a built frontend to serve at /
    pub static_dir: Option<PathBuf>,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
            allowed_origins: vec!["*".to_string()],
            static_dir: None,
            log_level: "info".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default per-source timeout in seconds
    pub request_timeout: f64,
    /// Ceiling for any per-source timeout
    pub max_request_timeout: f64,
    /// User agent sent to providers
    pub user_agent: String,
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            max_request_timeout: crate::MAX_TIMEOUT as f64,
            user_agent: format!("med-aggregator/{}", crate::VERSION),
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

impl OutgoingSettings {
    /// Default per-source timeout
    pub fn default_timeout(&self) -> Duration {
        secs_or(self.request_timeout, Duration::from_secs(crate::DEFAULT_TIMEOUT))
    }

    /// Ceiling for any per-source timeout
    pub fn max_timeout(&self) -> Duration {
        secs_or(self.max_request_timeout, Duration::from_secs(crate::MAX_TIMEOUT))
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Individual source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which source this entry configures
    pub id: SourceId,
    /// Whether the source is disabled
    #[serde(default)]
    pub disabled: bool,
    /// Custom timeout for this source in seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Override for the provider endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key if the provider takes one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum number of records requested from the provider
    #[serde(default)]
    pub max_results: Option<u32>,
    /// Additional source-specific settings
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl SourceConfig {
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            disabled: false,
            timeout: None,
            base_url: None,
            api_key: None,
            max_results: None,
            extra: HashMap::new(),
        }
    }

    /// Read a string entry from the extra settings
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Read an integer entry from the extra settings
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(|v| v.as_u64())
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<String>) {
        self.extra
            .insert(key.to_string(), serde_yaml::Value::String(value.into()));
    }
}

/// Summarization call timeout in seconds
const DEFAULT_LLM_TIMEOUT: u64 = 45;

/// Hosted text-generation model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Disable summarization entirely
    pub disabled: bool,
    /// OpenAI-compatible API base (chat/completions is appended)
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Timeout for the summarization call in seconds
    pub timeout: f64,
    /// Items per source included in the prompt
    pub max_items_per_source: usize,
    /// Upper bound on the serialized data embedded in the prompt
    pub max_context_chars: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout: DEFAULT_LLM_TIMEOUT as f64,
            max_items_per_source: 10,
            max_context_chars: 24_000,
        }
    }
}

impl LlmSettings {
    /// Timeout for the summarization call
    pub fn call_timeout(&self) -> Duration {
        secs_or(self.timeout, Duration::from_secs(DEFAULT_LLM_TIMEOUT))
    }
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: 3600,
            max_capacity: 1000,
        }
    }
}

/// Inbound rate limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterSettings {
    pub enabled: bool,
    /// Requests allowed per period
    pub requests: u32,
    /// Period length in seconds
    pub period: u64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            requests: 100,
            period: 3600,
        }
    }
}
