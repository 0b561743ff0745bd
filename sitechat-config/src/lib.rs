//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every field has one except the API key, which
//!    defaults to the placeholder `${GOOGLE_API_KEY}`)
//! 2. YAML files / inline YAML, in the order they were added
//! 3. `SITECHAT__<SECTION>__<FIELD>` environment variables
//!
//! String values are then run through `${VAR}` expansion, so secrets can stay
//! in the environment while the file names where they come from. A key that is
//! still unresolved (or empty) after expansion fails the load: the service
//! must not start without provider credentials.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use sitechat_common::observability::LogFormat;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Environment variable holding the completion provider key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
const API_KEY_PLACEHOLDER: &str = "${GOOGLE_API_KEY}";

#[derive(Debug, Clone, Deserialize)]
pub struct SitechatConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Per-request timeout applied to the seed page and every linked page.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl CrawlConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Keep the key out of `{:?}` output.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_true")]
    pub emit_stderr: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            emit_stderr: true,
            dir: None,
            filter: default_filter(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".into()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".into()
}
fn default_max_output_tokens() -> u32 {
    2048
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "info".into()
}

/// Expand `$VAR`/`${VAR}` until a fixed point or the depth limit.
/// Unknown variables are left verbatim; a reference cycle stops at the limit.
fn expand_env_str(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let next = match shellexpand::env(&current) {
            Ok(expanded) if expanded != current => expanded.into_owned(),
            _ => break,
        };
        current = next;
    }
    current
}

fn expand_env_in_value(value: &mut Value) {
    match value {
        Value::String(s) if s.contains('$') => *s = expand_env_str(s),
        Value::Array(items) => items.iter_mut().for_each(expand_env_in_value),
        Value::Object(fields) => fields.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn validate(cfg: &SitechatConfig) -> Result<(), ConfigError> {
    let key = cfg.llm.api_key.trim();
    if key.is_empty() || key.contains("${") || key.starts_with('$') {
        return Err(ConfigError::Message(format!(
            "{API_KEY_ENV} environment variable not set"
        )));
    }
    if cfg.llm.max_output_tokens == 0 {
        return Err(ConfigError::Message(
            "llm.max_output_tokens must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SitechatConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SitechatConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SitechatConfigLoader {
    /// Start with environment overrides only (`SITECHAT__SECTION__FIELD`).
    ///
    /// ```
    /// use sitechat_config::SitechatConfigLoader;
    ///
    /// let config = SitechatConfigLoader::new()
    ///     .with_yaml_str("llm:\n  api_key: test-key")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.llm.model, "gemini-2.5-flash");
    /// assert_eq!(config.crawl.fetch_timeout_secs, 10);
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SITECHAT")
                .separator("__")
                .try_parsing(true),
        );
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the `config` crate infers
    /// format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is read when present and skipped otherwise, so
    /// deployments can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use sitechat_config::SitechatConfigLoader;
    ///
    /// let cfg = SitechatConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// server:
    ///   bind: "0.0.0.0:8080"
    /// llm:
    ///   api_key: "example"
    ///   max_output_tokens: 256
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.server.bind, "0.0.0.0:8080");
    /// assert_eq!(cfg.llm.max_output_tokens, 256);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config.
    ///
    /// ```
    /// use sitechat_config::SitechatConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_GEMINI_KEY", "injected-from-env"); }
    ///
    /// let config = SitechatConfigLoader::new()
    ///     .with_yaml_str("llm:\n  api_key: \"${DOCTEST_GEMINI_KEY}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.api_key, "injected-from-env");
    ///
    /// unsafe { std::env::remove_var("DOCTEST_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<SitechatConfig, ConfigError> {
        let cfg = self
            .builder
            .set_default("llm.api_key", API_KEY_PLACEHOLDER)?
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SitechatConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        validate(&typed)?;

        Ok(typed)
    }
}
