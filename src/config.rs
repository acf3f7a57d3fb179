//! Configuration management for Turnstile.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{Result, TurnstileError};
use crate::ratelimit::{
    Policy, RateLimiter, RateLimiterBackend, ShardedRateLimiter, DEFAULT_LIMIT, DEFAULT_PERIOD,
};

/// Prefix for environment variable overrides, e.g. `TURNSTILE__SERVER__LISTEN_ADDR`.
const ENV_PREFIX: &str = "TURNSTILE";
const ENV_SEPARATOR: &str = "__";

/// Longest lockout accepted from configuration (one year).
pub const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Main configuration for the Turnstile service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnstileConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Which limiter implementation holds the per-client state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Both tables behind one exclusive lock.
    #[default]
    SingleLock,
    /// Per-identity records spread over independently locked shards.
    Sharded,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Requests accepted per client before the next one is penalized
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Lockout applied to a penalized client, in seconds
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,

    /// Limiter backend
    #[serde(default)]
    pub backend: Backend,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            period_secs: default_period_secs(),
            backend: Backend::default(),
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_period_secs() -> u64 {
    DEFAULT_PERIOD.as_secs()
}

impl RateLimitingConfig {
    /// The limiter policy described by this section.
    pub fn policy(&self) -> Policy {
        Policy::new(self.limit, Duration::from_secs(self.period_secs))
    }

    /// Build the configured limiter backend with an empty state.
    pub fn build_limiter(&self) -> Arc<dyn RateLimiterBackend> {
        match self.backend {
            Backend::SingleLock => Arc::new(RateLimiter::with_policy(self.policy())),
            Backend::Sharded => Arc::new(ShardedRateLimiter::with_policy(self.policy())),
        }
    }
}

impl TurnstileConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TurnstileConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TurnstileError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from built-in defaults, an optional YAML file and
    /// `TURNSTILE__*` environment variables, later sources winning.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: TurnstileConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the limiter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limiting.period_secs == 0 {
            return Err(TurnstileError::Config(
                "rate_limiting.period_secs must be greater than zero".to_string(),
            ));
        }
        if self.rate_limiting.period_secs > MAX_PERIOD_SECS {
            return Err(TurnstileError::Config(format!(
                "rate_limiting.period_secs must not exceed {}",
                MAX_PERIOD_SECS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TurnstileConfig::default();

        assert_eq!(config.server.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.rate_limiting.limit, 20);
        assert_eq!(config.rate_limiting.period_secs, 10);
        assert_eq!(config.rate_limiting.backend, Backend::SingleLock);
    }

    #[test]
    fn test_policy_from_section() {
        let policy = RateLimitingConfig::default().policy();

        assert_eq!(policy.limit(), 20);
        assert_eq!(policy.period(), Duration::from_secs(10));
    }

    #[test]
    fn test_build_limiter_uses_policy() {
        let section = RateLimitingConfig {
            limit: 2,
            period_secs: 5,
            backend: Backend::Sharded,
        };
        let limiter = section.build_limiter();
        let now = std::time::Instant::now();

        assert!(limiter.decide("client", now).is_allowed());
        assert!(limiter.decide("client", now).is_allowed());
        assert!(limiter.decide("client", now).is_rejected());
        assert_eq!(limiter.lockout_expiry("client"), Some(now + Duration::from_secs(5)));
        assert_eq!(limiter.policy(), section.policy());
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
rate_limiting:
  limit: 5
  backend: sharded
"#;
        let config = TurnstileConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.rate_limiting.limit, 5);
        assert_eq!(config.rate_limiting.period_secs, 10);
        assert_eq!(config.rate_limiting.backend, Backend::Sharded);
        assert_eq!(config.server.listen_addr, default_listen_addr());
    }

    #[test]
    fn test_from_yaml_server_section() {
        let yaml = r#"
server:
  listen_addr: "127.0.0.1:9000"
"#;
        let config = TurnstileConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_zero_period_rejected() {
        let yaml = r#"
rate_limiting:
  period_secs: 0
"#;
        let result = TurnstileConfig::from_yaml(yaml);
        assert!(matches!(result, Err(TurnstileError::Config(_))));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let result = TurnstileConfig::from_yaml("rate_limiting: [not, a, map]");
        assert!(matches!(result, Err(TurnstileError::Config(_))));
    }

    #[test]
    fn test_oversized_period_rejected() {
        let yaml = "rate_limiting:\n  limit: 1\n  period_secs: 18446744073709551615";
        let result = TurnstileConfig::from_yaml(yaml);
        assert!(matches!(result, Err(TurnstileError::Config(_))));

        let yaml = format!("rate_limiting:\n  period_secs: {}", MAX_PERIOD_SECS);
        assert!(TurnstileConfig::from_yaml(&yaml).is_ok());
    }

    /// Serializes tests that read or write `TURNSTILE__*` variables.
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    fn write_temp_yaml(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "turnstile-{}-{}.yaml",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let _env = ENV_LOCK.lock();
        let config = TurnstileConfig::load(None).unwrap();
        assert_eq!(config.rate_limiting.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_load_from_file() {
        let _env = ENV_LOCK.lock();
        let path = write_temp_yaml("file", "rate_limiting:\n  limit: 3\n  period_secs: 30");

        let config = TurnstileConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.rate_limiting.limit, 3);
        assert_eq!(config.rate_limiting.period_secs, 30);
    }

    #[test]
    fn test_load_env_overrides_defaults() {
        let _env = ENV_LOCK.lock();
        std::env::set_var("TURNSTILE__RATE_LIMITING__LIMIT", "50");
        std::env::set_var("TURNSTILE__RATE_LIMITING__BACKEND", "sharded");
        std::env::set_var("TURNSTILE__SERVER__LISTEN_ADDR", "127.0.0.1:9100");

        let result = TurnstileConfig::load(None);

        std::env::remove_var("TURNSTILE__RATE_LIMITING__LIMIT");
        std::env::remove_var("TURNSTILE__RATE_LIMITING__BACKEND");
        std::env::remove_var("TURNSTILE__SERVER__LISTEN_ADDR");

        let config = result.unwrap();
        assert_eq!(config.rate_limiting.limit, 50);
        assert_eq!(config.rate_limiting.backend, Backend::Sharded);
        assert_eq!(config.rate_limiting.period_secs, 10);
        assert_eq!(config.server.listen_addr, "127.0.0.1:9100".parse().unwrap());
    }

    #[test]
    fn test_load_env_overrides_file() {
        let _env = ENV_LOCK.lock();
        let path = write_temp_yaml(
            "env-over-file",
            "rate_limiting:\n  limit: 3\n  period_secs: 30\n  backend: single_lock",
        );
        std::env::set_var("TURNSTILE__RATE_LIMITING__LIMIT", "7");

        let result = TurnstileConfig::load(Some(&path));

        std::env::remove_var("TURNSTILE__RATE_LIMITING__LIMIT");
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        assert_eq!(config.rate_limiting.limit, 7);
        assert_eq!(config.rate_limiting.period_secs, 30);
        assert_eq!(config.rate_limiting.backend, Backend::SingleLock);
    }

    #[test]
    fn test_load_env_value_is_validated() {
        let _env = ENV_LOCK.lock();
        std::env::set_var("TURNSTILE__RATE_LIMITING__PERIOD_SECS", "0");

        let result = TurnstileConfig::load(None);

        std::env::remove_var("TURNSTILE__RATE_LIMITING__PERIOD_SECS");
        assert!(matches!(result, Err(TurnstileError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = Path::new("/nonexistent/turnstile.yaml");
        assert!(TurnstileConfig::load(Some(path)).is_err());
    }
}
