use core_config::{ConfigError, FromEnv, env_duration_secs, env_flag, env_parse};
use std::time::Duration;

/// Connections opened per remote search node
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Port search nodes listen on for gRPC when the host string carries none
pub const DEFAULT_GRPC_PORT: u16 = 15000;

pub const DEFAULT_MAX_BACKOFF_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 50 * 1024 * 1024;
pub const DEFAULT_MAX_CONCURRENT_STREAMS: u32 = 5000;

/// Timing, size and concurrency settings applied to every channel in a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDefaults {
    pub max_backoff_delay: Duration,
    pub keep_alive_interval: Duration,
    pub idle_timeout: Duration,
    pub max_recv_message_size: usize,
    pub max_send_message_size: usize,
    pub max_concurrent_streams: u32,
}

impl Default for TransportDefaults {
    fn default() -> Self {
        Self {
            max_backoff_delay: DEFAULT_MAX_BACKOFF_DELAY,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_recv_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_send_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_concurrent_streams: DEFAULT_MAX_CONCURRENT_STREAMS,
        }
    }
}

/// Process-wide settings for the search node connection registry
///
/// # Example
/// ```ignore
/// use search_rpc_client::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::default()
///     .with_pool_size(8)
///     .with_idle_timeout(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Fixed number of channels per pool
    pub pool_size: usize,
    pub default_port: u16,
    /// Open channels on first request instead of at pool creation
    pub connect_lazily: bool,
    pub transport: TransportDefaults,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            default_port: DEFAULT_GRPC_PORT,
            connect_lazily: false,
            transport: TransportDefaults::default(),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of channels per pool. Zero is clamped to one.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    pub fn with_lazy_connect(mut self, lazy: bool) -> Self {
        self.connect_lazily = lazy;
        self
    }

    pub fn with_max_backoff_delay(mut self, delay: Duration) -> Self {
        self.transport.max_backoff_delay = delay;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.transport.keep_alive_interval = interval;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.transport.idle_timeout = timeout;
        self
    }

    /// Set both receive and send message ceilings
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.transport.max_recv_message_size = bytes;
        self.transport.max_send_message_size = bytes;
        self
    }

    /// Cap in-flight requests per channel. Zero is clamped to one.
    pub fn with_max_concurrent_streams(mut self, max: u32) -> Self {
        self.transport.max_concurrent_streams = max.max(1);
        self
    }

    /// Append the default gRPC port to a bare host.
    ///
    /// `"10.0.0.1"` becomes `"10.0.0.1:15000"`, `"[::1]"` becomes
    /// `"[::1]:15000"`; strings that already carry a port are returned as-is.
    pub fn host_port(&self, host: &str) -> String {
        let host = host.trim();
        let has_port = match host.rfind(']') {
            Some(end) => host[end..].contains(':'),
            None => host.matches(':').count() == 1,
        };

        if has_port {
            host.to_string()
        } else if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.default_port)
        } else {
            format!("{}:{}", host, self.default_port)
        }
    }
}

impl FromEnv for PoolConfig {
    /// Every variable is optional; unset variables keep the defaults.
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = TransportDefaults::default();

        let pool_size = env_parse("SEARCH_RPC_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(at_least_one("SEARCH_RPC_POOL_SIZE"));
        }

        // A zero concurrency limit never admits the connect request
        let max_concurrent_streams = env_parse(
            "SEARCH_RPC_MAX_CONCURRENT_STREAMS",
            defaults.max_concurrent_streams,
        )?;
        if max_concurrent_streams == 0 {
            return Err(at_least_one("SEARCH_RPC_MAX_CONCURRENT_STREAMS"));
        }

        Ok(Self {
            pool_size,
            default_port: env_parse("SEARCH_RPC_PORT", DEFAULT_GRPC_PORT)?,
            connect_lazily: env_flag("SEARCH_RPC_CONNECT_LAZILY", false)?,
            transport: TransportDefaults {
                max_backoff_delay: env_duration_secs(
                    "SEARCH_RPC_MAX_BACKOFF_SECS",
                    defaults.max_backoff_delay,
                )?,
                keep_alive_interval: env_duration_secs(
                    "SEARCH_RPC_KEEPALIVE_SECS",
                    defaults.keep_alive_interval,
                )?,
                idle_timeout: env_duration_secs(
                    "SEARCH_RPC_IDLE_TIMEOUT_SECS",
                    defaults.idle_timeout,
                )?,
                max_recv_message_size: env_parse(
                    "SEARCH_RPC_MAX_RECV_BYTES",
                    defaults.max_recv_message_size,
                )?,
                max_send_message_size: env_parse(
                    "SEARCH_RPC_MAX_SEND_BYTES",
                    defaults.max_send_message_size,
                )?,
                max_concurrent_streams,
            },
        })
    }
}

fn at_least_one(key: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: "must be at least 1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 9] = [
        "SEARCH_RPC_POOL_SIZE",
        "SEARCH_RPC_PORT",
        "SEARCH_RPC_CONNECT_LAZILY",
        "SEARCH_RPC_MAX_BACKOFF_SECS",
        "SEARCH_RPC_KEEPALIVE_SECS",
        "SEARCH_RPC_IDLE_TIMEOUT_SECS",
        "SEARCH_RPC_MAX_RECV_BYTES",
        "SEARCH_RPC_MAX_SEND_BYTES",
        "SEARCH_RPC_MAX_CONCURRENT_STREAMS",
    ];

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.default_port, 15000);
        assert!(!config.connect_lazily);
        assert_eq!(config.transport.max_backoff_delay, Duration::from_secs(10));
        assert_eq!(config.transport.keep_alive_interval, Duration::from_secs(60));
        assert_eq!(config.transport.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.transport.max_recv_message_size, 52_428_800);
        assert_eq!(config.transport.max_send_message_size, 52_428_800);
        assert_eq!(config.transport.max_concurrent_streams, 5000);
    }

    #[test]
    fn test_from_env_without_vars_matches_default() {
        temp_env::with_vars_unset(ALL_VARS, || {
            assert_eq!(PoolConfig::from_env().unwrap(), PoolConfig::default());
        });
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("SEARCH_RPC_POOL_SIZE", Some("3")),
                ("SEARCH_RPC_PORT", Some("9130")),
                ("SEARCH_RPC_CONNECT_LAZILY", Some("true")),
                ("SEARCH_RPC_IDLE_TIMEOUT_SECS", Some("90")),
                ("SEARCH_RPC_MAX_CONCURRENT_STREAMS", Some("100")),
            ],
            || {
                let config = PoolConfig::from_env().unwrap();
                assert_eq!(config.pool_size, 3);
                assert_eq!(config.default_port, 9130);
                assert!(config.connect_lazily);
                assert_eq!(config.transport.idle_timeout, Duration::from_secs(90));
                assert_eq!(config.transport.max_concurrent_streams, 100);
                assert_eq!(config.transport.keep_alive_interval, Duration::from_secs(60));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_zero_pool_size() {
        temp_env::with_var("SEARCH_RPC_POOL_SIZE", Some("0"), || {
            let err = PoolConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }));
        });
    }

    #[test]
    fn test_from_env_rejects_zero_concurrent_streams() {
        temp_env::with_var("SEARCH_RPC_MAX_CONCURRENT_STREAMS", Some("0"), || {
            let err = PoolConfig::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { ref key, .. } if key == "SEARCH_RPC_MAX_CONCURRENT_STREAMS"
            ));
        });
    }

    #[test]
    fn test_zero_concurrent_streams_is_clamped() {
        let config = PoolConfig::new().with_max_concurrent_streams(0);
        assert_eq!(config.transport.max_concurrent_streams, 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PoolConfig::new()
            .with_pool_size(0)
            .with_max_message_size(1024)
            .with_max_backoff_delay(Duration::from_secs(2));
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.transport.max_recv_message_size, 1024);
        assert_eq!(config.transport.max_send_message_size, 1024);
        assert_eq!(config.transport.max_backoff_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_host_port() {
        let config = PoolConfig::default();
        assert_eq!(config.host_port("10.0.0.1"), "10.0.0.1:15000");
        assert_eq!(config.host_port("10.0.0.1:9000"), "10.0.0.1:9000");
        assert_eq!(config.host_port("search-a.local"), "search-a.local:15000");
        assert_eq!(config.host_port("[::1]"), "[::1]:15000");
        assert_eq!(config.host_port("[::1]:9000"), "[::1]:9000");
        assert_eq!(config.host_port("::1"), "[::1]:15000");
    }
}
