use std::time::Duration;

use crate::error::{Result, RunnerError};
use crate::identity::IdentityContext;

/// Environment variable holding the engine endpoint.
pub const ENV_ENDPOINT: &str = "MESG_ENDPOINT";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Lowest keep-alive interval the engine's enforcement policy accepts.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport settings for the engine channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Engine address, either `host:port` or a full `http://` URI
    pub endpoint: String,
    /// Upper bound on establishing the channel
    pub connect_timeout: Duration,
    /// HTTP/2 and TCP keep-alive interval. Keeps intermediate network
    /// layers (e.g. container bridges) from reclaiming the idle stream.
    pub keep_alive_interval: Duration,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// URI handed to tonic. Bare `host:port` endpoints get an `http://` scheme.
    pub fn uri(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
        }
    }
}

/// Everything the runner needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub connection: ConnectionConfig,
    pub identity: IdentityContext,
    /// Upper bound on waiting for the execution stream to be acknowledged
    pub handshake_timeout: Duration,
}

impl RunnerConfig {
    pub fn new(endpoint: impl Into<String>, identity: IdentityContext) -> Self {
        Self {
            connection: ConnectionConfig::new(endpoint),
            identity,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Build the configuration from a key/value source such as the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_ENDPOINT).unwrap_or_default();
        if endpoint.trim().is_empty() {
            return Err(RunnerError::configuration(
                ENV_ENDPOINT,
                "server address is empty",
            ));
        }
        let identity = IdentityContext::resolve(&lookup)?;
        let config = Self::new(endpoint, identity);
        config.validate()?;
        Ok(config)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connection.connect_timeout = timeout;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.connection.keep_alive_interval = interval;
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.connection.endpoint.trim().is_empty() {
            return Err(RunnerError::configuration(
                ENV_ENDPOINT,
                "server address is empty",
            ));
        }
        if self.connection.connect_timeout.is_zero() {
            return Err(RunnerError::configuration(
                "connect_timeout",
                "must be greater than zero",
            ));
        }
        if self.handshake_timeout.is_zero() {
            return Err(RunnerError::configuration(
                "handshake_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
