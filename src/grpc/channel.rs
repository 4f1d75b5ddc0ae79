use tonic::transport::{Channel, Endpoint};

use crate::config::{ConnectionConfig, ENV_ENDPOINT};
use crate::error::{Result, RunnerError};

/// Build the tonic endpoint for the engine with keep-alive tuning applied.
pub fn endpoint(config: &ConnectionConfig) -> Result<Endpoint> {
    if config.endpoint.trim().is_empty() {
        return Err(RunnerError::configuration(
            ENV_ENDPOINT,
            "server address is empty",
        ));
    }

    let uri = config.uri();
    let endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| RunnerError::configuration(ENV_ENDPOINT, format!("{}: {}", uri, e)))?;

    Ok(endpoint
        .connect_timeout(config.connect_timeout)
        // Idle streams are dropped by some container networks; ping before that happens
        .http2_keep_alive_interval(config.keep_alive_interval)
        .keep_alive_while_idle(true)
        .tcp_keepalive(Some(config.keep_alive_interval)))
}

/// Establish the channel to the engine, failing once `connect_timeout` elapses.
pub async fn connect(config: &ConnectionConfig) -> Result<Channel> {
    let endpoint = endpoint(config)?;

    let channel = tokio::time::timeout(config.connect_timeout, endpoint.connect())
        .await
        .map_err(|_| {
            RunnerError::Connection(format!(
                "timed out after {:?} connecting to {}",
                config.connect_timeout, config.endpoint
            ))
        })?
        .map_err(|e| {
            RunnerError::Connection(format!("failed to connect to {}: {}", config.endpoint, e))
        })?;

    tracing::info!(endpoint = %config.endpoint, "Connected to engine");
    Ok(channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_endpoint_is_configuration_error() {
        let err = endpoint(&ConnectionConfig::new("")).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Configuration { key: ENV_ENDPOINT, .. }
        ));
    }

    #[test]
    fn invalid_uri_is_configuration_error() {
        let err = endpoint(&ConnectionConfig::new("http://bad host:1")).unwrap_err();
        assert!(matches!(err, RunnerError::Configuration { .. }));
    }

    #[test]
    fn bare_address_is_accepted() {
        let ep = endpoint(&ConnectionConfig::new("127.0.0.1:50052")).unwrap();
        assert_eq!(ep.uri().scheme_str(), Some("http"));
        assert_eq!(ep.uri().host(), Some("127.0.0.1"));
        assert_eq!(ep.uri().port_u16(), Some(50052));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        // Reserve a port, then free it so nothing is listening there
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = ConnectionConfig::new(addr.to_string());
        config.connect_timeout = Duration::from_secs(2);

        let err = connect(&config).await.unwrap_err();
        assert!(matches!(err, RunnerError::Connection(_)));
    }
}
