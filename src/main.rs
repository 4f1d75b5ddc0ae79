use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use service_runner::config::{RunnerConfig, ENV_ENDPOINT};
use service_runner::error::RunnerError;
use service_runner::identity::{ENV_INSTANCE_HASH, ENV_RUNNER_HASH};
use service_runner::runner::Runner;
use service_runner::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "service-runner")]
#[command(version)]
#[command(about = "Consumes engine executions addressed to this runner and reports their outcome")]
struct Args {
    /// Engine address (host:port or http://host:port)
    #[arg(long, env = ENV_ENDPOINT)]
    endpoint: Option<String>,

    /// Hash of the service instance emitting events (base58)
    #[arg(long, env = ENV_INSTANCE_HASH)]
    instance_hash: Option<String>,

    /// Hash of this runner; executions are filtered on it (base58)
    #[arg(long, env = ENV_RUNNER_HASH)]
    runner_hash: Option<String>,

    /// Seconds allowed to establish the engine connection
    #[arg(long, default_value = "10")]
    connect_timeout_secs: u64,

    /// Keep-alive ping interval in seconds
    #[arg(long, default_value = "300")]
    keep_alive_secs: u64,

    /// Seconds allowed for the execution stream to be acknowledged
    #[arg(long, default_value = "10")]
    handshake_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> Result<RunnerConfig, RunnerError> {
        let lookup = |key: &str| match key {
            ENV_ENDPOINT => self.endpoint.clone(),
            ENV_INSTANCE_HASH => self.instance_hash.clone(),
            ENV_RUNNER_HASH => self.runner_hash.clone(),
            _ => None,
        };

        let config = RunnerConfig::from_lookup(lookup)?
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_keep_alive_interval(Duration::from_secs(self.keep_alive_secs))
            .with_handshake_timeout(Duration::from_secs(self.handshake_timeout_secs));
        config.validate()?;
        Ok(config)
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let runner = Runner::new(args.into_config()?);
    let config = runner.config();

    tracing::info!(
        endpoint = %config.connection.endpoint,
        instance_hash = %config.identity.instance_hash,
        runner_hash = %config.identity.runner_hash,
        "Starting service runner"
    );

    let shutdown = install_shutdown_handler()?;
    runner.run(shutdown).await?;

    tracing::info!("Service runner stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}
