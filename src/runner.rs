use tokio_util::sync::CancellationToken;

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::grpc::EngineClient;
use crate::worker::task;
use crate::worker::ExecutionProcessor;

/// Worker process that orchestrates all components
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the startup sequence, then process executions.
    ///
    /// 1. Connects to the engine (bounded by the connect timeout)
    /// 2. Opens the execution stream and waits for its readiness acknowledgement
    /// 3. Emits the `started` liveness event
    /// 4. Processes executions one at a time until the loop fails
    ///
    /// The stream is opened before the liveness event so executions the engine
    /// dispatches in reaction to that event are already covered by the subscription.
    ///
    /// # Errors
    ///
    /// Every failure is fatal and returned as is. `Ok(())` only follows `shutdown`
    /// being cancelled while waiting for executions.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut client = EngineClient::connect(&self.config).await?;

        let stream = client.stream_executions().await?;

        client
            .create_event(task::STARTED_EVENT, task::started_event_data())
            .await?;
        tracing::info!(
            instance_hash = %self.config.identity.instance_hash,
            key = task::STARTED_EVENT,
            "Emitted liveness event"
        );

        let mut processor = ExecutionProcessor::new(stream, client);
        tokio::select! {
            err = processor.run() => Err(err),
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, closing execution stream");
                Ok(())
            }
        }
    }
}
