use std::time::Duration;

use tonic::transport::Channel;
use tonic::Streaming;

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::grpc::{ack, channel};
use crate::identity::IdentityContext;
use crate::proto::event_service_client::EventServiceClient;
use crate::proto::execution_service_client::ExecutionServiceClient;
use crate::proto::stream_executions_request::Filter;
use crate::proto::{
    CreateEventRequest, Execution, ExecutionStatus, StreamExecutionsRequest, Struct,
    UpdateExecutionRequest,
};
use crate::worker::processor::ExecutionReporter;

/// Engine API as seen by one runner: event and execution services sharing a
/// channel, with the runner's identities attached to every call.
#[derive(Debug, Clone)]
pub struct EngineClient {
    events: EventServiceClient<Channel>,
    executions: ExecutionServiceClient<Channel>,
    identity: IdentityContext,
    handshake_timeout: Duration,
}

impl EngineClient {
    pub fn new(channel: Channel, identity: IdentityContext, handshake_timeout: Duration) -> Self {
        Self {
            events: EventServiceClient::new(channel.clone()),
            executions: ExecutionServiceClient::new(channel),
            identity,
            handshake_timeout,
        }
    }

    /// Connect to the configured engine.
    pub async fn connect(config: &RunnerConfig) -> Result<Self> {
        let channel = channel::connect(&config.connection).await?;
        Ok(Self::new(
            channel,
            config.identity,
            config.handshake_timeout,
        ))
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Subscription filter: in-progress executions addressed to this runner.
    pub fn execution_filter(&self) -> Filter {
        Filter {
            statuses: vec![ExecutionStatus::InProgress as i32],
            executor_hash: self.identity.runner_hash.to_vec(),
        }
    }

    /// Open the execution stream and wait for the engine to acknowledge it.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::Connection`] if the engine rejects the call
    /// - [`RunnerError::Handshake`] if no acknowledged response arrives within
    ///   the handshake timeout, or the response is not marked ready
    pub async fn stream_executions(&mut self) -> Result<Streaming<Execution>> {
        let request = StreamExecutionsRequest {
            filter: Some(self.execution_filter()),
        };

        let response = tokio::time::timeout(
            self.handshake_timeout,
            self.executions.stream_executions(request),
        )
        .await
        .map_err(|_| {
            RunnerError::Handshake(format!(
                "stream not acknowledged within {:?}",
                self.handshake_timeout
            ))
        })?
        .map_err(|status| RunnerError::Connection(format!("StreamExecutions: {}", status)))?;

        ack::wait_for_stream_ready(response.metadata())?;

        tracing::info!(runner_hash = %self.identity.runner_hash, "Execution stream ready");
        Ok(response.into_inner())
    }

    /// Publish an event on behalf of the service instance.
    pub async fn create_event(&mut self, key: &str, data: Struct) -> Result<()> {
        let request = CreateEventRequest {
            instance_hash: self.identity.instance_hash.to_vec(),
            key: key.to_string(),
            data: Some(data),
        };

        self.events
            .create_event(request)
            .await
            .map_err(|status| RunnerError::call("CreateEvent", status))?;

        tracing::debug!(key, instance_hash = %self.identity.instance_hash, "Event created");
        Ok(())
    }

    pub async fn update_execution(&mut self, request: UpdateExecutionRequest) -> Result<()> {
        self.executions
            .update_execution(request)
            .await
            .map_err(|status| RunnerError::call("UpdateExecution", status))?;
        Ok(())
    }
}

#[tonic::async_trait]
impl ExecutionReporter for EngineClient {
    async fn report(&mut self, update: UpdateExecutionRequest) -> Result<()> {
        self.update_execution(update).await
    }
}
