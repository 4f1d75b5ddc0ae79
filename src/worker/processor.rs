use std::fmt;

use tokio_stream::{Stream, StreamExt};
use tonic::Status;

use crate::error::{Result, RunnerError};
use crate::hash;
use crate::proto::{Execution, UpdateExecutionRequest};
use crate::worker::task::{self, Outcome};

/// Destination of execution updates.
#[tonic::async_trait]
pub trait ExecutionReporter {
    async fn report(&mut self, update: UpdateExecutionRequest) -> Result<()>;
}

/// States of the execution loop.
///
/// `WaitingForExecution → Validating → Reporting → WaitingForExecution`, with
/// `Failed` reachable from any state and terminal.
#[derive(Debug)]
pub enum ProcessorState {
    WaitingForExecution,
    Validating(Execution),
    Reporting(UpdateExecutionRequest),
    Failed,
}

impl ProcessorState {
    pub fn is_failed(&self) -> bool {
        matches!(self, ProcessorState::Failed)
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorState::WaitingForExecution => write!(f, "waiting_for_execution"),
            ProcessorState::Validating(_) => write!(f, "validating"),
            ProcessorState::Reporting(_) => write!(f, "reporting"),
            ProcessorState::Failed => write!(f, "failed"),
        }
    }
}

/// Pulls executions one at a time from `stream` and reports exactly one
/// update per execution through `reporter`.
///
/// There is no retry anywhere: a receive error, the end of the stream, or a
/// rejected update moves the loop to [`ProcessorState::Failed`] and
/// [`run`](Self::run) returns that error. Restarting is left to whatever
/// supervises the process.
pub struct ExecutionProcessor<S, R> {
    stream: S,
    reporter: R,
    state: ProcessorState,
    processed: u64,
}

impl<S, R> ExecutionProcessor<S, R>
where
    S: Stream<Item = std::result::Result<Execution, Status>> + Unpin,
    R: ExecutionReporter,
{
    pub fn new(stream: S, reporter: R) -> Self {
        Self {
            stream,
            reporter,
            state: ProcessorState::WaitingForExecution,
            processed: 0,
        }
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    /// Number of executions reported so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Run until the loop fails, returning the error that stopped it.
    pub async fn run(&mut self) -> RunnerError {
        loop {
            if let Err(err) = self.step().await {
                tracing::error!(processed = self.processed, error = %err, "Execution loop stopped");
                return err;
            }
        }
    }

    /// Perform one state transition.
    ///
    /// On error the processor is left in [`ProcessorState::Failed`], from
    /// which every further step fails.
    pub async fn step(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, ProcessorState::Failed);
        let next = match state {
            ProcessorState::WaitingForExecution => self.receive().await,
            ProcessorState::Validating(execution) => Ok(Self::validate(execution)),
            ProcessorState::Reporting(update) => self.report(update).await,
            ProcessorState::Failed => Err(RunnerError::Stream(
                "execution loop already failed".to_string(),
            )),
        };
        self.state = next?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<ProcessorState> {
        match self.stream.next().await {
            Some(Ok(execution)) => {
                tracing::info!(
                    hash = %hash::encode(&execution.hash),
                    task_key = %execution.task_key,
                    "Received execution"
                );
                Ok(ProcessorState::Validating(execution))
            }
            Some(Err(status)) => Err(RunnerError::Stream(format!("receive failed: {}", status))),
            None => Err(RunnerError::Stream("stream closed by server".to_string())),
        }
    }

    fn validate(execution: Execution) -> ProcessorState {
        let outcome = task::evaluate(execution.inputs.as_ref());
        match &outcome {
            Outcome::Outputs(outputs) => tracing::debug!(
                hash = %hash::encode(&execution.hash),
                outputs = %outputs.to_json(),
                "Execution inputs accepted"
            ),
            Outcome::Error(message) => tracing::debug!(
                hash = %hash::encode(&execution.hash),
                error = %message,
                "Execution inputs rejected"
            ),
        }
        ProcessorState::Reporting(outcome.into_update(execution.hash))
    }

    async fn report(&mut self, update: UpdateExecutionRequest) -> Result<ProcessorState> {
        let hash = hash::encode(&update.hash);
        self.reporter.report(update).await?;
        self.processed += 1;
        tracing::info!(hash = %hash, "Execution updated");
        Ok(ProcessorState::WaitingForExecution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::update_execution_request::Result as UpdateResult;
    use crate::proto::{ExecutionStatus, Struct, Value};

    /// Reporter that records every update and can be told to reject one.
    #[derive(Default)]
    struct RecordingReporter {
        updates: Vec<UpdateExecutionRequest>,
        reject_at: Option<usize>,
    }

    #[tonic::async_trait]
    impl ExecutionReporter for RecordingReporter {
        async fn report(&mut self, update: UpdateExecutionRequest) -> Result<()> {
            if self.reject_at == Some(self.updates.len()) {
                return Err(RunnerError::call(
                    "UpdateExecution",
                    Status::failed_precondition("execution already finished"),
                ));
            }
            self.updates.push(update);
            Ok(())
        }
    }

    fn execution(id: u8, foo: &str, bar: &str) -> Execution {
        let inputs: Struct = [("foo", Value::from(foo)), ("bar", Value::from(bar))]
            .into_iter()
            .collect();
        Execution {
            hash: vec![id; 32],
            task_key: "taskX".to_string(),
            status: ExecutionStatus::InProgress as i32,
            inputs: Some(inputs),
            ..Default::default()
        }
    }

    type Item = std::result::Result<Execution, Status>;
    type TestStream = tokio_stream::Iter<std::vec::IntoIter<Item>>;

    fn processor(
        items: Vec<Item>,
        reporter: RecordingReporter,
    ) -> ExecutionProcessor<TestStream, RecordingReporter> {
        ExecutionProcessor::new(tokio_stream::iter(items), reporter)
    }

    #[tokio::test]
    async fn steps_through_states_in_order() {
        let mut p = processor(
            vec![Ok(execution(1, "hello", "world"))],
            RecordingReporter::default(),
        );

        assert!(matches!(p.state(), ProcessorState::WaitingForExecution));
        p.step().await.unwrap();
        assert!(matches!(p.state(), ProcessorState::Validating(_)));
        assert!(p.reporter().updates.is_empty());
        p.step().await.unwrap();
        assert!(matches!(p.state(), ProcessorState::Reporting(_)));
        assert!(p.reporter().updates.is_empty());
        p.step().await.unwrap();
        assert!(matches!(p.state(), ProcessorState::WaitingForExecution));
        assert_eq!(p.reporter().updates.len(), 1);
        assert_eq!(p.processed(), 1);
    }

    #[tokio::test]
    async fn one_update_per_execution_then_fails_on_close() {
        let mut p = processor(
            vec![
                Ok(execution(1, "hello", "world")),
                Ok(execution(2, "nope", "nope")),
                Ok(execution(3, "hello", "moon")),
            ],
            RecordingReporter::default(),
        );

        let err = p.run().await;
        assert!(matches!(err, RunnerError::Stream(_)));

        let updates = &p.reporter().updates;
        let hashes: Vec<_> = updates.iter().map(|u| u.hash[0]).collect();
        assert_eq!(hashes, vec![1, 2, 3]);

        assert!(matches!(updates[0].result, Some(UpdateResult::Outputs(_))));
        assert_eq!(
            updates[1].result,
            Some(UpdateResult::Error("invalid inputs".to_string()))
        );
        assert!(matches!(updates[2].result, Some(UpdateResult::Outputs(_))));
        assert_eq!(p.processed(), 3);
    }

    #[tokio::test]
    async fn receive_error_after_n_executions_stops_without_extra_update() {
        let mut p = processor(
            vec![
                Ok(execution(1, "hello", "world")),
                Ok(execution(2, "hello", "world")),
                Err(Status::unavailable("engine going away")),
                Ok(execution(3, "hello", "world")),
            ],
            RecordingReporter::default(),
        );

        let err = p.run().await;
        assert!(matches!(err, RunnerError::Stream(ref msg) if msg.contains("engine going away")));
        assert_eq!(p.reporter().updates.len(), 2);
        assert_eq!(p.processed(), 2);
    }

    #[tokio::test]
    async fn rejected_update_is_fatal() {
        let reporter = RecordingReporter {
            reject_at: Some(1),
            ..Default::default()
        };
        let mut p = processor(
            vec![
                Ok(execution(1, "hello", "world")),
                Ok(execution(2, "hello", "world")),
                Ok(execution(3, "hello", "world")),
            ],
            reporter,
        );

        let err = p.run().await;
        assert!(matches!(err, RunnerError::Call { call: "UpdateExecution", .. }));
        assert_eq!(p.reporter().updates.len(), 1);
        assert_eq!(p.processed(), 1);
    }

    #[tokio::test]
    async fn failed_state_is_terminal() {
        let mut p = processor(vec![], RecordingReporter::default());
        let err = p.step().await.unwrap_err();
        assert_eq!(err.to_string(), "Execution stream error: stream closed by server");
        assert!(p.state().is_failed());
        assert!(p.step().await.is_err());
        assert!(p.state().is_failed());
        assert_eq!(p.state().to_string(), "failed");
    }

    #[tokio::test]
    async fn execution_without_inputs_is_reported_invalid() {
        let bare = Execution {
            hash: vec![4; 32],
            ..Default::default()
        };
        let mut p = processor(vec![Ok(bare)], RecordingReporter::default());

        let _ = p.run().await;
        let updates = &p.reporter().updates;
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].result,
            Some(UpdateResult::Error("invalid inputs".to_string()))
        );
    }
}
