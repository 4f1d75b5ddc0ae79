//! Execution handling on the runner side.
//!
//! - [`processor`]: the receive → validate → report loop over the execution stream
//! - [`task`]: input validation and the outcome reported for each execution
//!
//! # Execution Flow
//!
//! 1. [`ExecutionProcessor`] waits on the stream for the next execution
//! 2. [`task::evaluate`] checks the `foo`/`bar` inputs
//! 3. The resulting [`Outcome`] becomes one `UpdateExecution` call
//! 4. Back to waiting; any failure ends the loop

pub mod processor;
pub mod task;

pub use processor::{ExecutionProcessor, ExecutionReporter, ProcessorState};
pub use task::Outcome;
