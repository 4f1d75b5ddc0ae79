//! The runner's task: validate `foo`/`bar` inputs and answer with a message.

use crate::proto::update_execution_request::Result as UpdateResult;
use crate::proto::{Struct, UpdateExecutionRequest, Value};

/// Key of the liveness event emitted once the execution stream is ready.
pub const STARTED_EVENT: &str = "started";

pub const INVALID_INPUTS: &str = "invalid inputs";
pub const VALID_MESSAGE: &str = "Hello world is valid";

const FOO_FIELD: &str = "foo";
const FOO_EXPECTED: &str = "hello";
const BAR_FIELD: &str = "bar";
const BAR_EXPECTED: &str = "world";

/// Payload of the liveness event.
pub fn started_event_data() -> Struct {
    [("x", Value::from(true))].into_iter().collect()
}

/// Result reported for one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Outputs(Struct),
    Error(String),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// The single update that terminates execution `hash`.
    pub fn into_update(self, hash: Vec<u8>) -> UpdateExecutionRequest {
        let result = match self {
            Outcome::Outputs(outputs) => UpdateResult::Outputs(outputs),
            Outcome::Error(message) => UpdateResult::Error(message),
        };
        UpdateExecutionRequest {
            hash,
            result: Some(result),
        }
    }
}

/// Evaluate execution inputs.
///
/// Each field is compared on its own and the inputs are rejected only when
/// both comparisons fail, so one matching field is enough to succeed.
/// Missing or non-string fields compare as the empty string.
pub fn evaluate(inputs: Option<&Struct>) -> Outcome {
    let field = |name: &str| {
        inputs
            .and_then(|inputs| inputs.get_str(name))
            .unwrap_or_default()
    };

    if field(FOO_FIELD) != FOO_EXPECTED && field(BAR_FIELD) != BAR_EXPECTED {
        return Outcome::Error(INVALID_INPUTS.to_string());
    }

    Outcome::Outputs([("message", Value::from(VALID_MESSAGE))].into_iter().collect())
}
