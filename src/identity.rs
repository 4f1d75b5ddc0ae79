use crate::error::{Result, RunnerError};
use crate::hash::Hash;

/// Environment variable holding the instance hash.
pub const ENV_INSTANCE_HASH: &str = "MESG_INSTANCE_HASH";
/// Environment variable holding the runner hash.
pub const ENV_RUNNER_HASH: &str = "MESG_RUNNER_HASH";

/// Identities attached to outbound calls.
///
/// - `instance_hash` names the service instance that emits events
/// - `runner_hash` names this worker; executions are filtered on it
///
/// Both are opaque to the runner and never checked against the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityContext {
    pub instance_hash: Hash,
    pub runner_hash: Hash,
}

impl IdentityContext {
    pub fn new(instance_hash: Hash, runner_hash: Hash) -> Self {
        Self {
            instance_hash,
            runner_hash,
        }
    }

    /// Resolve both identities through `lookup`, which maps a variable name to its value.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let instance_hash = decode_key(ENV_INSTANCE_HASH, lookup(ENV_INSTANCE_HASH))?;
        let runner_hash = decode_key(ENV_RUNNER_HASH, lookup(ENV_RUNNER_HASH))?;
        Ok(Self::new(instance_hash, runner_hash))
    }
}

/// Decode a hash read from `key`, naming the key in any error.
pub fn decode_key(key: &'static str, value: Option<String>) -> Result<Hash> {
    let value = value.ok_or_else(|| RunnerError::configuration(key, "not set"))?;
    Hash::decode(&value).map_err(|e| RunnerError::configuration(key, e.to_string()))
}
