//! Readiness acknowledgement for server-streaming calls.
//!
//! A streaming call can succeed at the transport level before the engine has
//! activated the subscription behind it. The engine therefore marks the
//! response headers once the subscription is live, and the runner refuses to
//! read from a stream whose headers lack the mark.

use tonic::metadata::{MetadataMap, MetadataValue};

use crate::error::{Result, RunnerError};

pub const STREAM_READY_KEY: &str = "x-stream-ready";
const STREAM_READY_VALUE: &str = "true";

/// Server side: mark response metadata as ready.
pub fn mark_stream_ready(metadata: &mut MetadataMap) {
    metadata.insert(
        STREAM_READY_KEY,
        MetadataValue::from_static(STREAM_READY_VALUE),
    );
}

/// Client side: check that the engine acknowledged the stream.
pub fn wait_for_stream_ready(metadata: &MetadataMap) -> Result<()> {
    match metadata.get(STREAM_READY_KEY).map(|v| v.to_str()) {
        Some(Ok(STREAM_READY_VALUE)) => Ok(()),
        Some(Ok(other)) => Err(RunnerError::Handshake(format!(
            "unexpected readiness value {:?}",
            other
        ))),
        Some(Err(_)) => Err(RunnerError::Handshake(
            "readiness value is not valid ascii".to_string(),
        )),
        None => Err(RunnerError::Handshake(
            "stream was not acknowledged as ready".to_string(),
        )),
    }
}
