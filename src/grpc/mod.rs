//! gRPC plumbing between the runner and the engine.
//!
//! - [`channel`]: transport channel with keep-alive tuning
//! - [`ack`]: readiness handshake for the execution stream
//! - [`client`]: [`EngineClient`], the event and execution calls the runner makes

pub mod ack;
pub mod channel;
pub mod client;

pub use client::EngineClient;
