pub mod config;
pub mod error;
pub mod grpc;
pub mod hash;
pub mod identity;
pub mod runner;
pub mod shutdown;
pub mod value;
pub mod worker;

// Re-export generated protobuf types
pub mod proto {
    tonic::include_proto!("engine");
}
