// Domain layer - UI-side records, mapping tables and the backend call contract
// No dependencies on transports, storage or the async runtime

pub mod backend;
pub mod mapping;
pub mod proxy;
pub mod rule;
pub mod schedule;
pub mod setting;
pub mod shared;
pub mod subscription;

// Re-exports for convenience
pub use backend::{BackendCaller, CallArgs, CallError};
pub use shared::{DomainError, ErrorCode};
