// Infrastructure layer - Technical implementations
// Transports for the backend call contract, local storage and logging

pub mod config;
pub mod logging;
pub mod storage;
pub mod transport;

pub use storage::JsonFileStorage;
pub use transport::{CommandHandler, HttpBackendClient, InProcessBridge};
