pub mod chunk;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod provider;
pub mod router;

// Re-export common error type
pub use error::RelayError;
