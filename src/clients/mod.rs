//! Outbound service clients
//!
//! One long-lived client per remote collaborator, created at startup and
//! injected into handlers. Both wrap a shared pooled `reqwest::Client`
//! and are safe for concurrent reuse.

pub mod detection;
pub mod sigv4;
pub mod storage;

pub use detection::DetectionClient;
pub use storage::StorageClient;
