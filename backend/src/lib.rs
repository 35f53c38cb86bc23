//! Upload gateway: presigned uploads, a streaming upload proxy and object
//! listings for an S3-compatible store

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Listing adapter
pub mod gallery;

/// Object key derivation
pub mod keys;

/// HTTP middleware
pub mod middleware;

/// Object store client
pub mod object_store;

/// Streaming upload relay
pub mod relay;

/// Route handlers
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Credential signing
pub mod signer;

/// Configuration and error types
pub mod types;
