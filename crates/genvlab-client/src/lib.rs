//! genvlab-client: Environment directory client
//!
//! This crate provides the typed request/response layer to the GPU
//! environment directory service:
//! - The `Directory` trait consumed by the binding workflow
//! - A reqwest-backed HTTP implementation
//! - Response body classification and validation

pub mod body;
pub mod http;
pub mod traits;

pub use body::Payload;
pub use http::HttpDirectory;
pub use traits::Directory;
