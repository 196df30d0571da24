//! genvlab-api: Environment directory service
//!
//! This crate serves the directory HTTP contract over in-memory state:
//! - Device table and active environments
//! - Kernel bindings with last-write-wins activation
//! - `{message}` error bodies

pub mod registry;
pub mod rest;

pub use registry::Registry;
pub use rest::create_router;
