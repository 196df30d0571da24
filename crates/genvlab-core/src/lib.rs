//! genvlab-core: Core types for genvlab
//!
//! This crate provides the fundamental types shared by every genvlab crate:
//! - Environment, device and kernel identities
//! - The genv kernel classifier
//! - Configuration types
//! - Error handling

pub mod config;
pub mod device;
pub mod error;
pub mod kernel;
pub mod model;

pub use config::*;
pub use device::*;
pub use error::*;
pub use kernel::*;
pub use model::*;
