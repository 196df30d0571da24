//! Directory trait definitions

use async_trait::async_trait;
use genvlab_core::{Device, Environment, GenvResult};

/// Directory of GPU environments, devices and kernel bindings
#[async_trait]
pub trait Directory: Send + Sync {
    /// Current device table; position in the table is the device index
    async fn list_devices(&self) -> GenvResult<Vec<Device>>;

    /// All active environments, in no particular order
    async fn list_environments(&self) -> GenvResult<Vec<Environment>>;

    /// Environment bound to a kernel, if any
    async fn find_binding(&self, kernel_id: &str) -> GenvResult<Option<String>>;

    /// Bind a kernel to an environment, replacing any previous binding
    async fn activate_binding(&self, kernel_id: &str, eid: &str) -> GenvResult<()>;
}
