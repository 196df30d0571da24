//! Kernel launch environment
//!
//! A genv kernel only sees the devices attached to its environment. Before
//! the kernel process starts, its environment is resolved through the
//! directory and the matching device indices are exported as
//! `CUDA_VISIBLE_DEVICES`.

use genvlab_client::Directory;
use genvlab_core::{cuda_visible_devices, device_indices, GenvResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Variable restricting the devices a CUDA process can see
pub const CUDA_VISIBLE_DEVICES: &str = "CUDA_VISIBLE_DEVICES";

/// Prepares the process environment of genv kernels
pub struct LaunchProvisioner {
    directory: Arc<dyn Directory>,
}

impl LaunchProvisioner {
    /// Create a provisioner over a directory
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Environment a kernel runs in
    ///
    /// Unbound kernels fall back to their own id, which is the identity a
    /// "create new" environment is given.
    pub async fn resolve_eid(&self, kernel_id: &str) -> GenvResult<String> {
        match self.directory.find_binding(kernel_id).await? {
            Some(eid) if !eid.is_empty() => Ok(eid),
            _ => {
                debug!(kernel_id = %kernel_id, "Kernel is unbound, using its id");
                Ok(kernel_id.to_string())
            }
        }
    }

    /// Device indices visible to a kernel
    pub async fn visible_devices(&self, kernel_id: &str) -> GenvResult<Vec<usize>> {
        let eid = self.resolve_eid(kernel_id).await?;
        let devices = self.directory.list_devices().await?;
        Ok(device_indices(&devices, &eid))
    }

    /// Build the launch environment of a kernel from a base environment
    pub async fn prepare_launch(
        &self,
        kernel_id: &str,
        mut env: HashMap<String, String>,
    ) -> GenvResult<HashMap<String, String>> {
        let indices = self.visible_devices(kernel_id).await?;
        let visible = cuda_visible_devices(&indices);

        info!(
            kernel_id = %kernel_id,
            devices = %visible,
            "Prepared kernel launch environment"
        );

        env.insert(CUDA_VISIBLE_DEVICES.to_string(), visible);
        Ok(env)
    }
}
