//! In-memory directory state

use genvlab_core::{DaemonConfig, Device, Environment};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

type BindingsMap = HashMap<String, String>;

/// Devices, environments and kernel bindings
pub struct Registry {
    /// Device table in physical index order
    devices: RwLock<Vec<Device>>,
    /// Active environments
    environments: RwLock<Vec<Environment>>,
    /// Bindings indexed by kernel id
    bindings: RwLock<BindingsMap>,
}

impl Registry {
    /// Create a registry with `device_count` available devices
    pub fn new(device_count: usize) -> Self {
        Self {
            devices: RwLock::new(vec![Device::available(); device_count]),
            environments: RwLock::new(Vec::new()),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry seeded from daemon configuration
    pub fn from_config(config: &DaemonConfig) -> Self {
        info!(
            devices = config.devices.len(),
            environments = config.environments.len(),
            bindings = config.bindings.len(),
            "Registry seeded"
        );

        Self {
            devices: RwLock::new(config.devices.clone()),
            environments: RwLock::new(config.environments.clone()),
            bindings: RwLock::new(config.bindings.clone().into_iter().collect()),
        }
    }

    /// Current device table
    pub async fn devices(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    /// Active environments
    pub async fn environments(&self) -> Vec<Environment> {
        self.environments.read().await.clone()
    }

    /// Add an environment, replacing one with the same eid
    pub async fn upsert_environment(&self, env: Environment) {
        let mut environments = self.environments.write().await;
        environments.retain(|e| e.eid != env.eid);
        debug!(eid = %env.eid, "Environment registered");
        environments.push(env);
    }

    /// Attach a device to an environment; returns false for unknown indices
    pub async fn attach(&self, index: usize, eid: &str) -> bool {
        let mut devices = self.devices.write().await;
        match devices.get_mut(index) {
            Some(device) => {
                device.eid = eid.to_string();
                debug!(index = index, eid = %eid, "Device attached");
                true
            }
            None => false,
        }
    }

    /// Environment bound to a kernel
    pub async fn find(&self, kernel_id: &str) -> Option<String> {
        self.bindings.read().await.get(kernel_id).cloned()
    }

    /// Bind a kernel to an environment, replacing any previous binding
    pub async fn activate(&self, kernel_id: &str, eid: &str) {
        let previous = self
            .bindings
            .write()
            .await
            .insert(kernel_id.to_string(), eid.to_string());

        info!(
            kernel_id = %kernel_id,
            eid = %eid,
            previous = ?previous,
            "Kernel bound"
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(0)
    }
}
