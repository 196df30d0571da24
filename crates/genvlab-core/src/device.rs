//! GPU device table

use serde::{Deserialize, Serialize};

/// A GPU device slot as reported by the directory service
///
/// Devices carry no index of their own: the position of a device in the
/// table returned by the service is its physical index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Environment holding the device (empty = available)
    #[serde(default)]
    pub eid: String,
}

impl Device {
    /// An unattached device
    pub fn available() -> Self {
        Self::default()
    }

    /// A device held by an environment
    pub fn attached(eid: impl Into<String>) -> Self {
        Self { eid: eid.into() }
    }

    /// Whether no environment holds the device
    pub fn is_available(&self) -> bool {
        self.eid.is_empty()
    }
}

/// Indices of the devices held by an environment
pub fn device_indices(devices: &[Device], eid: &str) -> Vec<usize> {
    if eid.is_empty() {
        return Vec::new();
    }

    devices
        .iter()
        .enumerate()
        .filter(|(_, d)| d.eid == eid)
        .map(|(index, _)| index)
        .collect()
}

/// Indices of the devices no environment holds
pub fn available_indices(devices: &[Device]) -> Vec<usize> {
    devices
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_available())
        .map(|(index, _)| index)
        .collect()
}

/// Value of `CUDA_VISIBLE_DEVICES` for a set of device indices
pub fn cuda_visible_devices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|index| index.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One line per device, in table order
pub fn describe_devices(devices: &[Device]) -> Vec<String> {
    devices
        .iter()
        .enumerate()
        .map(|(index, device)| {
            if device.is_available() {
                format!("GPU {}: available", index)
            } else {
                format!("GPU {}: used by environment {}", index, device.eid)
            }
        })
        .collect()
}
