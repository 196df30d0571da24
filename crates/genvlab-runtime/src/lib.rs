//! genvlab-runtime: Kernel-side integration
//!
//! This crate covers what happens outside the notebook UI:
//! - Launch environment for genv kernels (`CUDA_VISIBLE_DEVICES`)
//! - Installation of `-genv` wrapper kernel specs

pub mod kernelspec;
pub mod provisioner;

pub use kernelspec::{jupyter_data_dirs, InstalledSpec, KernelspecInstaller};
pub use provisioner::{LaunchProvisioner, CUDA_VISIBLE_DEVICES};
