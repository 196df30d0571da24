//! genv kernel classification

use crate::model::KernelSpec;

/// Suffix carried by the names of genv-aware kernel specs
pub const GENV_KERNEL_SUFFIX: &str = "-genv";

/// Whether a kernel can be bound to a GPU environment
///
/// Eligible iff the spec is present and its name ends with
/// [`GENV_KERNEL_SUFFIX`]. The match is case-sensitive and the name is not
/// trimmed.
pub fn is_genv_kernel(spec: Option<&KernelSpec>) -> bool {
    spec.is_some_and(|s| s.name.ends_with(GENV_KERNEL_SUFFIX))
}

/// Name of the genv wrapper for a kernel spec
pub fn genv_kernel_name(name: &str) -> String {
    format!("{}{}", name, GENV_KERNEL_SUFFIX)
}
