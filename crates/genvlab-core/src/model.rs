//! Environment and kernel type definitions

use serde::{Deserialize, Serialize};

/// A GPU-resource reservation identity on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique environment identifier
    pub eid: String,
    /// Optional human-readable name (empty = unnamed)
    #[serde(default)]
    pub name: String,
    /// Owner (empty = none)
    #[serde(default)]
    pub user: String,
}

impl Environment {
    /// Create an unnamed environment
    pub fn new(eid: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            eid: eid.into(),
            name: String::new(),
            user: user.into(),
        }
    }

    /// Set the environment name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether the environment carries a name
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Label shown when the user picks an environment
    pub fn label(&self) -> String {
        if self.is_named() {
            format!("{} ({})", self.name, self.eid)
        } else {
            self.eid.clone()
        }
    }

    /// One-line summary used by listings
    pub fn summary(&self) -> String {
        let mut line = format!("{} {}", self.eid, self.user);
        if self.is_named() {
            line.push(' ');
            line.push_str(&self.name);
        }
        line
    }
}

/// Declared specification of a kernel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    /// Kernel spec name (e.g., "python3-genv")
    pub name: String,
}

impl KernelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A running kernel as reported by the notebook host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelIdentity {
    /// Opaque kernel identifier
    pub id: String,
    /// Declared specification, if the host knows it
    pub spec: Option<KernelSpec>,
}

impl KernelIdentity {
    /// Create a kernel identity
    pub fn new(id: impl Into<String>, spec: Option<KernelSpec>) -> Self {
        Self {
            id: id.into(),
            spec,
        }
    }

    /// Create a kernel identity with a declared spec name
    pub fn with_spec_name(id: impl Into<String>, spec_name: impl Into<String>) -> Self {
        Self::new(id, Some(KernelSpec::new(spec_name)))
    }
}

/// Request body of the activate endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub eid: String,
    pub kernel_id: String,
}
