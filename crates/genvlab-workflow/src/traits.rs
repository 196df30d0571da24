//! Collaborator trait definitions

use async_trait::async_trait;
use genvlab_core::{GenvResult, KernelIdentity, KernelSpec};
use std::sync::Arc;

use crate::prompts::Prompt;

/// A running kernel supplied by the notebook host
#[async_trait]
pub trait KernelHandle: Send + Sync {
    /// Opaque kernel identifier
    fn id(&self) -> &str;

    /// Declared kernel specification
    async fn spec(&self) -> GenvResult<Option<KernelSpec>>;
}

#[async_trait]
impl KernelHandle for KernelIdentity {
    fn id(&self) -> &str {
        &self.id
    }

    async fn spec(&self) -> GenvResult<Option<KernelSpec>> {
        Ok(self.spec.clone())
    }
}

/// Surface that asks the user questions
#[async_trait]
pub trait DialogSurface: Send + Sync {
    /// Ask for confirmation; true when the user accepts
    async fn confirm(&self, prompt: &Prompt) -> GenvResult<bool>;

    /// Ask the user to pick one item; `None` when cancelled
    async fn pick_one(&self, title: &str, items: &[String]) -> GenvResult<Option<String>>;
}

/// An interactive terminal session
#[async_trait]
pub trait TerminalSession: Send + Sync {
    /// Send lines of input to the session
    async fn send_input(&self, lines: &[String]) -> GenvResult<()>;
}

/// Commands offered by the notebook host
#[async_trait]
pub trait HostCommands: Send + Sync {
    /// Open a named terminal
    ///
    /// Returns the session only when the host created it; an already open
    /// terminal of the same name yields `None`.
    async fn open_terminal(&self, name: &str) -> GenvResult<Option<Arc<dyn TerminalSession>>>;

    /// Offer the user to switch the notebook's kernel
    async fn change_kernel(&self) -> GenvResult<()>;
}
