//! End-to-end binding workflow
//!
//! One call to [`GenvWorkflow::run`] is one user-triggered run: resolve the
//! kernel's environment, then offer to configure it. Runs share nothing but
//! the terminal registry; concurrent runs are not serialized and the
//! directory's last write wins.

use genvlab_client::Directory;
use genvlab_core::GenvResult;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatcher::{ConfigurationDispatcher, ConfigurationOutcome};
use crate::prompts::Prompt;
use crate::resolver::{BindingResolver, Resolution};
use crate::terminal::TerminalRegistry;
use crate::traits::{DialogSurface, HostCommands, KernelHandle};

/// Result of a workflow run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// No kernel was attached; `kernel_switch` is true when the user asked
    /// to select one
    NoKernel { kernel_switch: bool },
    /// The kernel is not a genv kernel
    Ineligible { kernel_switch: bool },
    /// The user closed the environment chooser
    Cancelled,
    /// An environment was resolved and offered for configuration
    Configured {
        resolution: Resolution,
        configuration: ConfigurationOutcome,
    },
}

/// Binding workflow over a directory, a dialog surface and a host
pub struct GenvWorkflow {
    directory: Arc<dyn Directory>,
    dialogs: Arc<dyn DialogSurface>,
    host: Arc<dyn HostCommands>,
    terminals: TerminalRegistry,
}

impl GenvWorkflow {
    pub fn new(
        directory: Arc<dyn Directory>,
        dialogs: Arc<dyn DialogSurface>,
        host: Arc<dyn HostCommands>,
        terminals: TerminalRegistry,
    ) -> Self {
        Self {
            directory,
            dialogs,
            host,
            terminals,
        }
    }

    /// Run the workflow for the notebook's current kernel
    pub async fn run(&self, kernel: Option<&dyn KernelHandle>) -> GenvResult<WorkflowOutcome> {
        let resolver = BindingResolver::new(self.directory.as_ref(), self.dialogs.as_ref());
        let resolution = resolver.resolve(kernel).await?;

        let outcome = match resolution {
            Resolution::NoKernel => WorkflowOutcome::NoKernel {
                kernel_switch: self.offer_kernel_switch(Prompt::no_kernel()).await?,
            },
            Resolution::Ineligible => WorkflowOutcome::Ineligible {
                kernel_switch: self
                    .offer_kernel_switch(Prompt::not_supported_kernel())
                    .await?,
            },
            Resolution::Cancelled => WorkflowOutcome::Cancelled,
            Resolution::Bound { ref eid, .. } | Resolution::Provisional { ref eid } => {
                let eid = eid.clone();
                let dispatcher = ConfigurationDispatcher::new(
                    self.dialogs.as_ref(),
                    self.host.as_ref(),
                    &self.terminals,
                );
                let configuration = dispatcher.dispatch(&eid).await?;
                WorkflowOutcome::Configured {
                    resolution,
                    configuration,
                }
            }
        };

        info!(outcome = ?outcome, "Workflow run finished");
        Ok(outcome)
    }

    async fn offer_kernel_switch(&self, prompt: Prompt) -> GenvResult<bool> {
        if !self.dialogs.confirm(&prompt).await? {
            return Ok(false);
        }
        debug!(title = %prompt.title, "Switching kernel");
        self.host.change_kernel().await?;
        Ok(true)
    }
}
