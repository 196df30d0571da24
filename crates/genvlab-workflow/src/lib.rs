//! genvlab-workflow: Environment binding workflow
//!
//! This crate drives one user-triggered binding run:
//! - Collaborator traits for the kernel, dialogs and notebook host
//! - The binding resolver state machine
//! - The configuration dispatcher and its terminal registry

pub mod choices;
pub mod dispatcher;
pub mod prompts;
pub mod resolver;
pub mod terminal;
pub mod traits;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use choices::{Choice, EnvironmentChoices};
pub use dispatcher::{configuration_script, ConfigurationDispatcher, ConfigurationOutcome};
pub use prompts::{Prompt, CHOOSE_ENVIRONMENT_TITLE, CREATE_NEW_LABEL, INSTALL_COMMAND};
pub use resolver::{BindingOrigin, BindingResolver, Resolution, ResolverRun, ResolverState, Step};
pub use terminal::{Delivery, TerminalRegistry};
pub use traits::{DialogSurface, HostCommands, KernelHandle, TerminalSession};
pub use workflow::{GenvWorkflow, WorkflowOutcome};
