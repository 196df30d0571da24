//! Configuration dispatcher
//!
//! Hands a resolved environment to an interactive terminal. The dispatcher
//! only builds the script and sends it; it never runs shell commands and
//! never waits for them.

use genvlab_core::GenvResult;
use tracing::debug;

use crate::prompts::Prompt;
use crate::terminal::{Delivery, TerminalRegistry};
use crate::traits::{DialogSurface, HostCommands};

const GUIDANCE: &[&str] = &[
    "# this is a terminal for configuring your genv environment.",
    "# it will be activated in your environment.",
    "# you can configure your environment and attach devices from here.",
    "# ",
    "# you can start with running the following command:",
    "# ",
    "#     genv attach --help",
    "# ",
    "# for more information check out the reference at https://github.com/run-ai/genv",
    "# ",
    "# IMPORTANT: you will need to restart your Jupyter kernel after configuring the environment from the terminal.",
    "",
];

/// Lines that activate an environment in a fresh shell
pub fn configuration_script(eid: &str) -> Vec<String> {
    GUIDANCE
        .iter()
        .map(|line| line.to_string())
        .chain([
            "eval \"$(genv init -)\"".to_string(),
            format!("genv activate --id {}", eid),
        ])
        .collect()
}

/// Result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationOutcome {
    /// The user chose not to open a terminal
    Declined,
    /// The script was sent to the terminal
    Dispatched { terminal: String },
    /// The host did not hand out the terminal; nothing was sent
    TerminalUnavailable { terminal: String },
}

/// Configuration dispatcher
pub struct ConfigurationDispatcher<'a> {
    dialogs: &'a dyn DialogSurface,
    host: &'a dyn HostCommands,
    terminals: &'a TerminalRegistry,
}

impl<'a> ConfigurationDispatcher<'a> {
    pub fn new(
        dialogs: &'a dyn DialogSurface,
        host: &'a dyn HostCommands,
        terminals: &'a TerminalRegistry,
    ) -> Self {
        Self {
            dialogs,
            host,
            terminals,
        }
    }

    /// Offer to configure an environment and send the script on acceptance
    pub async fn dispatch(&self, eid: &str) -> GenvResult<ConfigurationOutcome> {
        if !self.dialogs.confirm(&Prompt::configure(eid)).await? {
            debug!(eid = %eid, "Configuration declined");
            return Ok(ConfigurationOutcome::Declined);
        }

        let script = configuration_script(eid);
        let outcome = match self.terminals.deliver(self.host, eid, &script).await? {
            Delivery::Sent { terminal } => ConfigurationOutcome::Dispatched { terminal },
            Delivery::Unavailable { terminal } => {
                ConfigurationOutcome::TerminalUnavailable { terminal }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, ScriptedDialogs};

    #[test]
    fn test_script_ends_with_activation() {
        let script = configuration_script("env-7");
        let n = script.len();
        assert_eq!(script[n - 2], "eval \"$(genv init -)\"");
        assert_eq!(script[n - 1], "genv activate --id env-7");
        assert_eq!(script[n - 3], "");
        assert!(script[..n - 3].iter().all(|l| l.starts_with('#')));
    }

    #[test]
    fn test_script_is_deterministic() {
        assert_eq!(configuration_script("a"), configuration_script("a"));
    }

    #[tokio::test]
    async fn test_declined() {
        let dialogs = ScriptedDialogs::new().confirming(&[false]);
        let host = FakeHost::new();
        let terminals = TerminalRegistry::default();
        let dispatcher = ConfigurationDispatcher::new(&dialogs, &host, &terminals);

        let outcome = dispatcher.dispatch("env-7").await.unwrap();

        assert_eq!(outcome, ConfigurationOutcome::Declined);
        assert!(host.opened.lock().unwrap().is_empty());
        assert_eq!(dialogs.prompt_titles(), vec!["Configure GPU Environment"]);
    }

    #[tokio::test]
    async fn test_accepted_sends_script() {
        let dialogs = ScriptedDialogs::new().confirming(&[true]);
        let host = FakeHost::new();
        let terminals = TerminalRegistry::default();
        let dispatcher = ConfigurationDispatcher::new(&dialogs, &host, &terminals);

        let outcome = dispatcher.dispatch("env-7").await.unwrap();

        assert_eq!(
            outcome,
            ConfigurationOutcome::Dispatched {
                terminal: "genv".to_string()
            }
        );
        assert_eq!(
            host.sent(),
            vec![("genv".to_string(), configuration_script("env-7"))]
        );
    }

    #[tokio::test]
    async fn test_shared_terminal_already_open() {
        let dialogs = ScriptedDialogs::new().confirming(&[true, true]);
        let host = FakeHost::new();
        let terminals = TerminalRegistry::default();
        let dispatcher = ConfigurationDispatcher::new(&dialogs, &host, &terminals);

        dispatcher.dispatch("env-1").await.unwrap();
        let outcome = dispatcher.dispatch("env-2").await.unwrap();

        assert_eq!(
            outcome,
            ConfigurationOutcome::TerminalUnavailable {
                terminal: "genv".to_string()
            }
        );
        assert_eq!(host.sent().len(), 1);
    }
}
