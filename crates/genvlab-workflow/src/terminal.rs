//! Configuration terminal registry
//!
//! Under the shared policy every environment is configured from the single
//! terminal named after the configuration (`genv`). Hosts only return a
//! session when they create the terminal, so once it is open, later
//! configuration scripts are not delivered.
//!
//! The per-binding policy keeps one terminal per environment instead, named
//! `<name>-<n>` (terminal names are too short to carry an eid) and reuses
//! the session on later runs for the same environment.

use genvlab_core::{GenvResult, TerminalConfig, TerminalPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::traits::{HostCommands, TerminalSession};

/// Result of handing lines to a terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The lines reached the named terminal
    Sent { terminal: String },
    /// The host returned no session for the named terminal
    Unavailable { terminal: String },
}

struct BoundTerminal {
    name: String,
    session: Option<Arc<dyn TerminalSession>>,
}

type TerminalsMap = HashMap<String, BoundTerminal>;

/// Registry of configuration terminals
pub struct TerminalRegistry {
    config: TerminalConfig,
    /// Terminals indexed by eid (per-binding policy only)
    terminals: RwLock<TerminalsMap>,
}

impl TerminalRegistry {
    /// Create a registry
    pub fn new(config: TerminalConfig) -> Self {
        Self {
            config,
            terminals: RwLock::new(HashMap::new()),
        }
    }

    /// Allocation policy
    pub fn policy(&self) -> TerminalPolicy {
        self.config.policy
    }

    /// Name of the terminal used for an environment
    pub async fn terminal_name(&self, eid: &str) -> String {
        match self.config.policy {
            TerminalPolicy::Shared => self.config.name.clone(),
            TerminalPolicy::PerBinding => {
                let mut terminals = self.terminals.write().await;
                let next = terminals.len() + 1;
                terminals
                    .entry(eid.to_string())
                    .or_insert_with(|| BoundTerminal {
                        name: format!("{}-{}", self.config.name, next),
                        session: None,
                    })
                    .name
                    .clone()
            }
        }
    }

    /// Send lines to the terminal of an environment
    pub async fn deliver(
        &self,
        host: &dyn HostCommands,
        eid: &str,
        lines: &[String],
    ) -> GenvResult<Delivery> {
        let name = self.terminal_name(eid).await;

        if self.config.policy == TerminalPolicy::PerBinding {
            if let Some(session) = self.cached_session(eid).await {
                match session.send_input(lines).await {
                    Ok(()) => {
                        debug!(eid = %eid, terminal = %name, "Reused configuration terminal");
                        return Ok(Delivery::Sent { terminal: name });
                    }
                    Err(e) => {
                        warn!(eid = %eid, terminal = %name, error = %e, "Dropping stale terminal");
                        self.store_session(eid, None).await;
                    }
                }
            }
        }

        let Some(session) = host.open_terminal(&name).await? else {
            warn!(
                eid = %eid,
                terminal = %name,
                "Terminal already open, configuration commands not sent"
            );
            return Ok(Delivery::Unavailable { terminal: name });
        };

        session.send_input(lines).await?;
        info!(eid = %eid, terminal = %name, "Configuration commands sent");

        if self.config.policy == TerminalPolicy::PerBinding {
            self.store_session(eid, Some(session)).await;
        }

        Ok(Delivery::Sent { terminal: name })
    }

    async fn cached_session(&self, eid: &str) -> Option<Arc<dyn TerminalSession>> {
        let terminals = self.terminals.read().await;
        terminals.get(eid).and_then(|t| t.session.clone())
    }

    async fn store_session(&self, eid: &str, session: Option<Arc<dyn TerminalSession>>) {
        let mut terminals = self.terminals.write().await;
        if let Some(terminal) = terminals.get_mut(eid) {
            terminal.session = session;
        }
    }
}

impl Default for TerminalRegistry {
    fn default() -> Self {
        Self::new(TerminalConfig::default())
    }
}
