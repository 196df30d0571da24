//! Recording fakes for the workflow collaborators

use async_trait::async_trait;
use genvlab_client::Directory;
use genvlab_core::{Device, Environment, GenvError, GenvResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::prompts::Prompt;
use crate::traits::{DialogSurface, HostCommands, TerminalSession};

/// A directory call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListEnvironments,
    FindBinding(String),
    ActivateBinding(String, String),
}

/// In-memory directory recording the calls the workflow makes
#[derive(Default)]
pub struct FakeDirectory {
    pub environments: Vec<Environment>,
    pub bindings: Mutex<HashMap<String, String>>,
    /// Status and message returned by activate
    pub activate_error: Option<(u16, String)>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environments(mut self, environments: Vec<Environment>) -> Self {
        self.environments = environments;
        self
    }

    pub fn with_binding(self, kernel_id: &str, eid: &str) -> Self {
        self.bindings
            .lock()
            .unwrap()
            .insert(kernel_id.to_string(), eid.to_string());
        self
    }

    pub fn failing_activate(mut self, status: u16, message: &str) -> Self {
        self.activate_error = Some((status, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn list_devices(&self) -> GenvResult<Vec<Device>> {
        Ok(Vec::new())
    }

    async fn list_environments(&self) -> GenvResult<Vec<Environment>> {
        self.record(Call::ListEnvironments);
        Ok(self.environments.clone())
    }

    async fn find_binding(&self, kernel_id: &str) -> GenvResult<Option<String>> {
        self.record(Call::FindBinding(kernel_id.to_string()));
        Ok(self.bindings.lock().unwrap().get(kernel_id).cloned())
    }

    async fn activate_binding(&self, kernel_id: &str, eid: &str) -> GenvResult<()> {
        self.record(Call::ActivateBinding(kernel_id.to_string(), eid.to_string()));
        if let Some((status, message)) = &self.activate_error {
            return Err(GenvError::Response {
                status: *status,
                message: message.clone(),
            });
        }
        self.bindings
            .lock()
            .unwrap()
            .insert(kernel_id.to_string(), eid.to_string());
        Ok(())
    }
}

type PickRule = Box<dyn Fn(&[String]) -> Option<String> + Send + Sync>;

/// Dialog surface answering from a script
pub struct ScriptedDialogs {
    /// Answers to successive confirmations; exhausted = decline
    confirms: Mutex<VecDeque<bool>>,
    pick: PickRule,
    pub prompts: Mutex<Vec<Prompt>>,
    pub offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self {
            confirms: Mutex::new(VecDeque::new()),
            pick: Box::new(|_| None),
            prompts: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        }
    }

    pub fn confirming(self, answers: &[bool]) -> Self {
        self.confirms.lock().unwrap().extend(answers.iter().copied());
        self
    }

    /// Pick the item with this exact label
    pub fn picking(mut self, label: &str) -> Self {
        let label = label.to_string();
        self.pick = Box::new(move |items| items.iter().find(|i| **i == label).cloned());
        self
    }

    /// Pick an item by position
    pub fn picking_index(mut self, index: usize) -> Self {
        self.pick = Box::new(move |items| items.get(index).cloned());
        self
    }

    pub fn prompt_titles(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }
}

#[async_trait]
impl DialogSurface for ScriptedDialogs {
    async fn confirm(&self, prompt: &Prompt) -> GenvResult<bool> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.confirms.lock().unwrap().pop_front().unwrap_or(false))
    }

    async fn pick_one(&self, _title: &str, items: &[String]) -> GenvResult<Option<String>> {
        self.offered.lock().unwrap().push(items.to_vec());
        Ok((self.pick)(items))
    }
}

pub type SentInput = Arc<Mutex<Vec<(String, Vec<String>)>>>;

/// Terminal session recording its input
pub struct RecordingSession {
    name: String,
    sent: SentInput,
    closed: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl TerminalSession for RecordingSession {
    async fn send_input(&self, lines: &[String]) -> GenvResult<()> {
        if self.closed.lock().unwrap().contains(&self.name) {
            return Err(GenvError::Terminal(format!("{} is closed", self.name)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((self.name.clone(), lines.to_vec()));
        Ok(())
    }
}

/// Notebook host that, like a real one, only hands out a terminal the
/// first time a name is opened
#[derive(Default)]
pub struct FakeHost {
    open: Mutex<HashSet<String>>,
    pub opened: Mutex<Vec<String>>,
    pub sent: SentInput,
    closed: Arc<Mutex<HashSet<String>>>,
    pub kernel_changes: Mutex<usize>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user closing a terminal
    pub fn close(&self, name: &str) {
        self.open.lock().unwrap().remove(name);
        self.closed.lock().unwrap().insert(name.to_string());
    }

    pub fn sent(&self) -> Vec<(String, Vec<String>)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kernel_changes(&self) -> usize {
        *self.kernel_changes.lock().unwrap()
    }
}

#[async_trait]
impl HostCommands for FakeHost {
    async fn open_terminal(&self, name: &str) -> GenvResult<Option<Arc<dyn TerminalSession>>> {
        self.opened.lock().unwrap().push(name.to_string());
        if !self.open.lock().unwrap().insert(name.to_string()) {
            return Ok(None);
        }
        self.closed.lock().unwrap().remove(name);

        Ok(Some(Arc::new(RecordingSession {
            name: name.to_string(),
            sent: Arc::clone(&self.sent),
            closed: Arc::clone(&self.closed),
        })))
    }

    async fn change_kernel(&self) -> GenvResult<()> {
        *self.kernel_changes.lock().unwrap() += 1;
        Ok(())
    }
}
