//! Environment chooser entries
//!
//! The chooser shows labels; a selection is mapped back to an environment
//! through the lookup table built alongside the labels, never by reading
//! the label text. An unnamed environment is labelled with its bare eid, so
//! a label can look like any eid.

use genvlab_core::Environment;
use std::collections::HashMap;

use crate::prompts::CREATE_NEW_LABEL;

/// What a chooser entry stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Start a fresh environment for the kernel
    CreateNew,
    /// An existing environment
    Existing(String),
}

/// Labels offered to the user and the choice behind each one
#[derive(Debug, Clone)]
pub struct EnvironmentChoices {
    labels: Vec<String>,
    lookup: HashMap<String, Choice>,
}

impl EnvironmentChoices {
    /// Build the entries: "create new" first, then one per environment
    ///
    /// Colliding labels get a ` [n]` suffix so every label stays unique.
    pub fn new(environments: &[Environment]) -> Self {
        let mut choices = Self {
            labels: Vec::with_capacity(environments.len() + 1),
            lookup: HashMap::with_capacity(environments.len() + 1),
        };

        choices.push(CREATE_NEW_LABEL.to_string(), Choice::CreateNew);
        for env in environments {
            choices.push(env.label(), Choice::Existing(env.eid.clone()));
        }

        choices
    }

    fn push(&mut self, label: String, choice: Choice) {
        let mut unique = label.clone();
        let mut n = 2;
        while self.lookup.contains_key(&unique) {
            unique = format!("{} [{}]", label, n);
            n += 1;
        }

        self.labels.push(unique.clone());
        self.lookup.insert(unique, choice);
    }

    /// Labels in display order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Choice behind a label
    pub fn resolve(&self, label: &str) -> Option<&Choice> {
        self.lookup.get(label)
    }
}
