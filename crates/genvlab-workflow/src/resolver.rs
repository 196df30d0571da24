//! Binding resolver
//!
//! Resolves the environment of one kernel, one user-triggered run at a time:
//!
//! ```text
//! NoKernel                                              (final)
//! Classify ─┬─> Ineligible                              (final)
//!           └─> ResolveBinding ─┬─> HasBinding ──────────┐
//!                               └─> ChooseEnvironment ──┴─> Bound (final)
//! ```
//!
//! `ChooseEnvironment` can also end the run with a provisional identity
//! ("create new") or with no binding at all (chooser cancelled). Bindings
//! are never cached: every run asks the directory again, and the only
//! directory write happens after the user picks an existing environment.

use genvlab_client::Directory;
use genvlab_core::{is_genv_kernel, GenvError, GenvResult};
use tracing::{debug, info};

use crate::choices::{Choice, EnvironmentChoices};
use crate::prompts::CHOOSE_ENVIRONMENT_TITLE;
use crate::traits::{DialogSurface, KernelHandle};

/// Resolver states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    /// No kernel is attached
    NoKernel,
    /// Deciding whether the kernel is a genv kernel
    Classify,
    /// The kernel cannot be bound
    Ineligible,
    /// Asking the directory for an existing binding
    ResolveBinding,
    /// The directory already holds a binding
    HasBinding(String),
    /// Asking the user to pick or create an environment
    ChooseEnvironment,
    /// The kernel is bound
    Bound { eid: String, origin: BindingOrigin },
}

/// How a kernel came to be bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    /// The directory already held the binding
    Existing,
    /// The user picked an environment during this run
    Activated,
}

/// Final result of a resolver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No kernel is attached
    NoKernel,
    /// The kernel is not a genv kernel
    Ineligible,
    /// The kernel is bound to an environment
    Bound { eid: String, origin: BindingOrigin },
    /// The user asked for a new environment; the kernel id stands in for
    /// its identity until it is created from the terminal
    Provisional { eid: String },
    /// The user closed the chooser
    Cancelled,
}

impl Resolution {
    /// Environment to configure, if the run produced one
    pub fn eid(&self) -> Option<&str> {
        match self {
            Resolution::Bound { eid, .. } | Resolution::Provisional { eid } => Some(eid),
            _ => None,
        }
    }
}

/// Outcome of a single state step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next(ResolverState),
    Done(Resolution),
}

/// Visited states and final resolution of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverRun {
    pub path: Vec<ResolverState>,
    pub resolution: Resolution,
}

/// Binding resolver for one run
pub struct BindingResolver<'a> {
    directory: &'a dyn Directory,
    dialogs: &'a dyn DialogSurface,
}

impl<'a> BindingResolver<'a> {
    /// Create a resolver over a directory and a dialog surface
    pub fn new(directory: &'a dyn Directory, dialogs: &'a dyn DialogSurface) -> Self {
        Self { directory, dialogs }
    }

    /// Resolve the environment of a kernel
    pub async fn resolve(&self, kernel: Option<&dyn KernelHandle>) -> GenvResult<Resolution> {
        Ok(self.run(kernel).await?.resolution)
    }

    /// Resolve the environment of a kernel, keeping the visited states
    pub async fn run(&self, kernel: Option<&dyn KernelHandle>) -> GenvResult<ResolverRun> {
        let mut state = match kernel {
            Some(_) => ResolverState::Classify,
            None => ResolverState::NoKernel,
        };
        let mut path = Vec::new();

        loop {
            path.push(state.clone());
            match self.step(kernel, state).await? {
                Step::Next(next) => {
                    debug!(from = ?path.last(), to = ?next, "Resolver transition");
                    state = next;
                }
                Step::Done(resolution) => {
                    debug!(resolution = ?resolution, "Resolver finished");
                    return Ok(ResolverRun { path, resolution });
                }
            }
        }
    }

    /// Run the work of a single state
    pub async fn step(
        &self,
        kernel: Option<&dyn KernelHandle>,
        state: ResolverState,
    ) -> GenvResult<Step> {
        let kernel = match (state, kernel) {
            (ResolverState::NoKernel, _) | (_, None) => return Ok(Step::Done(Resolution::NoKernel)),
            (ResolverState::Ineligible, _) => return Ok(Step::Done(Resolution::Ineligible)),
            (ResolverState::Bound { eid, origin }, _) => {
                return Ok(Step::Done(Resolution::Bound { eid, origin }))
            }
            (ResolverState::HasBinding(eid), _) => {
                return Ok(Step::Next(ResolverState::Bound {
                    eid,
                    origin: BindingOrigin::Existing,
                }))
            }
            (ResolverState::Classify, Some(kernel)) => return self.classify(kernel).await,
            (ResolverState::ResolveBinding, Some(kernel)) => {
                return self.resolve_binding(kernel).await
            }
            (ResolverState::ChooseEnvironment, Some(kernel)) => kernel,
        };

        self.choose_environment(kernel).await
    }

    async fn classify(&self, kernel: &dyn KernelHandle) -> GenvResult<Step> {
        let spec = kernel.spec().await?;

        if is_genv_kernel(spec.as_ref()) {
            Ok(Step::Next(ResolverState::ResolveBinding))
        } else {
            debug!(
                kernel_id = %kernel.id(),
                spec = ?spec.map(|s| s.name),
                "Kernel is not a genv kernel"
            );
            Ok(Step::Next(ResolverState::Ineligible))
        }
    }

    async fn resolve_binding(&self, kernel: &dyn KernelHandle) -> GenvResult<Step> {
        match self.directory.find_binding(kernel.id()).await? {
            Some(eid) if !eid.is_empty() => Ok(Step::Next(ResolverState::HasBinding(eid))),
            _ => Ok(Step::Next(ResolverState::ChooseEnvironment)),
        }
    }

    async fn choose_environment(&self, kernel: &dyn KernelHandle) -> GenvResult<Step> {
        let environments = self.directory.list_environments().await?;
        let choices = EnvironmentChoices::new(&environments);

        let Some(label) = self
            .dialogs
            .pick_one(CHOOSE_ENVIRONMENT_TITLE, choices.labels())
            .await?
        else {
            debug!(kernel_id = %kernel.id(), "Environment chooser cancelled");
            return Ok(Step::Done(Resolution::Cancelled));
        };

        match choices.resolve(&label) {
            Some(Choice::CreateNew) => {
                info!(kernel_id = %kernel.id(), "New environment requested");
                Ok(Step::Done(Resolution::Provisional {
                    eid: kernel.id().to_string(),
                }))
            }
            Some(Choice::Existing(eid)) => {
                self.directory.activate_binding(kernel.id(), eid).await?;
                info!(kernel_id = %kernel.id(), eid = %eid, "Kernel bound to environment");
                Ok(Step::Next(ResolverState::Bound {
                    eid: eid.clone(),
                    origin: BindingOrigin::Activated,
                }))
            }
            None => Err(GenvError::InvalidChoice(label)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::CREATE_NEW_LABEL;
    use crate::testing::{Call, FakeDirectory, ScriptedDialogs};
    use genvlab_core::{Environment, KernelIdentity};

    fn genv_kernel() -> KernelIdentity {
        KernelIdentity::with_spec_name("k1", "python3-genv")
    }

    #[tokio::test]
    async fn test_no_kernel() {
        let directory = FakeDirectory::new();
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);

        let run = resolver.run(None).await.unwrap();

        assert_eq!(run.resolution, Resolution::NoKernel);
        assert_eq!(run.path, vec![ResolverState::NoKernel]);
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_kernel_without_spec_is_ineligible() {
        let directory = FakeDirectory::new();
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);
        let kernel = KernelIdentity::new("k1", None);

        let resolution = resolver.resolve(Some(&kernel)).await.unwrap();

        assert_eq!(resolution, Resolution::Ineligible);
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_plain_kernel_is_ineligible() {
        let directory = FakeDirectory::new();
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);
        let kernel = KernelIdentity::with_spec_name("k1", "python3");

        let run = resolver.run(Some(&kernel)).await.unwrap();

        assert_eq!(run.resolution, Resolution::Ineligible);
        assert_eq!(run.path, vec![ResolverState::Classify, ResolverState::Ineligible]);
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_binding_skips_chooser() {
        let directory = FakeDirectory::new().with_binding("k1", "env-42");
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);

        let run = resolver.run(Some(&genv_kernel())).await.unwrap();

        assert_eq!(
            run.resolution,
            Resolution::Bound {
                eid: "env-42".to_string(),
                origin: BindingOrigin::Existing
            }
        );
        assert_eq!(run.path[2], ResolverState::HasBinding("env-42".to_string()));
        assert_eq!(directory.calls(), vec![Call::FindBinding("k1".to_string())]);
        assert!(dialogs.offered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pick_existing_environment() {
        let directory =
            FakeDirectory::new().with_environments(vec![Environment::new("env-7", "bob")]);
        let dialogs = ScriptedDialogs::new().picking("env-7");
        let resolver = BindingResolver::new(&directory, &dialogs);

        let run = resolver.run(Some(&genv_kernel())).await.unwrap();

        assert_eq!(
            run.resolution,
            Resolution::Bound {
                eid: "env-7".to_string(),
                origin: BindingOrigin::Activated
            }
        );
        assert_eq!(
            run.path,
            vec![
                ResolverState::Classify,
                ResolverState::ResolveBinding,
                ResolverState::ChooseEnvironment,
                ResolverState::Bound {
                    eid: "env-7".to_string(),
                    origin: BindingOrigin::Activated
                },
            ]
        );
        assert_eq!(
            directory.calls(),
            vec![
                Call::FindBinding("k1".to_string()),
                Call::ListEnvironments,
                Call::ActivateBinding("k1".to_string(), "env-7".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_chooser_offers_create_new_and_labels() {
        let directory = FakeDirectory::new().with_environments(vec![
            Environment::new("a", "u"),
            Environment::new("b", "u").with_name("n"),
        ]);
        let dialogs = ScriptedDialogs::new().picking("n (b)");
        let resolver = BindingResolver::new(&directory, &dialogs);

        let resolution = resolver.resolve(Some(&genv_kernel())).await.unwrap();

        assert_eq!(resolution.eid(), Some("b"));
        assert_eq!(
            dialogs.offered.lock().unwrap()[0],
            vec![CREATE_NEW_LABEL.to_string(), "a".to_string(), "n (b)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_new_is_provisional() {
        let directory =
            FakeDirectory::new().with_environments(vec![Environment::new("env-7", "bob")]);
        let dialogs = ScriptedDialogs::new().picking(CREATE_NEW_LABEL);
        let resolver = BindingResolver::new(&directory, &dialogs);

        let resolution = resolver.resolve(Some(&genv_kernel())).await.unwrap();

        assert_eq!(
            resolution,
            Resolution::Provisional {
                eid: "k1".to_string()
            }
        );
        assert!(!directory
            .calls()
            .iter()
            .any(|c| matches!(c, Call::ActivateBinding(..))));
    }

    #[tokio::test]
    async fn test_cancelled_chooser() {
        let directory =
            FakeDirectory::new().with_environments(vec![Environment::new("env-7", "bob")]);
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);

        let resolution = resolver.resolve(Some(&genv_kernel())).await.unwrap();

        assert_eq!(resolution, Resolution::Cancelled);
        assert_eq!(resolution.eid(), None);
        assert_eq!(directory.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_activate_rejection_aborts() {
        let directory = FakeDirectory::new()
            .with_environments(vec![Environment::new("env-7", "bob")])
            .failing_activate(500, "disk full");
        let dialogs = ScriptedDialogs::new().picking("env-7");
        let resolver = BindingResolver::new(&directory, &dialogs);

        let err = resolver.resolve(Some(&genv_kernel())).await.unwrap_err();

        match err {
            GenvError::Response { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_step_choose_environment_in_isolation() {
        let directory =
            FakeDirectory::new().with_environments(vec![Environment::new("env-7", "bob")]);
        let dialogs = ScriptedDialogs::new().picking_index(1);
        let resolver = BindingResolver::new(&directory, &dialogs);
        let kernel = genv_kernel();

        let step = resolver
            .step(Some(&kernel), ResolverState::ChooseEnvironment)
            .await
            .unwrap();

        assert_eq!(
            step,
            Step::Next(ResolverState::Bound {
                eid: "env-7".to_string(),
                origin: BindingOrigin::Activated
            })
        );
        assert_eq!(directory.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_step_without_kernel_ends_run() {
        let directory = FakeDirectory::new();
        let dialogs = ScriptedDialogs::new();
        let resolver = BindingResolver::new(&directory, &dialogs);

        let step = resolver.step(None, ResolverState::ResolveBinding).await.unwrap();

        assert_eq!(step, Step::Done(Resolution::NoKernel));
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rebinding_is_requeried_each_run() {
        let directory =
            FakeDirectory::new().with_environments(vec![Environment::new("env-7", "bob")]);
        let dialogs = ScriptedDialogs::new().picking("env-7");
        let resolver = BindingResolver::new(&directory, &dialogs);
        let kernel = genv_kernel();

        resolver.resolve(Some(&kernel)).await.unwrap();
        let second = resolver.resolve(Some(&kernel)).await.unwrap();

        assert_eq!(
            second,
            Resolution::Bound {
                eid: "env-7".to_string(),
                origin: BindingOrigin::Existing
            }
        );
        let finds = directory
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::FindBinding(_)))
            .count();
        assert_eq!(finds, 2);
    }
}
