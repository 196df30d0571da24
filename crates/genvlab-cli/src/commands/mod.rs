//! CLI commands implementation

use anyhow::Result;
use genvlab_client::Directory;
use genvlab_core::{available_indices, describe_devices, ClientConfig, KernelIdentity, KernelSpec};
use genvlab_runtime::{KernelspecInstaller, LaunchProvisioner, CUDA_VISIBLE_DEVICES};
use genvlab_workflow::{
    configuration_script, ConfigurationOutcome, GenvWorkflow, KernelHandle, Resolution,
    TerminalRegistry, WorkflowOutcome,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

use crate::console::{ConsoleDialogs, ConsoleHost};

/// Show device usage
pub async fn devices(directory: &dyn Directory) -> Result<()> {
    let devices = directory.list_devices().await?;

    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }
    for line in describe_devices(&devices) {
        println!("{}", line);
    }
    println!(
        "{}/{} devices available",
        available_indices(&devices).len(),
        devices.len()
    );

    Ok(())
}

/// Show active environments
pub async fn envs(directory: &dyn Directory) -> Result<()> {
    let environments = directory.list_environments().await?;

    if environments.is_empty() {
        println!("No active environments");
        return Ok(());
    }
    for env in &environments {
        println!("{}", env.summary());
    }

    Ok(())
}

/// Show the environment a kernel is bound to
pub async fn find(directory: &dyn Directory, kernel_id: String) -> Result<()> {
    match directory.find_binding(&kernel_id).await? {
        Some(eid) if !eid.is_empty() => println!("{}", eid),
        _ => eprintln!("Kernel '{}' is not bound to an environment", kernel_id),
    }

    Ok(())
}

/// Bind a kernel to an environment
pub async fn activate(directory: &dyn Directory, kernel_id: String, eid: String) -> Result<()> {
    directory.activate_binding(&kernel_id, &eid).await?;
    println!("Kernel '{}' bound to environment '{}'", kernel_id, eid);
    Ok(())
}

/// Run the interactive binding workflow on the console
pub async fn configure(
    directory: Arc<dyn Directory>,
    config: &ClientConfig,
    kernel_id: Option<String>,
    spec_name: Option<String>,
) -> Result<()> {
    let dialogs = ConsoleDialogs::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let workflow = GenvWorkflow::new(
        directory,
        Arc::new(dialogs),
        Arc::new(ConsoleHost::new()),
        TerminalRegistry::new(config.terminal.clone()),
    );

    let kernel = kernel_id.map(|id| KernelIdentity::new(id, spec_name.map(KernelSpec::new)));
    let outcome = workflow
        .run(kernel.as_ref().map(|k| k as &dyn KernelHandle))
        .await?;

    println!("\n{}", describe_outcome(&outcome));
    Ok(())
}

/// Print the configuration script of an environment
pub fn script(eid: String) -> Result<()> {
    for line in configuration_script(&eid) {
        println!("{}", line);
    }
    Ok(())
}

/// Print the launch environment of a kernel
pub async fn launch_env(directory: Arc<dyn Directory>, kernel_id: String) -> Result<()> {
    let provisioner = LaunchProvisioner::new(directory);
    let env = provisioner.prepare_launch(&kernel_id, HashMap::new()).await?;

    if let Some(visible) = env.get(CUDA_VISIBLE_DEVICES) {
        println!("{}={}", CUDA_VISIBLE_DEVICES, visible);
    }
    Ok(())
}

/// Install genv wrapper kernel specs
pub fn install(config: &ClientConfig, data_dirs: Vec<PathBuf>) -> Result<()> {
    let installer = if data_dirs.is_empty() {
        KernelspecInstaller::from_config(&config.kernelspec)
    } else {
        KernelspecInstaller::new(data_dirs)
    };

    let installed = installer.install()?;
    if installed.is_empty() {
        println!("Every kernel spec already has a genv wrapper");
        return Ok(());
    }
    for spec in &installed {
        println!(
            "Installed genv wrapper for kernel spec \"{}\" at {}",
            spec.name,
            spec.destination.display()
        );
    }

    Ok(())
}

fn describe_outcome(outcome: &WorkflowOutcome) -> String {
    match outcome {
        WorkflowOutcome::NoKernel { .. } => "No kernel selected".to_string(),
        WorkflowOutcome::Ineligible { .. } => "Kernel is not a genv kernel".to_string(),
        WorkflowOutcome::Cancelled => "No environment selected".to_string(),
        WorkflowOutcome::Configured {
            resolution,
            configuration,
        } => {
            let bound = match resolution {
                Resolution::Provisional { eid } => format!("New environment '{}'", eid),
                other => format!("Environment '{}'", other.eid().unwrap_or_default()),
            };
            match configuration {
                ConfigurationOutcome::Declined => format!("{} (not configured)", bound),
                ConfigurationOutcome::Dispatched { terminal } => {
                    format!("{} configured in terminal '{}'", bound, terminal)
                }
                ConfigurationOutcome::TerminalUnavailable { terminal } => format!(
                    "{}: terminal '{}' is already open, configuration commands were not sent",
                    bound, terminal
                ),
            }
        }
    }
}
