//! Kernelspec installer
//!
//! Every kernel spec gets a `-genv` twin next to it. The twin is a copy of
//! the spec directory whose `kernel.json` is renamed for display and
//! launched through the genv provisioner.

use genvlab_core::{genv_kernel_name, GenvError, GenvResult, KernelspecConfig, GENV_KERNEL_SUFFIX};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Provisioner that wrapper kernels are launched with
pub const PROVISIONER_NAME: &str = "genv-provisioner";

const KERNEL_JSON: &str = "kernel.json";

/// Jupyter data directories, highest precedence first
///
/// `JUPYTER_PATH` entries come first, then the user data directory, then
/// the system-wide locations.
pub fn jupyter_data_dirs() -> Vec<PathBuf> {
    let mut dirs_found: Vec<PathBuf> = std::env::var_os("JUPYTER_PATH")
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default();

    if let Some(data_dir) = dirs::data_dir() {
        dirs_found.push(data_dir.join("jupyter"));
    }
    dirs_found.push(PathBuf::from("/usr/local/share/jupyter"));
    dirs_found.push(PathBuf::from("/usr/share/jupyter"));

    dirs_found
}

/// A wrapper spec written by the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledSpec {
    /// Name of the wrapped spec
    pub name: String,
    /// Directory of the wrapped spec
    pub source: PathBuf,
    /// Directory of the wrapper
    pub destination: PathBuf,
}

/// Installer for `-genv` wrapper kernel specs
pub struct KernelspecInstaller {
    data_dirs: Vec<PathBuf>,
}

impl KernelspecInstaller {
    /// Create an installer searching the given data directories
    pub fn new(data_dirs: Vec<PathBuf>) -> Self {
        Self { data_dirs }
    }

    /// Create an installer from configuration, falling back to the
    /// standard Jupyter locations
    pub fn from_config(config: &KernelspecConfig) -> Self {
        if config.data_dirs.is_empty() {
            Self::new(jupyter_data_dirs())
        } else {
            Self::new(config.data_dirs.clone())
        }
    }

    pub fn data_dirs(&self) -> &[PathBuf] {
        &self.data_dirs
    }

    /// Kernel specs by name
    ///
    /// When a name exists in several data directories the first one wins.
    pub fn discover(&self) -> GenvResult<BTreeMap<String, PathBuf>> {
        let mut specs = BTreeMap::new();

        for data_dir in &self.data_dirs {
            let kernels = data_dir.join("kernels");
            if !kernels.is_dir() {
                continue;
            }

            for entry in fs::read_dir(&kernels)? {
                let path = entry?.path();
                if !path.join(KERNEL_JSON).is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                specs.entry(name.to_string()).or_insert(path.clone());
            }
        }

        debug!(count = specs.len(), "Discovered kernel specs");
        Ok(specs)
    }

    /// Install a wrapper for every spec that has none yet
    pub fn install(&self) -> GenvResult<Vec<InstalledSpec>> {
        let specs = self.discover()?;
        let mut installed = Vec::new();

        for (name, dir) in &specs {
            if name.ends_with(GENV_KERNEL_SUFFIX) || specs.contains_key(&genv_kernel_name(name)) {
                continue;
            }
            installed.push(install_wrapper(name, dir)?);
        }

        Ok(installed)
    }
}

fn install_wrapper(name: &str, source: &Path) -> GenvResult<InstalledSpec> {
    let destination = wrapper_dir(source)?;

    info!(
        spec = %name,
        destination = %destination.display(),
        "Installing genv wrapper kernel spec"
    );

    let source_json = source.join(KERNEL_JSON);
    let mut spec: Value = serde_json::from_str(&fs::read_to_string(&source_json)?)?;
    wrap_kernel_json(&mut spec)
        .map_err(|e| GenvError::Kernelspec(format!("{}: {}", source_json.display(), e)))?;
    let wrapped = to_json_bytes(&spec)?;

    if destination.exists() {
        return Err(GenvError::Kernelspec(format!(
            "{} already exists",
            destination.display()
        )));
    }

    let written = copy_dir(source, &destination).and_then(|()| {
        fs::write(destination.join(KERNEL_JSON), &wrapped)?;
        Ok(())
    });
    if let Err(e) = written {
        // a half-written wrapper would pass as installed on the next run
        if let Err(cleanup) = fs::remove_dir_all(&destination) {
            warn!(
                destination = %destination.display(),
                error = %cleanup,
                "Failed to remove partial wrapper"
            );
        }
        return Err(e);
    }

    Ok(InstalledSpec {
        name: name.to_string(),
        source: source.to_path_buf(),
        destination,
    })
}

fn wrapper_dir(source: &Path) -> GenvResult<PathBuf> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GenvError::Kernelspec(format!("Invalid spec directory: {}", source.display())))?;
    Ok(source.with_file_name(genv_kernel_name(file_name)))
}

/// Turn a kernel.json document into its genv wrapper
fn wrap_kernel_json(spec: &mut Value) -> Result<(), String> {
    let spec = spec.as_object_mut().ok_or("not a JSON object")?;

    let display_name = spec
        .get("display_name")
        .and_then(Value::as_str)
        .ok_or("missing display_name")?;
    let display_name = format!("{} (genv)", display_name);
    spec.insert("display_name".to_string(), Value::String(display_name));

    let metadata = spec
        .entry("metadata")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or("metadata is not a JSON object")?;
    metadata.insert(
        "kernel_provisioner".to_string(),
        json!({ "provisioner_name": PROVISIONER_NAME }),
    );

    Ok(())
}

/// Serialize with one-space indentation
fn to_json_bytes(value: &Value) -> GenvResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn copy_dir(source: &Path, destination: &Path) -> GenvResult<()> {
    fs::create_dir_all(destination)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
