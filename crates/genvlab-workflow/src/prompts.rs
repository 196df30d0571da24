//! Dialog texts

/// Title of the environment chooser
pub const CHOOSE_ENVIRONMENT_TITLE: &str = "Activate GPU Environment";

/// Label of the synthetic "create new" choice
pub const CREATE_NEW_LABEL: &str = "Create a new environment";

/// Command that installs genv kernel specs
pub const INSTALL_COMMAND: &str = "genvlab install";

/// A confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    /// Body paragraphs
    pub body: Vec<String>,
    pub cancel_label: String,
    pub accept_label: String,
}

impl Prompt {
    fn new(title: &str, body: Vec<String>, accept_label: &str) -> Self {
        Self {
            title: title.to_string(),
            body,
            cancel_label: "Later".to_string(),
            accept_label: accept_label.to_string(),
        }
    }

    /// No kernel is attached to the notebook
    pub fn no_kernel() -> Self {
        Self::new(
            "No Kernel",
            vec!["You need a kernel in order to run in a GPU environment.".to_string()],
            "Select kernel",
        )
    }

    /// The attached kernel is not a genv kernel
    pub fn not_supported_kernel() -> Self {
        Self::new(
            "Not a genv Kernel",
            vec![
                "Please select a genv kernel.".to_string(),
                "If you don't have any, run the following command:".to_string(),
                format!("    {}", INSTALL_COMMAND),
            ],
            "Select kernel",
        )
    }

    /// Offer to configure an environment from a terminal
    pub fn configure(eid: &str) -> Self {
        Self::new(
            "Configure GPU Environment",
            vec![
                "Open a terminal and run the following command:".to_string(),
                format!("    genv activate --id {}", eid),
                "Then, configure the environment with normal genv commands.".to_string(),
                "If you are not familiar with how to configure genv environments, check out the genv reference at https://github.com/run-ai/genv.".to_string(),
                "IMPORTANT: You will need to restart the kernel for changes from the terminal to take effect.".to_string(),
            ],
            "Open a terminal",
        )
    }
}
