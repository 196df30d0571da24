//! Console collaborators
//!
//! Dialogs are answered on stdin and the configuration terminal is printed
//! to stdout, so the binding workflow can run outside a notebook.

use async_trait::async_trait;
use genvlab_core::{GenvError, GenvResult};
use genvlab_workflow::{DialogSurface, HostCommands, Prompt, TerminalSession, INSTALL_COMMAND};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::Mutex as AsyncMutex;

fn dialog_error(e: std::io::Error) -> GenvError {
    GenvError::Dialog(e.to_string())
}

/// Dialog surface reading answers line by line
pub struct ConsoleDialogs<R, W> {
    input: AsyncMutex<Lines<R>>,
    output: AsyncMutex<W>,
}

impl<R, W> ConsoleDialogs<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: AsyncMutex::new(input.lines()),
            output: AsyncMutex::new(output),
        }
    }

    async fn write(&self, text: &str) -> GenvResult<()> {
        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await.map_err(dialog_error)?;
        output.flush().await.map_err(dialog_error)
    }

    /// Next answer, trimmed; `None` at end of input
    async fn read_answer(&self) -> GenvResult<Option<String>> {
        let mut input = self.input.lock().await;
        let line = input.next_line().await.map_err(dialog_error)?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

#[async_trait]
impl<R, W> DialogSurface for ConsoleDialogs<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, prompt: &Prompt) -> GenvResult<bool> {
        let mut text = format!("\n{}\n", prompt.title);
        for line in &prompt.body {
            text.push_str(&format!("  {}\n", line));
        }
        text.push_str(&format!(
            "{}? [y/N] (N = {}): ",
            prompt.accept_label, prompt.cancel_label
        ));
        self.write(&text).await?;

        let accepted = matches!(
            self.read_answer().await?.as_deref().map(str::to_lowercase).as_deref(),
            Some("y") | Some("yes")
        );
        Ok(accepted)
    }

    async fn pick_one(&self, title: &str, items: &[String]) -> GenvResult<Option<String>> {
        let mut text = format!("\n{}\n", title);
        for (i, item) in items.iter().enumerate() {
            text.push_str(&format!("  {}) {}\n", i + 1, item));
        }
        text.push_str(&format!("Select [1-{}] (empty to cancel): ", items.len()));
        self.write(&text).await?;

        let answer = match self.read_answer().await? {
            Some(answer) if !answer.is_empty() => answer,
            _ => return Ok(None),
        };

        // labels first; unnamed environments are labelled by numeric eids
        if items.contains(&answer) {
            return Ok(Some(answer));
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => Ok(Some(items[n - 1].clone())),
            Ok(n) => Err(GenvError::Dialog(format!(
                "Selection {} is out of range 1-{}",
                n,
                items.len()
            ))),
            Err(_) => Ok(Some(answer)),
        }
    }
}

/// Terminal session echoing its input to stdout
pub struct ConsoleSession {
    name: String,
}

#[async_trait]
impl TerminalSession for ConsoleSession {
    async fn send_input(&self, lines: &[String]) -> GenvResult<()> {
        println!("\n--- terminal '{}' ---", self.name);
        for line in lines {
            println!("{}", line);
        }
        println!("---");
        Ok(())
    }
}

/// Console host; each terminal name is handed out once per process
#[derive(Default)]
pub struct ConsoleHost {
    open: Mutex<HashSet<String>>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HostCommands for ConsoleHost {
    async fn open_terminal(&self, name: &str) -> GenvResult<Option<Arc<dyn TerminalSession>>> {
        let mut open = self
            .open
            .lock()
            .map_err(|_| GenvError::Terminal("terminal table poisoned".to_string()))?;
        if !open.insert(name.to_string()) {
            return Ok(None);
        }

        Ok(Some(Arc::new(ConsoleSession {
            name: name.to_string(),
        })))
    }

    async fn change_kernel(&self) -> GenvResult<()> {
        println!(
            "Rerun with --kernel-id and --spec-name of a genv kernel (install them with `{}`)",
            INSTALL_COMMAND
        );
        Ok(())
    }
}
