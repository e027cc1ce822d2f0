//! Supervised local application server.
//!
//! When a launch command is configured, the gateway starts the local server
//! that receives delegated traffic, passes it the port to listen on through
//! `PORT`, and treats an unsuccessful exit as fatal.

use std::process::{ExitStatus, Stdio};

use axum::http::uri::Authority;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::DelegateConfig;

/// Errors from the delegate process.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("delegate address `{0}` must be host:port")]
    Address(String),

    #[error("could not start `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Exited { program: String, status: ExitStatus },

    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A running delegate process. Killed when dropped.
#[derive(Debug)]
pub struct DelegateProcess {
    program: String,
    child: Child,
}

impl DelegateProcess {
    /// Launch the configured command. Returns `None` when no command is
    /// configured and the delegate is managed elsewhere.
    pub fn spawn(config: &DelegateConfig) -> Result<Option<Self>, LifecycleError> {
        let Some((program, args)) = config.command.split_first() else {
            return Ok(None);
        };

        let port = config
            .address
            .parse::<Authority>()
            .ok()
            .and_then(|authority| authority.port_u16())
            .ok_or_else(|| LifecycleError::Address(config.address.clone()))?;

        let child = Command::new(program)
            .args(args)
            .env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LifecycleError::Launch {
                program: program.clone(),
                source,
            })?;

        tracing::info!(program = %program, port, pid = ?child.id(), "Delegate process started");

        Ok(Some(Self {
            program: program.clone(),
            child,
        }))
    }

    /// Wait on the process. Resolves only when it fails; a clean exit is
    /// logged and the delegate is left to whatever serves the port next.
    pub async fn supervise(mut self) -> LifecycleError {
        match self.child.wait().await {
            Ok(status) if status.success() => {
                tracing::info!(program = %self.program, "Delegate process exited cleanly");
                std::future::pending().await
            }
            Ok(status) => LifecycleError::Exited {
                program: self.program,
                status,
            },
            Err(source) => LifecycleError::Wait {
                program: self.program,
                source,
            },
        }
    }
}
