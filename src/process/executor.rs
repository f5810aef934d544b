use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use super::ProcessError;
use crate::core::env::Environment;

#[derive(Debug, Clone)]
pub struct HostExecutor {
    program: String,
    flag: String,
}

impl Default for HostExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HostExecutor {
    pub fn new() -> Self {
        if cfg!(windows) {
            Self::with_shell("cmd", "/C")
        } else {
            Self::with_shell("sh", "-c")
        }
    }

    pub fn with_shell(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }

    /// Stdout and stderr are captured and concatenated. Exit status is not
    /// an error.
    pub fn run(
        &self,
        line: &str,
        cwd: &str,
        env: &Environment,
        input: Option<&str>,
    ) -> Result<String, ProcessError> {
        debug!(program = %self.program, line, cwd, "spawning host command");

        let mut command = Command::new(&self.program);
        command
            .arg(&self.flag)
            .arg(line)
            .current_dir(cwd)
            .env_clear()
            .envs(env.iter())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::inherit()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Written from a separate thread so a child that fills its output
        // pipe before draining stdin cannot deadlock us.
        let writer = match (input, child.stdin.take()) {
            (Some(text), Some(mut stdin)) => {
                let data = text.to_owned();
                Some(thread::spawn(move || stdin.write_all(data.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output()?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    warn!(error = %e, "failed to write piped input to host command");
                }
                Err(_) => warn!("stdin writer thread panicked"),
                _ => {}
            }
        }

        debug!(status = %output.status, "host command finished");

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text.trim_end().to_string())
    }
}
