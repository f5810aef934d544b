use std::env;

use tracing::warn;

use super::aliases::AliasTable;
use super::env::Environment;
use crate::error::ShellError;
use crate::highlight::SyntaxHighlighter;
use crate::input::History;
use crate::path::PathTranslator;

#[derive(Debug, Clone)]
pub struct Session {
    /// Current working directory in native form.
    pub cwd: String,
    pub env: Environment,
    pub history: History,
    pub aliases: AliasTable,
    pub translator: PathTranslator,
    pub highlighter: SyntaxHighlighter,
    running: bool,
    pub(crate) source_depth: usize,
}

impl Session {
    pub fn new() -> Result<Self, ShellError> {
        let cwd = env::current_dir()?.to_string_lossy().into_owned();
        Ok(Self::with_cwd(cwd, PathTranslator::host()).with_highlighter(SyntaxHighlighter::new()))
    }

    /// Session rooted at `cwd` with plain (uncolored) output.
    pub fn with_cwd(cwd: impl Into<String>, translator: PathTranslator) -> Self {
        Self {
            cwd: cwd.into(),
            env: Environment::from_process(),
            history: History::new(),
            aliases: AliasTable::with_defaults(),
            translator,
            highlighter: SyntaxHighlighter::plain(),
            running: true,
            source_depth: 0,
        }
    }

    pub fn with_highlighter(mut self, highlighter: SyntaxHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn terminate(&mut self) {
        self.running = false;
    }

    pub fn resolve(&self, path: &str) -> String {
        self.translator.to_native(path, &self.cwd)
    }

    pub fn virtual_cwd(&self) -> String {
        self.translator.to_virtual(&self.cwd, &self.cwd)
    }

    pub fn change_cwd(&mut self, new_cwd: String) {
        let previous = std::mem::replace(&mut self.cwd, new_cwd);
        if let Err(e) = self.env.set("OLDPWD", &previous) {
            warn!(error = %e, "failed to record OLDPWD");
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        self.env.get("USERNAME").or_else(|| self.env.get("USER"))
    }

    pub fn host_name(&self) -> Option<&str> {
        self.env
            .get("COMPUTERNAME")
            .or_else(|| self.env.get("HOSTNAME"))
    }

    pub fn prompt(&self) -> String {
        format!(
            "{}@{}:{}$ ",
            self.user_name().unwrap_or("user"),
            self.host_name().unwrap_or("localhost"),
            self.translator.display_path(&self.cwd)
        )
    }
}
