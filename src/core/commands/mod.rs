use std::any::Any;
use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, warn};

mod alias;
mod builtin;
mod cd;
mod export;
mod files;
mod history;
mod options;
mod source;
mod system;
mod text;

pub use alias::{AliasCommand, UnaliasCommand};
pub use builtin::{
    ClearCommand, EchoCommand, ExitCommand, HelpCommand, PwdCommand, WhichCommand,
};
pub use cd::{change_directory, CdCommand};
pub use export::{EnvCommand, ExportCommand, UnsetCommand};
pub use files::{
    CopyCommand, FindCommand, ListCommand, MakeDirCommand, MoveCommand, RemoveCommand,
    RemoveDirCommand, TouchCommand,
};
pub use history::HistoryCommand;
pub use source::SourceCommand;
pub use system::{DateCommand, HostnameCommand, UnameCommand, WhoamiCommand};
pub use text::{
    CatCommand, CutCommand, DiffCommand, GrepCommand, HeadCommand, SortCommand, TailCommand,
    TrCommand, UniqCommand, WcCommand,
};

use super::env::EnvError;
use super::state::Session;
use super::tokenizer::Tokens;
use crate::highlight::SyntaxHighlighter;
use crate::process::{HostExecutor, ProcessError};

pub const SHELL_ORIGIN: &str = "winux";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{0}")]
    ExecutionError(String),

    #[error("{}", describe_io(.0))]
    Io(#[from] io::Error),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

impl CommandError {
    pub fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

/// Short POSIX-style wording for an I/O error, without the OS error code.
pub fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::AlreadyExists => "File exists".to_string(),
        _ => {
            let text = err.to_string();
            match text.find(" (os error") {
                Some(index) => text[..index].to_string(),
                None => text,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub origin: String,
    pub message: String,
}

impl Failure {
    pub fn new(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn shell(message: impl Into<String>) -> Self {
        Self::new(SHELL_ORIGIN, message)
    }

    /// A failure of the line itself, shown without an origin.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(String::new(), message)
    }

    pub fn render(&self, highlighter: &SyntaxHighlighter) -> String {
        highlighter.highlight_error(&self.to_string())
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.origin.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.origin, self.message)
        }
    }
}

/// What a handler gets to see: the session, the registry it was found in,
/// the output of the previous pipeline stage and the highlighter for this
/// call. Output that is piped or redirected gets a plain highlighter.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub registry: &'a CommandRegistry,
    pub input: Option<&'a str>,
    pub highlighter: SyntaxHighlighter,
}

impl Context<'_> {
    pub fn cwd(&self) -> &str {
        &self.session.cwd
    }

    pub fn resolve(&self, path: &str) -> String {
        self.session.resolve(path)
    }

    pub fn error_line(&self, origin: &str, message: &str) -> String {
        self.highlighter
            .highlight_error(&format!("{origin}: {message}"))
    }
}

pub trait Command {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError>;

    fn usage(&self) -> &'static str;
}

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    host: HostExecutor,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CommandRegistry {
    pub fn new(host: HostExecutor) -> Self {
        Self {
            commands: HashMap::new(),
            host,
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new(HostExecutor::new());

        registry.register("cd", CdCommand);
        registry.register("exit", ExitCommand);
        registry.register("quit", ExitCommand);
        registry.register("help", HelpCommand);
        registry.register("man", HelpCommand);
        registry.register("history", HistoryCommand);
        registry.register("alias", AliasCommand);
        registry.register("unalias", UnaliasCommand);
        registry.register("export", ExportCommand);
        registry.register("unset", UnsetCommand);
        registry.register("env", EnvCommand);
        registry.register("which", WhichCommand);
        registry.register("source", SourceCommand);

        registry.register("echo", EchoCommand);
        registry.register("pwd", PwdCommand);
        registry.register("clear", ClearCommand);

        registry.register("ls", ListCommand::new());
        registry.register("dir", ListCommand::long());
        registry.register("mkdir", MakeDirCommand);
        registry.register("rmdir", RemoveDirCommand);
        registry.register("rm", RemoveCommand);
        registry.register("touch", TouchCommand);
        registry.register("cp", CopyCommand);
        registry.register("mv", MoveCommand);
        registry.register("find", FindCommand);

        registry.register("cat", CatCommand);
        registry.register("head", HeadCommand);
        registry.register("tail", TailCommand);
        registry.register("grep", GrepCommand);
        registry.register("wc", WcCommand);
        registry.register("sort", SortCommand);
        registry.register("uniq", UniqCommand);
        registry.register("cut", CutCommand);
        registry.register("tr", TrCommand);
        registry.register("diff", DiffCommand);

        registry.register("date", DateCommand);
        registry.register("whoami", WhoamiCommand);
        registry.register("hostname", HostnameCommand);
        registry.register("uname", UnameCommand);

        registry
    }

    pub fn register(&mut self, name: &str, command: impl Command + 'static) {
        if self
            .commands
            .insert(name.to_string(), Box::new(command))
            .is_some()
        {
            debug!(name, "command handler replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs one tokenized command. `line` is the alias-expanded text of the
    /// segment, handed to the host shell when no handler is registered.
    pub fn dispatch(
        &self,
        session: &mut Session,
        tokens: &Tokens,
        line: &str,
        input: Option<&str>,
        highlighter: SyntaxHighlighter,
    ) -> Result<String, Failure> {
        if tokens.is_empty() {
            return Ok(String::new());
        }

        let Some(command) = self.get(&tokens.command) else {
            debug!(command = %tokens.command, "no handler registered, using host shell");
            return self
                .host
                .run(line, &session.cwd, &session.env, input)
                .map_err(|e| Failure::new(&tokens.command, e.to_string()));
        };

        debug!(command = %tokens.command, args = ?tokens.args, "dispatching");
        let mut ctx = Context {
            session,
            registry: self,
            input,
            highlighter,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            command.execute(&tokens.args, &mut ctx)
        }));

        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => {
                debug!(command = %tokens.command, error = %e, "command failed");
                Err(Failure::new(&tokens.command, e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(command = %tokens.command, message, "command panicked");
                Err(Failure::new(&tokens.command, message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unexpected failure".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::tokenize;
    use crate::path::{PathExpander, PathStyle, PathTranslator};

    fn session() -> Session {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        Session::with_cwd("/", translator)
    }

    fn plain() -> SyntaxHighlighter {
        SyntaxHighlighter::plain()
    }

    struct Exploding;

    impl Command for Exploding {
        fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<String, CommandError> {
            panic!("kaboom")
        }

        fn usage(&self) -> &'static str {
            "explode"
        }
    }

    struct Fixed(&'static str);

    impl Command for Fixed {
        fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<String, CommandError> {
            Ok(self.0.to_string())
        }

        fn usage(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = CommandRegistry::with_builtins();
        for name in [
            "cd", "exit", "quit", "history", "alias", "ls", "dir", "grep", "find", "cut", "tr",
            "diff", "date", "whoami", "hostname", "uname",
        ] {
            assert!(registry.contains(name), "{name} should be registered");
        }
        assert!(!registry.contains("definitely-not-here"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_names_sorted() {
        let names = CommandRegistry::with_builtins().names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_empty_command_is_noop() {
        let registry = CommandRegistry::with_builtins();
        let mut session = session();
        let output = registry.dispatch(&mut session, &Tokens::default(), "", None, plain());
        assert_eq!(output, Ok(String::new()));
    }

    #[test]
    fn test_panic_is_caught() {
        let mut registry = CommandRegistry::new(HostExecutor::new());
        registry.register("boom", Exploding);
        let mut session = session();

        let tokens = tokenize("boom now");
        let failure = registry
            .dispatch(&mut session, &tokens, "boom now", None, plain())
            .expect_err("panic should become a failure");
        assert_eq!(failure, Failure::new("boom", "kaboom"));
        assert_eq!(failure.render(&SyntaxHighlighter::plain()), "✗ boom: kaboom");
        assert!(session.is_running());
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = CommandRegistry::new(HostExecutor::new());
        registry.register("greet", Fixed("first"));
        registry.register("greet", Fixed("second"));
        let mut session = session();
        let output = registry.dispatch(&mut session, &tokenize("greet"), "greet", None, plain());
        assert_eq!(output, Ok("second".to_string()));
    }

    #[test]
    fn test_command_error_is_rendered_with_origin() {
        let registry = CommandRegistry::with_builtins();
        let mut session = session();
        let failure = registry
            .dispatch(
                &mut session,
                &tokenize("cd /no/such/dir"),
                "cd /no/such/dir",
                None,
                plain(),
            )
            .expect_err("missing directory");
        assert_eq!(failure.origin, "cd");
        assert!(failure.message.contains("No such file or directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unknown_command_uses_host() {
        let registry = CommandRegistry::new(HostExecutor::new());
        let mut session = session();
        let output =
            registry.dispatch(&mut session, &tokenize("printf hi"), "printf hi", None, plain());
        assert_eq!(output, Ok("hi".to_string()));
    }

    #[test]
    fn test_describe_io_strips_os_code() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(describe_io(&err), "No such file or directory");
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(describe_io(&err), "Permission denied");
        let err = io::Error::other("Directory not empty (os error 39)");
        assert_eq!(describe_io(&err), "Directory not empty");
    }
}
