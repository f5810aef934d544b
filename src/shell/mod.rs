use rustyline::{config::Configurer, error::ReadlineError, history::FileHistory, Editor};
use tracing::{debug, warn};

pub mod interpreter;
pub mod router;

pub use interpreter::{evaluate, evaluate_with, Interpreter};

use crate::{
    core::{config::ConfigPaths, state::Session},
    error::ShellError,
    flags::Flags,
    highlight::SyntaxHighlighter,
    input::ShellCompleter,
    process::signal,
};

pub struct Shell {
    pub(crate) editor: Editor<ShellCompleter, FileHistory>,
    pub(crate) interpreter: Interpreter,
    pub(crate) flags: Flags,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let mut session = Session::new()?;
        if flags.no_color {
            session = session.with_highlighter(SyntaxHighlighter::plain());
        }

        let mut interpreter = Interpreter::new(session);
        if !flags.no_rc {
            Self::load_rc(&mut interpreter, &flags)?;
        }

        let mut editor = Editor::<ShellCompleter, FileHistory>::new()?;
        editor.set_helper(Some(ShellCompleter::new(interpreter.session())));
        editor.set_auto_add_history(true);

        Ok(Shell {
            editor,
            interpreter,
            flags,
        })
    }

    fn load_rc(interpreter: &mut Interpreter, flags: &Flags) -> Result<(), ShellError> {
        let output = match &flags.rc {
            Some(path) => interpreter.load_rc(&ConfigPaths::with_rc(path.clone()))?,
            None => match ConfigPaths::new().and_then(|paths| interpreter.load_rc(&paths)) {
                Ok(output) => output,
                Err(e) => {
                    warn!(error = %e, "skipping rc file");
                    return Ok(());
                }
            },
        };

        if !output.is_empty() {
            println!("{output}");
        }
        Ok(())
    }

    pub fn run_command(&mut self, line: &str) -> Result<(), ShellError> {
        if let Some(output) = self.interpreter.execute(line) {
            println!("{output}");
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        signal::install_interrupt_handler()?;

        if !self.flags.quiet {
            let highlighter = self.interpreter.session().highlighter;
            println!(
                "{}",
                highlighter.highlight_info(&format!(
                    "winux {} - type 'help' for commands, 'exit' to quit",
                    env!("CARGO_PKG_VERSION")
                ))
            );
        }

        while self.interpreter.is_running() {
            if let Some(helper) = self.editor.helper_mut() {
                helper.refresh(self.interpreter.registry(), self.interpreter.session());
            }

            let prompt = self.interpreter.session().prompt();
            let read = self.editor.readline(&prompt);
            if let Some(output) = handle_read(&mut self.interpreter, read) {
                println!("{output}");
            }
        }
        Ok(())
    }
}

/// A read error other than `^C` ends the session the same way EOF does.
fn handle_read(
    interpreter: &mut Interpreter,
    read: Result<String, ReadlineError>,
) -> Option<String> {
    match read {
        Ok(line) => interpreter.execute(&line),
        Err(ReadlineError::Interrupted) => Some("^C".to_string()),
        Err(ReadlineError::Eof) => {
            debug!("end of input");
            interpreter.shutdown()
        }
        Err(e) => {
            warn!(error = %e, "cannot read input, leaving shell");
            interpreter.shutdown()
        }
    }
}
