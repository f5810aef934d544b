use std::fs;
use std::io;

use tracing::debug;

use super::{Command, CommandError, Context};
use crate::path::PathTranslator;

/// Works out where `cd args` should go from `cwd`.
///
/// Returns the new native directory and the text to print (only `cd -`
/// prints anything). Nothing is changed on failure.
pub fn change_directory(
    args: &[String],
    cwd: &str,
    oldpwd: Option<&str>,
    translator: &PathTranslator,
) -> Result<(String, String), CommandError> {
    if args.len() > 1 {
        return Err(CommandError::InvalidArguments(
            "too many arguments".to_string(),
        ));
    }

    let requested = args.first().map(String::as_str).unwrap_or("~");
    let (target, message) = match requested {
        "-" => {
            let previous = oldpwd
                .ok_or_else(|| CommandError::ExecutionError("OLDPWD not set".to_string()))?;
            let shown = translator.to_virtual(previous, previous);
            (previous.to_string(), shown)
        }
        "~" if translator.home().is_none() => {
            return Err(CommandError::ExecutionError("HOME not set".to_string()));
        }
        path => (translator.to_native(path, cwd), String::new()),
    };

    match fs::metadata(&target) {
        Ok(meta) if meta.is_dir() => {
            debug!(from = cwd, to = %target, "changing directory");
            Ok((target, message))
        }
        Ok(_) => Err(CommandError::ExecutionError(format!(
            "{requested}: Not a directory"
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CommandError::NotFound(requested.to_string()))
        }
        Err(e) => Err(CommandError::ExecutionError(format!(
            "{requested}: {}",
            super::describe_io(&e)
        ))),
    }
}

pub struct CdCommand;

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let session = &mut *ctx.session;
        let (target, message) = change_directory(
            args,
            &session.cwd,
            session.env.get("OLDPWD"),
            &session.translator,
        )?;
        session.change_cwd(target);
        Ok(message)
    }

    fn usage(&self) -> &'static str {
        "cd [DIR | - | ~]"
    }
}
