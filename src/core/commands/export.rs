use std::borrow::Cow;

use super::{Command, CommandError, Context};
use crate::core::env::EnvError;

fn parse_assignment(arg: &str) -> Result<(&str, Option<Cow<'_, str>>), CommandError> {
    let Some((name, value)) = arg.split_once('=') else {
        return Ok((arg.trim(), None));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::Env(EnvError::EmptyName));
    }

    let value = value.trim();
    let value = if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        Cow::Owned(value[1..value.len() - 1].to_owned())
    } else {
        Cow::Borrowed(value)
    };

    Ok((name, Some(value)))
}

pub struct ExportCommand;

impl Command for ExportCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let env = &mut ctx.session.env;

        if args.is_empty() {
            let lines: Vec<String> = env
                .iter()
                .map(|(name, value)| format!("export {name}=\"{value}\""))
                .collect();
            return Ok(lines.join("\n"));
        }

        for arg in args {
            match parse_assignment(arg)? {
                (name, Some(value)) => env.set(name, &value)?,
                // Everything in the session environment is already exported.
                (name, None) => crate::core::env::validate_name(name)?,
            }
        }
        Ok(String::new())
    }

    fn usage(&self) -> &'static str {
        "export [NAME=VALUE ...]"
    }
}

pub struct UnsetCommand;

impl Command for UnsetCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        if args.is_empty() {
            return Err(CommandError::usage(self.usage()));
        }
        for name in args {
            crate::core::env::validate_name(name)?;
            ctx.session.env.remove(name);
        }
        Ok(String::new())
    }

    fn usage(&self) -> &'static str {
        "unset NAME ..."
    }
}

pub struct EnvCommand;

impl Command for EnvCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        if !args.is_empty() {
            return Err(CommandError::usage(self.usage()));
        }
        let lines: Vec<String> = ctx
            .session
            .env
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "env"
    }
}
