use std::path::{Path, PathBuf};

use super::{Command, CommandError, Context};
use crate::core::env::PATH_SEPARATOR;

pub struct ExitCommand;

impl Command for ExitCommand {
    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        ctx.session.terminate();
        Ok(ctx.highlighter.highlight_info("Goodbye!"))
    }

    fn usage(&self) -> &'static str {
        "exit"
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let registry = ctx.registry;

        if let Some(name) = args.first() {
            return registry
                .get(name)
                .map(|command| format!("{name}: {}", command.usage()))
                .ok_or_else(|| CommandError::ExecutionError(format!("no manual entry for {name}")));
        }

        let mut lines = vec!["Built-in commands:".to_string()];
        for name in registry.names() {
            if let Some(command) = registry.get(&name) {
                lines.push(format!("  {name:<10} {}", command.usage()));
            }
        }
        lines.push(String::new());
        lines.push("Anything else is run by the host shell.".to_string());
        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "help [COMMAND]"
    }
}

pub struct ClearCommand;

impl Command for ClearCommand {
    fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<String, CommandError> {
        Ok("\x1b[H\x1b[J".to_string())
    }

    fn usage(&self) -> &'static str {
        "clear"
    }
}

pub struct EchoCommand;

impl EchoCommand {
    fn unescape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        out
    }
}

impl Command for EchoCommand {
    fn execute(&self, args: &[String], _ctx: &mut Context<'_>) -> Result<String, CommandError> {
        // Output is line oriented, so -n is accepted and has nothing to drop.
        let start = args.iter().take_while(|arg| *arg == "-n").count();
        Ok(Self::unescape(&args[start..].join(" ")))
    }

    fn usage(&self) -> &'static str {
        "echo [-n] [TEXT ...]"
    }
}

pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        Ok(ctx.session.virtual_cwd())
    }

    fn usage(&self) -> &'static str {
        "pwd"
    }
}

pub struct WhichCommand;

impl WhichCommand {
    fn search_path(path_var: &str, name: &str) -> Option<PathBuf> {
        let extensions: &[&str] = if cfg!(windows) {
            &["", ".exe", ".cmd", ".bat", ".com"]
        } else {
            &[""]
        };

        path_var
            .split(PATH_SEPARATOR)
            .filter(|dir| !dir.is_empty())
            .flat_map(|dir| {
                extensions
                    .iter()
                    .map(move |ext| Path::new(dir).join(format!("{name}{ext}")))
            })
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

impl Command for WhichCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        if args.is_empty() {
            return Err(CommandError::usage(self.usage()));
        }

        let path_var = ctx.session.env.get("PATH").unwrap_or_default().to_string();
        let lines: Vec<String> = args
            .iter()
            .map(|name| {
                if let Some(replacement) = ctx.session.aliases.lookup(name) {
                    format!("{name}: aliased to '{replacement}'")
                } else if ctx.registry.contains(name) {
                    format!("{name}: shell builtin")
                } else if let Some(found) = Self::search_path(&path_var, name) {
                    found.to_string_lossy().into_owned()
                } else {
                    ctx.error_line("which", &format!("no {name} in PATH"))
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "which NAME ..."
    }
}
