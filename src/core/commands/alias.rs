use super::{Command, CommandError, Context};

fn format_alias(name: &str, replacement: &str) -> String {
    format!("alias {name}='{replacement}'")
}

pub struct AliasCommand;

impl Command for AliasCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let aliases = &mut ctx.session.aliases;

        if args.is_empty() {
            let lines: Vec<String> = aliases
                .list_all()
                .map(|(name, replacement)| format_alias(name, replacement))
                .collect();
            return Ok(lines.join("\n"));
        }

        // An unquoted definition may have been split into several words.
        if args[0].contains('=') {
            let definition = args.join(" ");
            let Some((name, value)) = definition.split_once('=') else {
                return Err(CommandError::usage(self.usage()));
            };
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(CommandError::InvalidArguments(format!(
                    "invalid alias name: '{name}'"
                )));
            }
            let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
            aliases.set(name, value);
            return Ok(String::new());
        }

        if let [name] = args {
            return aliases
                .lookup(name)
                .map(|replacement| format_alias(name, replacement))
                .ok_or_else(|| CommandError::ExecutionError(format!("{name}: not found")));
        }

        let lines: Vec<String> = args
            .iter()
            .map(|name| match ctx.session.aliases.lookup(name) {
                Some(replacement) => format_alias(name, replacement),
                None => ctx.error_line("alias", &format!("{name}: not found")),
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "alias [NAME[=VALUE] ...]"
    }
}

pub struct UnaliasCommand;

impl Command for UnaliasCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        match args {
            [] => Err(CommandError::usage(self.usage())),
            [flag] if flag == "-a" => {
                ctx.session.aliases.clear();
                Ok(String::new())
            }
            [name] => ctx
                .session
                .aliases
                .remove(name)
                .map(|_| String::new())
                .ok_or_else(|| CommandError::ExecutionError(format!("{name}: not found"))),
            names => {
                let mut errors = Vec::new();
                for name in names {
                    if ctx.session.aliases.remove(name).is_none() {
                        errors.push(ctx.error_line("unalias", &format!("{name}: not found")));
                    }
                }
                Ok(errors.join("\n"))
            }
        }
    }

    fn usage(&self) -> &'static str {
        "unalias [-a] NAME ..."
    }
}
