use std::fs;

use tracing::debug;

use super::{Command, CommandError, Context};
use crate::shell::evaluate_with;

/// Guards against files that source themselves.
const MAX_SOURCE_DEPTH: usize = 16;

pub struct SourceCommand;

impl SourceCommand {
    fn run_file(content: &str, ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let mut outputs = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let output = evaluate_with(ctx.registry, ctx.session, line, ctx.highlighter)
                .map_err(|failure| {
                    CommandError::ExecutionError(format!("line {}: {failure}", number + 1))
                })?;
            if !output.is_empty() {
                outputs.push(output);
            }

            if !ctx.session.is_running() {
                break;
            }
        }

        Ok(outputs.join("\n"))
    }
}

impl Command for SourceCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let Some(file) = args.first() else {
            return Err(CommandError::usage(self.usage()));
        };

        if ctx.session.source_depth >= MAX_SOURCE_DEPTH {
            return Err(CommandError::ExecutionError(format!(
                "{file}: maximum nesting depth exceeded"
            )));
        }

        let path = ctx.resolve(file);
        let content = fs::read_to_string(&path).map_err(|e| {
            CommandError::ExecutionError(format!("{file}: {}", super::describe_io(&e)))
        })?;
        debug!(path = %path, "sourcing file");

        ctx.session.source_depth += 1;
        let result = Self::run_file(&content, ctx);
        ctx.session.source_depth -= 1;
        result
    }

    fn usage(&self) -> &'static str {
        "source FILE"
    }
}
