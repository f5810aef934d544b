use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use super::router::{self, RedirectMode, Route};
use crate::core::commands::{describe_io, CommandRegistry, Failure};
use crate::core::config::{ConfigError, ConfigLoader, ConfigPaths};
use crate::core::state::Session;
use crate::core::tokenizer::{tokenize, tokenize_with, Tokens};
use crate::highlight::SyntaxHighlighter;

pub struct Interpreter {
    registry: CommandRegistry,
    session: Session,
}

impl Interpreter {
    pub fn new(session: Session) -> Self {
        Self::with_registry(CommandRegistry::with_builtins(), session)
    }

    pub fn with_registry(registry: CommandRegistry, session: Session) -> Self {
        Self { registry, session }
    }

    /// Runs one input line. Blank and comment lines are ignored; everything
    /// else enters history first. Returns what should be printed, with a
    /// failure rendered as a single error line.
    pub fn execute(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        self.session.history.add(line);
        match evaluate(&self.registry, &mut self.session, line) {
            Ok(output) if output.is_empty() => None,
            Ok(output) => Some(output),
            Err(failure) => Some(failure.render(&self.session.highlighter)),
        }
    }

    pub fn load_rc(&mut self, paths: &ConfigPaths) -> Result<String, ConfigError> {
        ConfigLoader::new(paths).load(&self.registry, &mut self.session)
    }

    /// End of input: takes the `exit` path without recording it in history.
    pub fn shutdown(&mut self) -> Option<String> {
        let tokens = tokenize("exit");
        let highlighter = self.session.highlighter;
        let output = match self
            .registry
            .dispatch(&mut self.session, &tokens, "exit", None, highlighter)
        {
            Ok(output) => output,
            Err(failure) => failure.render(&self.session.highlighter),
        };
        self.session.terminate();
        (!output.is_empty()).then_some(output)
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

/// Routes and runs `line` without touching history. Shared by the
/// interactive loop, `source` and the rc loader.
pub fn evaluate(
    registry: &CommandRegistry,
    session: &mut Session,
    line: &str,
) -> Result<String, Failure> {
    let highlighter = session.highlighter;
    evaluate_with(registry, session, line, highlighter)
}

pub fn evaluate_with(
    registry: &CommandRegistry,
    session: &mut Session,
    line: &str,
    highlighter: SyntaxHighlighter,
) -> Result<String, Failure> {
    let expanded = expand_alias(session, line);
    // Segments that came out of the replacement are not expanded again.
    let replaced = 1 + expanded.matches('|').count().saturating_sub(line.matches('|').count());
    match router::classify(&expanded).map_err(|e| Failure::syntax(e.to_string()))? {
        Route::Pipe(segments) => run_pipeline(registry, session, &segments, replaced, highlighter),
        route => run_route(registry, session, route, None, highlighter),
    }
}

fn expand_alias<'a>(session: &Session, text: &'a str) -> Cow<'a, str> {
    let expanded = session.aliases.expand(text);
    if let Cow::Owned(result) = &expanded {
        debug!(text, expanded = %result, "alias expanded");
    }
    expanded
}

fn run_route(
    registry: &CommandRegistry,
    session: &mut Session,
    route: Route<'_>,
    input: Option<&str>,
    highlighter: SyntaxHighlighter,
) -> Result<String, Failure> {
    match route {
        Route::Simple(segment) => run_segment(registry, session, segment, input, highlighter),
        Route::Redirect {
            command,
            target,
            mode,
        } => run_redirect(registry, session, command, target, mode, input),
        Route::Pipe(segments) => run_pipeline(registry, session, &segments, 1, highlighter),
    }
}

/// Feeds each segment's output to the next one and stops at the first
/// failure. Only the last stage is painted. The first `expanded` segments
/// have already been through alias expansion.
fn run_pipeline(
    registry: &CommandRegistry,
    session: &mut Session,
    segments: &[&str],
    expanded: usize,
    highlighter: SyntaxHighlighter,
) -> Result<String, Failure> {
    debug!(stages = segments.len(), "running pipeline");

    let mut carried: Option<String> = None;
    let mut output = String::new();
    for (index, &segment) in segments.iter().enumerate() {
        let segment = if index < expanded {
            Cow::Borrowed(segment)
        } else {
            expand_alias(session, segment)
        };
        let route =
            router::classify_redirect(&segment).map_err(|e| Failure::syntax(e.to_string()))?;
        let stage_highlighter = if index + 1 == segments.len() {
            highlighter
        } else {
            SyntaxHighlighter::plain()
        };
        output = run_route(registry, session, route, carried.as_deref(), stage_highlighter)?;
        carried = Some(if output.is_empty() {
            String::new()
        } else {
            format!("{output}\n")
        });
    }
    Ok(output)
}

fn run_segment(
    registry: &CommandRegistry,
    session: &mut Session,
    segment: &str,
    input: Option<&str>,
    highlighter: SyntaxHighlighter,
) -> Result<String, Failure> {
    let tokens = expand_tokens(session, segment);
    registry.dispatch(session, &tokens, segment, input, highlighter)
}

fn expand_tokens(session: &Session, text: &str) -> Tokens {
    let env = &session.env;
    tokenize_with(text, |name| env.get(name).map(str::to_string))
}

/// Runs the left command and writes its output to the target. The file is
/// left alone when the command fails.
fn run_redirect(
    registry: &CommandRegistry,
    session: &mut Session,
    command: &str,
    target: &str,
    mode: RedirectMode,
    input: Option<&str>,
) -> Result<String, Failure> {
    let target_tokens = expand_tokens(session, target);
    if target_tokens.is_empty() {
        return Err(Failure::syntax(router::RouteError::InvalidRedirect.to_string()));
    }

    let output = run_segment(registry, session, command, input, SyntaxHighlighter::plain())?;

    let path = session.resolve(&target_tokens.command);
    debug!(path = %path, ?mode, "redirecting output");
    router::write_redirect(Path::new(&path), &output, mode)
        .map_err(|e| Failure::shell(format!("{target}: {}", describe_io(&e))))?;
    Ok(String::new())
}
