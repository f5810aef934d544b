use std::borrow::Cow;

use rustyline::{
    completion::{Completer, Pair},
    highlight::{CmdKind, Highlighter},
    hint::Hinter,
    validate::Validator,
    Context, Helper,
};

use super::{command::CommandCompleter, path::PathCompleter};
use crate::core::commands::CommandRegistry;
use crate::core::state::Session;
use crate::highlight::SyntaxHighlighter;

#[derive(Clone)]
pub struct ShellCompleter {
    command_completer: CommandCompleter,
    path_completer: PathCompleter,
    highlighter: SyntaxHighlighter,
}

impl ShellCompleter {
    pub fn new(session: &Session) -> Self {
        Self {
            command_completer: CommandCompleter::new(),
            path_completer: PathCompleter::new(session.translator.clone(), session.cwd.clone()),
            highlighter: session.highlighter,
        }
    }

    pub fn refresh(&mut self, registry: &CommandRegistry, session: &Session) {
        self.command_completer.update_builtins(registry.names());
        self.command_completer.update_aliases(session.aliases.list_all());
        self.command_completer.update_path(session.env.get("PATH"));
        self.path_completer.update(&session.translator, &session.cwd);
        self.highlighter = session.highlighter;
    }
}

impl Helper for ShellCompleter {}

impl Highlighter for ShellCompleter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(self.highlighter.highlight_command(line))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(self.highlighter.highlight_prompt(prompt))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(self.highlighter.highlight_hint(hint))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        !self.highlighter.is_plain()
    }
}

impl Hinter for ShellCompleter {
    type Hint = String;
}

impl Validator for ShellCompleter {}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, word, is_first_word) = completion_target(&line[..pos]);
        let matches = if is_first_word {
            self.command_completer.complete_command(word)
        } else {
            self.path_completer.complete_path(word)
        };

        Ok((start, matches))
    }
}

fn completion_target(line_up_to_cursor: &str) -> (usize, &str, bool) {
    let segment_start = line_up_to_cursor.rfind('|').map_or(0, |index| index + 1);
    let segment = &line_up_to_cursor[segment_start..];

    let word_start = segment.rfind([' ', '\t']).map_or(0, |index| index + 1);
    let is_first_word = segment[..word_start].trim().is_empty();
    (segment_start + word_start, &segment[word_start..], is_first_word)
}
