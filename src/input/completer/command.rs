use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;

use rustyline::completion::Pair;

#[derive(Clone, Default)]
pub struct CommandCompleter {
    commands: BTreeSet<String>,
    path_commands: BTreeSet<String>,
    aliases: BTreeMap<String, String>,
    scanned_path: Option<String>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_builtins(&mut self, names: Vec<String>) {
        self.commands = names.into_iter().collect();
    }

    pub fn update_aliases<'a>(&mut self, aliases: impl Iterator<Item = (&'a str, &'a str)>) {
        self.aliases = aliases
            .map(|(name, replacement)| (name.to_string(), replacement.to_string()))
            .collect();
    }

    pub fn update_path(&mut self, path_var: Option<&str>) {
        if self.scanned_path.as_deref() == path_var {
            return;
        }
        self.scanned_path = path_var.map(str::to_string);
        self.path_commands.clear();

        let Some(path_var) = path_var else {
            return;
        };
        for dir in env::split_paths(path_var) {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.filter_map(Result::ok) {
                let is_candidate = entry
                    .file_type()
                    .map(|kind| kind.is_file() || kind.is_symlink())
                    .unwrap_or(false);
                if let (true, Some(name)) = (is_candidate, entry.file_name().to_str()) {
                    self.path_commands.insert(name.to_string());
                }
            }
        }
    }

    pub fn complete_command(&self, input: &str) -> Vec<Pair> {
        let input = input.trim();
        let mut matches: Vec<Pair> = self
            .commands
            .iter()
            .chain(self.path_commands.difference(&self.commands))
            .filter(|name| name.starts_with(input))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{name} "),
            })
            .collect();

        matches.extend(
            self.aliases
                .keys()
                .filter(|alias| alias.starts_with(input))
                .map(|alias| Pair {
                    display: format!("{alias} (alias)"),
                    replacement: format!("{alias} "),
                }),
        );
        matches
    }
}
