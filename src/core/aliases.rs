use std::borrow::Cow;

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("ll", "ls -la"),
    ("la", "ls -a"),
    ("l", "ls -CF"),
    ("..", "cd .."),
    ("...", "cd ../.."),
    ("cls", "clear"),
    ("md", "mkdir"),
    ("rd", "rmdir"),
    ("del", "rm"),
    ("copy", "cp"),
    ("move", "mv"),
    ("type", "cat"),
    ("dir", "ls -la"),
];

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (name, replacement) in DEFAULT_ALIASES {
            table.set(name, replacement);
        }
        table
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, replacement)| replacement.as_str())
    }

    /// Redefining an alias keeps its original position.
    pub fn set(&mut self, name: &str, replacement: &str) {
        match self.entries.iter_mut().find(|(alias, _)| alias == name) {
            Some(entry) => entry.1 = replacement.to_string(),
            None => self.entries.push((name.to_string(), replacement.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(alias, _)| alias == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn list_all(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, replacement)| (name.as_str(), replacement.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the first word of `line` with its alias. The replacement is
    /// not scanned again, so self-referencing or cyclic aliases terminate.
    pub fn expand<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let trimmed = line.trim();
        let (first, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim_start()),
            None => (trimmed, ""),
        };

        match self.lookup(first) {
            Some(replacement) if rest.is_empty() => Cow::Owned(replacement.to_string()),
            Some(replacement) => Cow::Owned(format!("{replacement} {rest}")),
            None => Cow::Borrowed(line),
        }
    }
}
