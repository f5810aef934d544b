use std::fs;

use rustyline::completion::Pair;

use crate::path::PathTranslator;

#[derive(Clone)]
pub struct PathCompleter {
    translator: PathTranslator,
    cwd: String,
}

impl PathCompleter {
    pub fn new(translator: PathTranslator, cwd: impl Into<String>) -> Self {
        Self {
            translator,
            cwd: cwd.into(),
        }
    }

    pub fn update(&mut self, translator: &PathTranslator, cwd: &str) {
        self.translator = translator.clone();
        cwd.clone_into(&mut self.cwd);
    }

    fn parse_path_input(incomplete: &str) -> (&str, &str) {
        match incomplete.rfind('/') {
            Some(index) => incomplete.split_at(index + 1),
            None => ("", incomplete),
        }
    }

    pub fn complete_path(&self, incomplete: &str) -> Vec<Pair> {
        let (typed_dir, prefix) = Self::parse_path_input(incomplete);
        let native_dir = self.translator.to_native(typed_dir, &self.cwd);

        let Ok(entries) = fs::read_dir(&native_dir) else {
            return Vec::new();
        };

        let mut matches: Vec<Pair> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !name.starts_with(prefix) || (prefix.is_empty() && name.starts_with('.')) {
                    return None;
                }
                Some(Self::create_completion_pair(typed_dir, &name, entry.path().is_dir()))
            })
            .collect();

        matches.sort_by(|a, b| a.display.cmp(&b.display));
        matches
    }

    fn create_completion_pair(typed_dir: &str, name: &str, is_dir: bool) -> Pair {
        let full = format!("{typed_dir}{name}");
        if is_dir {
            Pair {
                display: format!("{name}/"),
                replacement: format!("{full}/"),
            }
        } else {
            Pair {
                display: name.to_string(),
                replacement: format!("{full} "),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathExpander, PathStyle};

    fn completer_in(dir: &tempfile::TempDir) -> PathCompleter {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        PathCompleter::new(translator, dir.path().to_string_lossy())
    }

    #[test]
    fn test_complete_in_cwd() -> Result<(), std::io::Error> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("docs"))?;
        fs::write(dir.path().join("draft.txt"), "")?;
        fs::write(dir.path().join(".dotfile"), "")?;

        let replacements: Vec<String> = completer_in(&dir)
            .complete_path("d")
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(replacements, vec!["docs/", "draft.txt "]);

        let all = completer_in(&dir).complete_path("");
        assert!(all.iter().all(|pair| !pair.display.starts_with('.')));
        Ok(())
    }

    #[test]
    fn test_complete_nested_keeps_typed_prefix() -> Result<(), std::io::Error> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("docs/guide"))?;

        let matches = completer_in(&dir).complete_path("docs/g");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].replacement, "docs/guide/");
        assert_eq!(matches[0].display, "guide/");
        Ok(())
    }

    #[test]
    fn test_missing_directory() -> Result<(), std::io::Error> {
        let dir = tempfile::tempdir()?;
        assert!(completer_in(&dir).complete_path("nowhere/x").is_empty());
        Ok(())
    }
}
