use std::fs;
use std::io;

use tracing::{debug, warn};

use super::{ConfigError, ConfigPaths};
use crate::core::commands::CommandRegistry;
use crate::core::state::Session;
use crate::shell::evaluate;

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    /// Returns whatever the rc lines printed. A missing file is not an
    /// error; a failing line is logged and skipped.
    pub fn load(
        &self,
        registry: &CommandRegistry,
        session: &mut Session,
    ) -> Result<String, ConfigError> {
        let path = &self.paths.rc_path;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no rc file");
                return Ok(String::new());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };
        debug!(path = %path.display(), "loading rc file");

        let mut outputs = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if let Some(output) = self.process_line(number + 1, line, registry, session) {
                outputs.push(output);
            }
            if !session.is_running() {
                break;
            }
        }
        Ok(outputs.join("\n"))
    }

    fn process_line(
        &self,
        number: usize,
        line: &str,
        registry: &CommandRegistry,
        session: &mut Session,
    ) -> Option<String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        match evaluate(registry, session, line) {
            Ok(output) if output.is_empty() => None,
            Ok(output) => Some(output),
            Err(failure) => {
                warn!(
                    path = %self.paths.rc_path.display(),
                    line = number,
                    error = %failure,
                    "rc line failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathExpander, PathStyle, PathTranslator};

    fn session() -> Session {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        Session::with_cwd("/", translator)
    }

    #[test]
    fn test_rc_configures_session() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let rc = dir.path().join(".winuxrc");
        fs::write(
            &rc,
            "# settings\nalias gs='git status'\nexport EDITOR=vim\ncd /definitely/missing\necho ready\n",
        )?;

        let paths = ConfigPaths::with_rc(&rc);
        let registry = CommandRegistry::with_builtins();
        let mut session = session();
        let output = ConfigLoader::new(&paths).load(&registry, &mut session)?;

        assert_eq!(output, "ready");
        assert_eq!(session.aliases.lookup("gs"), Some("git status"));
        assert_eq!(session.env.get("EDITOR"), Some("vim"));
        assert_eq!(session.cwd, "/");
        assert!(session.history.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_rc_is_fine() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let paths = ConfigPaths::with_rc(dir.path().join("absent"));
        let registry = CommandRegistry::with_builtins();
        let mut session = session();
        assert_eq!(ConfigLoader::new(&paths).load(&registry, &mut session)?, "");
        Ok(())
    }

    #[test]
    fn test_unreadable_rc_is_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        // A directory cannot be read as a file.
        let paths = ConfigPaths::with_rc(dir.path());
        let registry = CommandRegistry::with_builtins();
        let mut session = session();
        let result = ConfigLoader::new(&paths).load(&registry, &mut session);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
        Ok(())
    }
}
