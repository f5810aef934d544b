use std::collections::{BTreeMap, HashSet};
use std::env;

use super::EnvError;

pub(crate) const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Session-owned environment. Host commands receive exactly this set of
/// variables; the process environment is only read once at startup.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_process() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        validate_name(name)?;

        let clean_value = if name == "PATH" {
            sanitize_path(value)
        } else {
            value.to_string()
        };

        self.vars.insert(name.to_string(), clean_value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), EnvError> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err(EnvError::EmptyName),
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                Ok(())
            } else {
                Err(EnvError::InvalidName(name.to_string()))
            }
        }
        Some(_) => Err(EnvError::InvalidName(name.to_string())),
    }
}

fn sanitize_path(path: &str) -> String {
    let mut seen = HashSet::new();
    path.split(PATH_SEPARATOR)
        .filter(|part| !part.is_empty())
        .filter(|part| seen.insert(*part))
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() -> Result<(), EnvError> {
        let mut environment = Environment::new();
        environment.set("TEST_VAR", "test value")?;
        assert_eq!(environment.get("TEST_VAR"), Some("test value"));
        Ok(())
    }

    #[test]
    fn test_set_does_not_touch_process_env() -> Result<(), EnvError> {
        let mut environment = Environment::new();
        environment.set("WINUX_SESSION_ONLY_VAR", "1")?;
        assert!(env::var("WINUX_SESSION_ONLY_VAR").is_err());
        Ok(())
    }

    #[test]
    fn test_sanitize_path() {
        let joined = ["/usr/bin", "/usr/local/bin", "", "/usr/bin"].join(&PATH_SEPARATOR.to_string());
        let expected = ["/usr/bin", "/usr/local/bin"].join(&PATH_SEPARATOR.to_string());
        assert_eq!(sanitize_path(&joined), expected);
    }

    #[test]
    fn test_invalid_var_name() {
        let mut environment = Environment::new();
        assert_eq!(environment.set("", "value"), Err(EnvError::EmptyName));
        assert!(matches!(environment.set("1ABC", "x"), Err(EnvError::InvalidName(_))));
        assert!(matches!(environment.set("A-B", "x"), Err(EnvError::InvalidName(_))));
    }

    #[test]
    fn test_remove() -> Result<(), EnvError> {
        let mut environment = Environment::new();
        environment.set("GONE", "soon")?;
        assert_eq!(environment.remove("GONE").as_deref(), Some("soon"));
        assert!(!environment.contains("GONE"));
        Ok(())
    }

    #[test]
    fn test_iter_sorted() -> Result<(), EnvError> {
        let mut environment = Environment::new();
        environment.set("B", "2")?;
        environment.set("A", "1")?;
        let names: Vec<_> = environment.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["A", "B"]);
        Ok(())
    }
}
