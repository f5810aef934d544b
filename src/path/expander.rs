use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct PathExpander {
    home: Option<String>,
}

impl Default for PathExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl PathExpander {
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
        }
    }

    pub fn with_home(home: impl Into<String>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    pub fn expand<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let Some(home) = self.home.as_deref() else {
            return Cow::Borrowed(path);
        };

        match path.strip_prefix('~') {
            Some("") => Cow::Owned(home.to_string()),
            // "~user/..." is left alone
            Some(rest) if rest.starts_with(['/', '\\']) => Cow::Owned(format!("{home}{rest}")),
            _ => Cow::Borrowed(path),
        }
    }

    pub fn home_dir(&self) -> Option<&str> {
        self.home.as_deref()
    }
}
