use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Simple(&'a str),
    Pipe(Vec<&'a str>),
    Redirect {
        command: &'a str,
        target: &'a str,
        mode: RedirectMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid redirection syntax")]
    InvalidRedirect,
    #[error("syntax error near unexpected token `|'")]
    EmptyPipeSegment,
}

pub fn classify(line: &str) -> Result<Route<'_>, RouteError> {
    if !line.contains('|') {
        return classify_redirect(line);
    }

    let segments: Vec<&str> = line.split('|').map(str::trim).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(RouteError::EmptyPipeSegment);
    }
    Ok(Route::Pipe(segments))
}

/// `>>` wins over `>`. The split must give exactly one command and one
/// target, both non-empty.
pub fn classify_redirect(segment: &str) -> Result<Route<'_>, RouteError> {
    let (operator, mode) = if segment.contains(">>") {
        (">>", RedirectMode::Append)
    } else if segment.contains('>') {
        (">", RedirectMode::Truncate)
    } else {
        return Ok(Route::Simple(segment.trim()));
    };

    let parts: Vec<&str> = segment.split(operator).map(str::trim).collect();
    match parts.as_slice() {
        [command, target]
            if !command.is_empty() && !target.is_empty() && !target.contains('>') =>
        {
            Ok(Route::Redirect {
                command,
                target,
                mode,
            })
        }
        _ => Err(RouteError::InvalidRedirect),
    }
}

/// Writes `text` plus one newline to `path`.
pub fn write_redirect(path: &Path, text: &str, mode: RedirectMode) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };

    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    file.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_simple() {
        assert_eq!(classify("  ls -la "), Ok(Route::Simple("ls -la")));
    }

    #[test]
    fn test_pipe_segments() {
        assert_eq!(
            classify("cat a.txt | grep x |wc -l"),
            Ok(Route::Pipe(vec!["cat a.txt", "grep x", "wc -l"]))
        );
        assert_eq!(classify("ls |"), Err(RouteError::EmptyPipeSegment));
        assert_eq!(classify("| ls"), Err(RouteError::EmptyPipeSegment));
    }

    #[test]
    fn test_pipe_wins_over_redirect() {
        assert_eq!(
            classify("ls | sort > out.txt"),
            Ok(Route::Pipe(vec!["ls", "sort > out.txt"]))
        );
    }

    #[test]
    fn test_redirect_modes() {
        assert_eq!(
            classify("echo hi > out.txt"),
            Ok(Route::Redirect {
                command: "echo hi",
                target: "out.txt",
                mode: RedirectMode::Truncate
            })
        );
        assert_eq!(
            classify("echo hi>>log"),
            Ok(Route::Redirect {
                command: "echo hi",
                target: "log",
                mode: RedirectMode::Append
            })
        );
    }

    #[test]
    fn test_invalid_redirects() {
        for line in ["> out", "echo hi >", "echo a > b > c", "echo >> a >> b", "echo >> a > b"] {
            assert_eq!(classify(line), Err(RouteError::InvalidRedirect), "{line}");
        }
        assert_eq!(
            RouteError::InvalidRedirect.to_string(),
            "Invalid redirection syntax"
        );
    }

    #[test]
    fn test_write_redirect() -> Result<(), io::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");

        write_redirect(&path, "first", RedirectMode::Truncate)?;
        write_redirect(&path, "second", RedirectMode::Truncate)?;
        assert_eq!(fs::read_to_string(&path)?, "second\n");

        write_redirect(&path, "third", RedirectMode::Append)?;
        assert_eq!(fs::read_to_string(&path)?, "second\nthird\n");
        Ok(())
    }
}
