//! Mapping between the shell's virtual (Unix-style) path namespace and the
//! host's native paths.
//!
//! Translation is purely lexical: it never touches the file system and it
//! never fails. Input that does not parse as a drive path degrades to an
//! ordinary relative or absolute path.

use super::PathExpander;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Windows,
    Posix,
}

impl PathStyle {
    pub fn host() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    pub fn separator(self) -> char {
        match self {
            PathStyle::Windows => '\\',
            PathStyle::Posix => '/',
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathTranslator {
    style: PathStyle,
    expander: PathExpander,
}

impl PathTranslator {
    pub fn new(style: PathStyle, expander: PathExpander) -> Self {
        Self { style, expander }
    }

    pub fn host() -> Self {
        Self::new(PathStyle::host(), PathExpander::new())
    }

    pub fn home(&self) -> Option<&str> {
        self.expander.home_dir()
    }

    pub fn to_native(&self, path: &str, cwd: &str) -> String {
        if path.is_empty() {
            return cwd.to_string();
        }

        let expanded = self.expander.expand(path);
        match self.style {
            PathStyle::Windows => windows_to_native(&expanded, cwd),
            PathStyle::Posix => {
                if expanded.starts_with('/') || cwd.is_empty() {
                    lexical_normalize(&expanded, PathStyle::Posix)
                } else {
                    lexical_normalize(&format!("{cwd}/{expanded}"), PathStyle::Posix)
                }
            }
        }
    }

    /// Native path to virtual path. Only drive-letter paths are invertible;
    /// everything else just has its separators swapped.
    pub fn to_virtual(&self, native: &str, cwd: &str) -> String {
        let native = if native.is_empty() { cwd } else { native };

        match self.style {
            PathStyle::Windows => windows_to_virtual(native),
            PathStyle::Posix => native.to_string(),
        }
    }

    pub fn display_path(&self, native: &str) -> String {
        let virtual_path = self.to_virtual(native, native);
        let Some(home) = self.home() else {
            return virtual_path;
        };

        let home = self.to_virtual(home, home);
        if virtual_path == home {
            return "~".to_string();
        }
        match virtual_path.strip_prefix(&home) {
            Some(rest) if rest.starts_with('/') && home != "/" => format!("~{rest}"),
            _ => virtual_path,
        }
    }
}

/// Splits `/x`, `/x/rest`, `/mnt/x` and `/mnt/x/rest` into the drive letter
/// and the remainder (which is empty or starts with `/`).
fn split_virtual_drive(path: &str) -> Option<(char, &str)> {
    fn drive(after_slash: &str) -> Option<(char, &str)> {
        let mut chars = after_slash.chars();
        let letter = chars.next().filter(char::is_ascii_alphabetic)?;
        let rest = chars.as_str();
        (rest.is_empty() || rest.starts_with('/')).then_some((letter, rest))
    }

    let after_slash = path.strip_prefix('/')?;
    drive(after_slash).or_else(|| drive(after_slash.strip_prefix("mnt/")?))
}

fn native_drive(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    (chars.next() == Some(':')).then_some(letter)
}

fn windows_to_native(path: &str, cwd: &str) -> String {
    let native = match split_virtual_drive(path) {
        Some((letter, rest)) => format!("{}:\\{}", letter.to_ascii_uppercase(), rest.replace('/', "\\")),
        None => path.replace('/', "\\"),
    };

    let absolute = if native_drive(&native).is_some() || native.starts_with("\\\\") {
        native
    } else if native.starts_with('\\') {
        match native_drive(cwd) {
            Some(letter) => format!("{}:{}", letter.to_ascii_uppercase(), native),
            None => native,
        }
    } else if cwd.is_empty() {
        native
    } else {
        format!("{cwd}\\{native}")
    };

    lexical_normalize(&absolute, PathStyle::Windows)
}

fn windows_to_virtual(native: &str) -> String {
    if let Some(letter) = native_drive(native) {
        let rest = &native[2..];
        if rest.is_empty() || rest.starts_with('\\') {
            let rest = rest.trim_start_matches('\\').replace('\\', "/");
            let letter = letter.to_ascii_lowercase();
            return if rest.is_empty() {
                format!("/{letter}")
            } else {
                format!("/{letter}/{rest}")
            };
        }
    }
    native.replace('\\', "/")
}

fn split_root(path: &str, style: PathStyle) -> (String, &str) {
    match style {
        PathStyle::Posix => match path.strip_prefix('/') {
            Some(rest) => ("/".to_string(), rest),
            None => (String::new(), path),
        },
        PathStyle::Windows => {
            if let Some(letter) = native_drive(path) {
                let root = format!("{}:\\", letter.to_ascii_uppercase());
                return (root, path[2..].trim_start_matches('\\'));
            }
            if let Some(unc) = path.strip_prefix("\\\\") {
                let mut parts = unc.splitn(3, '\\');
                let server = parts.next().unwrap_or_default();
                let share = parts.next().unwrap_or_default();
                let rest = parts.next().unwrap_or_default();
                return (format!("\\\\{server}\\{share}\\"), rest);
            }
            match path.strip_prefix('\\') {
                Some(rest) => ("\\".to_string(), rest),
                None => (String::new(), path),
            }
        }
    }
}

/// Resolves `.` and `..` segments and collapses repeated separators without
/// consulting the file system. `..` never climbs above a root.
pub fn lexical_normalize(path: &str, style: PathStyle) -> String {
    let sep = style.separator();
    let (root, rest) = split_root(path, style);

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split(sep) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if root.is_empty() => parts.push(".."),
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join(&sep.to_string());
    if root.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        format!("{root}{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CWD: &str = "C:\\Users\\test\\work";

    fn windows() -> PathTranslator {
        PathTranslator::new(PathStyle::Windows, PathExpander::with_home("C:\\Users\\test"))
    }

    fn posix() -> PathTranslator {
        PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"))
    }

    #[test]
    fn test_empty_maps_to_cwd() {
        assert_eq!(windows().to_native("", CWD), CWD);
        assert_eq!(windows().to_virtual("", CWD), "/c/Users/test/work");
    }

    #[test]
    fn test_drive_forms() {
        let t = windows();
        assert_eq!(t.to_native("/c/Users/test", CWD), "C:\\Users\\test");
        assert_eq!(t.to_native("/d", CWD), "D:\\");
        assert_eq!(t.to_native("/mnt/e/data/x.txt", CWD), "E:\\data\\x.txt");
        assert_eq!(t.to_native("/mnt/c", CWD), "C:\\");
    }

    #[test]
    fn test_tilde_expansion() {
        let t = windows();
        assert_eq!(t.to_native("~", CWD), "C:\\Users\\test");
        assert_eq!(t.to_native("~/docs/a.txt", CWD), "C:\\Users\\test\\docs\\a.txt");
    }

    #[test]
    fn test_relative_joins_cwd() {
        let t = windows();
        assert_eq!(t.to_native("notes/a.txt", CWD), "C:\\Users\\test\\work\\notes\\a.txt");
        assert_eq!(t.to_native("..", CWD), "C:\\Users\\test");
        assert_eq!(t.to_native("./x/../y", CWD), "C:\\Users\\test\\work\\y");
    }

    #[test]
    fn test_rooted_path_uses_cwd_drive() {
        let t = windows();
        assert_eq!(t.to_native("\\Windows", "D:\\games"), "D:\\Windows");
    }

    #[test]
    fn test_dotdot_stops_at_root() {
        let t = windows();
        assert_eq!(t.to_native("/c/../../x", CWD), "C:\\x");
    }

    #[test]
    fn test_malformed_drive_is_literal() {
        let t = windows();
        assert_eq!(t.to_native("/cd/foo", CWD), "C:\\cd\\foo");
        assert_eq!(t.to_native("1/foo", CWD), "C:\\Users\\test\\work\\1\\foo");
    }

    #[test]
    fn test_to_virtual() {
        let t = windows();
        assert_eq!(t.to_virtual("C:\\Users\\test", CWD), "/c/Users/test");
        assert_eq!(t.to_virtual("D:\\", CWD), "/d");
        assert_eq!(t.to_virtual("\\\\server\\share\\x", CWD), "//server/share/x");
    }

    #[test]
    fn test_native_round_trip() {
        let t = windows();
        for native in [
            "C:\\Users\\test",
            "c:\\Users\\..\\Windows\\System32",
            "D:\\",
            "E:\\a\\.\\b\\\\c\\",
        ] {
            let expected = lexical_normalize(native, PathStyle::Windows);
            assert_eq!(t.to_native(&t.to_virtual(native, CWD), CWD), expected, "{native}");
        }
    }

    #[test]
    fn test_virtual_round_trip() {
        let t = windows();
        for virtual_path in ["/c/Users/test", "/d", "/x/a/./b/../c", "/e/data//files/"] {
            let expected = lexical_normalize(virtual_path, PathStyle::Posix);
            assert_eq!(t.to_virtual(&t.to_native(virtual_path, CWD), CWD), expected, "{virtual_path}");
        }
    }

    #[test]
    fn test_posix_style() {
        let t = posix();
        assert_eq!(t.to_native("docs", "/home/test"), "/home/test/docs");
        assert_eq!(t.to_native("~/x/../y", "/tmp"), "/home/test/y");
        assert_eq!(t.to_native("/c/Users", "/tmp"), "/c/Users");
        assert_eq!(t.to_virtual("/var/log", "/tmp"), "/var/log");
    }

    #[test]
    fn test_display_path_shortens_home() {
        let t = windows();
        assert_eq!(t.display_path("C:\\Users\\test"), "~");
        assert_eq!(t.display_path("C:\\Users\\test\\work"), "~/work");
        assert_eq!(t.display_path("C:\\Users\\tester"), "/c/Users/tester");
        assert_eq!(posix().display_path("/home/test/src"), "~/src");
    }

    #[test]
    fn test_lexical_normalize_relative() {
        assert_eq!(lexical_normalize("a/../../b", PathStyle::Posix), "../b");
        assert_eq!(lexical_normalize("./", PathStyle::Posix), ".");
        assert_eq!(lexical_normalize("/", PathStyle::Posix), "/");
    }
}
