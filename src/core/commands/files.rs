use std::fs::{self, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::options::Options;
use super::{describe_io, Command, CommandError, Context};

fn missing_operand(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("missing operand (usage: {usage})"))
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> u32 {
    let base = if meta.permissions().readonly() { 0o444 } else { 0o644 };
    if meta.is_dir() {
        base | 0o111
    } else {
        base
    }
}

#[cfg(unix)]
fn link_count(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.nlink()
}

#[cfg(not(unix))]
fn link_count(_meta: &Metadata) -> u64 {
    1
}

fn format_mode(meta: &Metadata) -> String {
    let mode = permission_bits(meta);
    let mut text = String::with_capacity(10);
    text.push(if meta.is_dir() { 'd' } else { '-' });
    for (bit, symbol) in [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ] {
        text.push(if mode & bit != 0 { symbol } else { '-' });
    }
    text
}

pub(crate) fn human_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];
    if size < 1024 {
        return format!("{size}B");
    }
    let mut value = size as f64 / 1024.0;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}P")
}

fn format_mtime(meta: &Metadata) -> String {
    match meta.modified() {
        Ok(time) => DateTime::<Local>::from(time).format("%b %d %H:%M").to_string(),
        Err(_) => "?".repeat(12),
    }
}

pub struct ListCommand {
    long: bool,
    all: bool,
}

impl ListCommand {
    pub fn new() -> Self {
        Self {
            long: false,
            all: false,
        }
    }

    pub fn long() -> Self {
        Self {
            long: true,
            all: true,
        }
    }

    fn format_entry(
        ctx: &Context<'_>,
        name: &str,
        meta: &Metadata,
        long: bool,
        human: bool,
    ) -> String {
        let highlighter = &ctx.highlighter;
        let shown = if meta.is_dir() {
            format!("{}/", highlighter.highlight_directory(name))
        } else if permission_bits(meta) & 0o111 != 0 && cfg!(unix) {
            highlighter.highlight_executable(name)
        } else {
            name.to_string()
        };

        if !long {
            return shown;
        }

        let size = if human {
            human_size(meta.len())
        } else {
            meta.len().to_string()
        };
        format!(
            "{} {:>3} {:>8} {} {}",
            format_mode(meta),
            link_count(meta),
            size,
            format_mtime(meta),
            shown
        )
    }

    fn list_directory(
        ctx: &Context<'_>,
        dir: &Path,
        all: bool,
        long: bool,
        human: bool,
    ) -> io::Result<Vec<String>> {
        let mut entries: Vec<(String, Metadata)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !all && name.starts_with('.') {
                continue;
            }
            // Broken links still show up, described by the link itself.
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(_) => fs::symlink_metadata(entry.path())?,
            };
            entries.push((name, meta));
        }
        entries.sort_by_key(|(name, _)| name.to_lowercase());

        Ok(entries
            .iter()
            .map(|(name, meta)| Self::format_entry(ctx, name, meta, long, human))
            .collect())
    }
}

impl Default for ListCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ListCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "alhCF1")?;
        let all = self.all || options.has('a');
        let long = self.long || options.has('l');
        let human = options.has('h');

        let operands = if options.operands.is_empty() {
            vec!["."]
        } else {
            options.operands
        };

        let mut output = Vec::new();
        for operand in &operands {
            let path = ctx.resolve(operand);
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    output.push(ctx.error_line(
                        "ls",
                        &format!("cannot access '{operand}': {}", describe_io(&e)),
                    ));
                    continue;
                }
            };

            if !meta.is_dir() {
                output.push(Self::format_entry(ctx, operand, &meta, long, human));
                continue;
            }

            if operands.len() > 1 {
                output.push(format!("{operand}:"));
            }
            match Self::list_directory(ctx, Path::new(&path), all, long, human) {
                Ok(lines) => output.extend(lines),
                Err(e) => output.push(ctx.error_line(
                    "ls",
                    &format!("cannot open directory '{operand}': {}", describe_io(&e)),
                )),
            }
        }

        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "ls [-alh] [PATH ...]"
    }
}

pub struct MakeDirCommand;

impl Command for MakeDirCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "p")?;
        if options.operands.is_empty() {
            return Err(missing_operand(self.usage()));
        }
        let parents = options.has('p');

        let mut errors = Vec::new();
        for operand in &options.operands {
            let path = ctx.resolve(operand);
            let result = if parents {
                fs::create_dir_all(&path)
            } else {
                fs::create_dir(&path)
            };
            if let Err(e) = result {
                errors.push(ctx.error_line(
                    "mkdir",
                    &format!("cannot create directory '{operand}': {}", describe_io(&e)),
                ));
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "mkdir [-p] DIR ..."
    }
}

pub struct RemoveDirCommand;

impl Command for RemoveDirCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "")?;
        if options.operands.is_empty() {
            return Err(missing_operand(self.usage()));
        }

        let mut errors = Vec::new();
        for operand in &options.operands {
            if let Err(e) = fs::remove_dir(ctx.resolve(operand)) {
                errors.push(ctx.error_line(
                    "rmdir",
                    &format!("failed to remove '{operand}': {}", describe_io(&e)),
                ));
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "rmdir DIR ..."
    }
}

pub struct RemoveCommand;

impl Command for RemoveCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "rRf")?;
        let recursive = options.has('r') || options.has('R');
        let force = options.has('f');
        if options.operands.is_empty() && !force {
            return Err(missing_operand(self.usage()));
        }

        let mut errors = Vec::new();
        for operand in &options.operands {
            let path = ctx.resolve(operand);
            let result = match fs::symlink_metadata(&path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound && force => Ok(()),
                Err(e) => Err(describe_io(&e)),
                Ok(meta) if meta.is_dir() && !recursive => Err("Is a directory".to_string()),
                Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path).map_err(|e| describe_io(&e)),
                Ok(_) => fs::remove_file(&path).map_err(|e| describe_io(&e)),
            };
            if let Err(message) = result {
                if !force || message == "Is a directory" {
                    errors.push(
                        ctx.error_line("rm", &format!("cannot remove '{operand}': {message}")),
                    );
                }
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "rm [-rf] PATH ..."
    }
}

pub struct TouchCommand;

impl Command for TouchCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "")?;
        if options.operands.is_empty() {
            return Err(missing_operand(self.usage()));
        }

        let mut errors = Vec::new();
        for operand in &options.operands {
            let path = ctx.resolve(operand);
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .and_then(|file| file.set_modified(SystemTime::now()));
            if let Err(e) = result {
                errors.push(ctx.error_line(
                    "touch",
                    &format!("cannot touch '{operand}': {}", describe_io(&e)),
                ));
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "touch FILE ..."
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn sources_and_destination<'a>(
    operands: &[&'a str],
    ctx: &Context<'_>,
    usage: &str,
) -> Result<(Vec<&'a str>, PathBuf, bool), CommandError> {
    let Some((dest, sources)) = operands.split_last() else {
        return Err(missing_operand(usage));
    };
    if sources.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "missing destination file operand after '{dest}'"
        )));
    }

    let dest_path = PathBuf::from(ctx.resolve(dest));
    let dest_is_dir = dest_path.is_dir();
    if sources.len() > 1 && !dest_is_dir {
        return Err(CommandError::ExecutionError(format!(
            "target '{dest}' is not a directory"
        )));
    }
    Ok((sources.to_vec(), dest_path, dest_is_dir))
}

fn target_for(src: &Path, dest: &Path, dest_is_dir: bool) -> Result<PathBuf, String> {
    if !dest_is_dir {
        return Ok(dest.to_path_buf());
    }
    src.file_name()
        .map(|name| dest.join(name))
        .ok_or_else(|| "invalid source name".to_string())
}

pub struct CopyCommand;

impl CopyCommand {
    fn copy_one(src: &Path, target: &Path, recursive: bool, operand: &str) -> Result<(), String> {
        let meta = fs::metadata(src).map_err(|e| format!("cannot stat '{operand}': {}", describe_io(&e)))?;
        if !meta.is_dir() {
            return fs::copy(src, target).map(|_| ()).map_err(|e| describe_io(&e));
        }
        if !recursive {
            return Err(format!("-r not specified; omitting directory '{operand}'"));
        }
        if target.starts_with(src) {
            return Err(format!(
                "cannot copy a directory, '{operand}', into itself"
            ));
        }
        copy_dir_recursive(src, target).map_err(|e| describe_io(&e))
    }
}

impl Command for CopyCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "rR")?;
        let recursive = options.has('r') || options.has('R');
        let (sources, dest, dest_is_dir) =
            sources_and_destination(&options.operands, ctx, self.usage())?;

        let mut errors = Vec::new();
        for operand in sources {
            let src = PathBuf::from(ctx.resolve(operand));
            let result = target_for(&src, &dest, dest_is_dir)
                .and_then(|target| Self::copy_one(&src, &target, recursive, operand));
            if let Err(message) = result {
                errors.push(ctx.error_line("cp", &message));
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "cp [-r] SOURCE... DEST"
    }
}

pub struct MoveCommand;

impl MoveCommand {
    fn move_one(src: &Path, target: &Path, operand: &str) -> Result<(), String> {
        let meta = fs::symlink_metadata(src)
            .map_err(|e| format!("cannot stat '{operand}': {}", describe_io(&e)))?;
        match fs::rename(src, target) {
            Ok(()) => Ok(()),
            // Renames cannot cross file systems; files fall back to copy.
            Err(e) if meta.is_file() => {
                debug!(error = %e, "rename failed, copying instead");
                fs::copy(src, target)
                    .and_then(|_| fs::remove_file(src))
                    .map_err(|e| describe_io(&e))
            }
            Err(e) => Err(describe_io(&e)),
        }
    }
}

impl Command for MoveCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "f")?;
        let (sources, dest, dest_is_dir) =
            sources_and_destination(&options.operands, ctx, self.usage())?;

        let mut errors = Vec::new();
        for operand in sources {
            let src = PathBuf::from(ctx.resolve(operand));
            let result = target_for(&src, &dest, dest_is_dir)
                .and_then(|target| Self::move_one(&src, &target, operand));
            if let Err(message) = result {
                errors.push(ctx.error_line("mv", &message));
            }
        }
        Ok(errors.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "mv SOURCE... DEST"
    }
}

fn glob_to_regex(glob: &str, case_insensitive: bool) -> Result<Regex, CommandError> {
    let invalid = || CommandError::InvalidArguments(format!("invalid pattern '{glob}'"));

    let mut pattern = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            '[' => {
                pattern.push('[');
                if chars.next_if_eq(&'!').is_some() {
                    pattern.push('^');
                }
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if matches!(c, '\\' | '[' | '&' | '~') {
                        pattern.push('\\');
                    }
                    pattern.push(c);
                }
                if !closed {
                    return Err(invalid());
                }
                pattern.push(']');
            }
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');

    RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|_| invalid())
}

#[derive(Debug, Default)]
struct FindFilter {
    name: Option<Regex>,
    directories: Option<bool>,
    max_depth: Option<usize>,
}

impl FindFilter {
    fn matches(&self, name: &str, is_dir: bool) -> bool {
        self.directories.map_or(true, |wanted| wanted == is_dir)
            && self.name.as_ref().map_or(true, |regex| regex.is_match(name))
    }
}

pub struct FindCommand;

impl FindCommand {
    fn value<'a>(
        iter: &mut std::slice::Iter<'a, String>,
        predicate: &str,
    ) -> Result<&'a str, CommandError> {
        iter.next().map(String::as_str).ok_or_else(|| {
            CommandError::InvalidArguments(format!("missing argument to '{predicate}'"))
        })
    }

    fn parse(args: &[String]) -> Result<(Vec<&str>, FindFilter), CommandError> {
        let mut roots = Vec::new();
        let mut filter = FindFilter::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-name" => filter.name = Some(glob_to_regex(Self::value(&mut iter, arg)?, false)?),
                "-iname" => filter.name = Some(glob_to_regex(Self::value(&mut iter, arg)?, true)?),
                "-type" => {
                    filter.directories = match Self::value(&mut iter, arg)? {
                        "f" => Some(false),
                        "d" => Some(true),
                        other => {
                            return Err(CommandError::InvalidArguments(format!(
                                "unknown argument to -type: {other}"
                            )))
                        }
                    }
                }
                "-maxdepth" => {
                    let depth = Self::value(&mut iter, arg)?;
                    filter.max_depth = Some(depth.parse().map_err(|_| {
                        CommandError::InvalidArguments(format!("invalid depth '{depth}'"))
                    })?);
                }
                predicate if predicate.len() > 1 && predicate.starts_with('-') => {
                    return Err(CommandError::InvalidArguments(format!(
                        "unknown predicate '{predicate}'"
                    )))
                }
                root => roots.push(root),
            }
        }
        if roots.is_empty() {
            roots.push(".");
        }
        Ok((roots, filter))
    }

    /// `shown` is how `dir` is printed; children extend it with `/name`.
    fn walk(
        ctx: &Context<'_>,
        dir: &Path,
        shown: &str,
        depth: usize,
        filter: &FindFilter,
        output: &mut Vec<String>,
    ) {
        if filter.max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        let listing = fs::read_dir(dir).and_then(|entries| entries.collect::<io::Result<Vec<_>>>());
        let mut entries = match listing {
            Ok(entries) => entries,
            Err(e) => {
                output.push(ctx.error_line("find", &format!("'{shown}': {}", describe_io(&e))));
                return;
            }
        };
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = if shown.ends_with('/') {
                format!("{shown}{name}")
            } else {
                format!("{shown}/{name}")
            };
            // Symlinked directories are listed but not followed.
            let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
            if filter.matches(&name, is_dir) {
                output.push(child.clone());
            }
            if is_dir {
                Self::walk(ctx, &entry.path(), &child, depth + 1, filter, output);
            }
        }
    }
}

impl Command for FindCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let (roots, filter) = Self::parse(args)?;

        let mut output = Vec::new();
        for root in roots {
            let path = PathBuf::from(ctx.resolve(root));
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    output.push(ctx.error_line("find", &format!("'{root}': {}", describe_io(&e))));
                    continue;
                }
            };
            let name = Path::new(root)
                .file_name()
                .map_or_else(|| root.to_string(), |name| name.to_string_lossy().into_owned());
            if filter.matches(&name, meta.is_dir()) {
                output.push(root.to_string());
            }
            if meta.is_dir() {
                Self::walk(ctx, &path, root, 0, &filter, &mut output);
            }
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "find [PATH ...] [-name GLOB] [-iname GLOB] [-type f|d] [-maxdepth N]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandRegistry;
    use crate::core::state::Session;
    use crate::path::{PathExpander, PathStyle, PathTranslator};

    fn session_in(dir: &tempfile::TempDir) -> Session {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        Session::with_cwd(dir.path().to_string_lossy(), translator)
    }

    fn run(
        command: &dyn Command,
        session: &mut Session,
        args: &[&str],
    ) -> Result<String, CommandError> {
        let registry = CommandRegistry::with_builtins();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let highlighter = session.highlighter;
        let mut ctx = Context {
            session,
            highlighter,
            registry: &registry,
            input: None,
        };
        command.execute(&args, &mut ctx)
    }

    #[test]
    fn test_ls_sorted_and_hidden() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.txt"), "")?;
        fs::write(dir.path().join("A.txt"), "")?;
        fs::write(dir.path().join(".hidden"), "")?;
        fs::create_dir(dir.path().join("sub"))?;
        let mut session = session_in(&dir);

        assert_eq!(run(&ListCommand::new(), &mut session, &[])?, "A.txt\nb.txt\nsub/");
        let all = run(&ListCommand::new(), &mut session, &["-a"])?;
        assert!(all.lines().any(|line| line == ".hidden"));
        Ok(())
    }

    #[test]
    fn test_ls_long_format() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("data.bin"), vec![0u8; 2048])?;
        let mut session = session_in(&dir);

        let output = run(&ListCommand::new(), &mut session, &["-lh"])?;
        assert!(output.starts_with('-'));
        assert!(output.contains("2.0K"));
        assert!(output.ends_with("data.bin"));

        let dir_output = run(&ListCommand::long(), &mut session, &[])?;
        assert!(dir_output.contains("2048"));
        Ok(())
    }

    #[test]
    fn test_ls_missing_operand_is_inline() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut session = session_in(&dir);
        let output = run(&ListCommand::new(), &mut session, &["nope"])?;
        assert_eq!(
            output,
            "✗ ls: cannot access 'nope': No such file or directory"
        );
        Ok(())
    }

    #[test]
    fn test_ls_bad_flag() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut session = session_in(&dir);
        assert!(run(&ListCommand::new(), &mut session, &["-Z"]).is_err());
        Ok(())
    }

    #[test]
    fn test_mkdir_rmdir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut session = session_in(&dir);

        assert_eq!(run(&MakeDirCommand, &mut session, &["-p", "a/b/c"])?, "");
        assert!(dir.path().join("a/b/c").is_dir());

        let output = run(&MakeDirCommand, &mut session, &["a"])?;
        assert_eq!(output, "✗ mkdir: cannot create directory 'a': File exists");

        let output = run(&RemoveDirCommand, &mut session, &["a"])?;
        assert!(output.starts_with("✗ rmdir: failed to remove 'a'"));
        run(&RemoveDirCommand, &mut session, &["a/b/c"])?;
        assert!(!dir.path().join("a/b/c").exists());

        assert!(run(&MakeDirCommand, &mut session, &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_rm() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("f.txt"), "x")?;
        fs::create_dir_all(dir.path().join("tree/leaf"))?;
        let mut session = session_in(&dir);

        run(&RemoveCommand, &mut session, &["f.txt"])?;
        assert!(!dir.path().join("f.txt").exists());

        let output = run(&RemoveCommand, &mut session, &["tree"])?;
        assert_eq!(output, "✗ rm: cannot remove 'tree': Is a directory");
        run(&RemoveCommand, &mut session, &["-rf", "tree", "ghost"])?;
        assert!(!dir.path().join("tree").exists());

        let output = run(&RemoveCommand, &mut session, &["ghost"])?;
        assert_eq!(output, "✗ rm: cannot remove 'ghost': No such file or directory");
        Ok(())
    }

    #[test]
    fn test_touch_creates_and_keeps_content() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("keep.txt"), "content")?;
        let mut session = session_in(&dir);

        run(&TouchCommand, &mut session, &["new.txt", "keep.txt"])?;
        assert!(dir.path().join("new.txt").is_file());
        assert_eq!(fs::read_to_string(dir.path().join("keep.txt"))?, "content");
        Ok(())
    }

    #[test]
    fn test_cp_and_mv() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("one.txt"), "1")?;
        fs::create_dir_all(dir.path().join("src/inner"))?;
        fs::write(dir.path().join("src/inner/deep.txt"), "deep")?;
        fs::create_dir(dir.path().join("dest"))?;
        let mut session = session_in(&dir);

        run(&CopyCommand, &mut session, &["one.txt", "two.txt"])?;
        assert_eq!(fs::read_to_string(dir.path().join("two.txt"))?, "1");

        let output = run(&CopyCommand, &mut session, &["src", "dest"])?;
        assert_eq!(output, "✗ cp: -r not specified; omitting directory 'src'");
        run(&CopyCommand, &mut session, &["-r", "src", "dest"])?;
        assert_eq!(
            fs::read_to_string(dir.path().join("dest/src/inner/deep.txt"))?,
            "deep"
        );

        run(&MoveCommand, &mut session, &["one.txt", "two.txt", "dest"])?;
        assert!(!dir.path().join("one.txt").exists());
        assert!(dir.path().join("dest/one.txt").is_file());
        assert!(dir.path().join("dest/two.txt").is_file());

        let result = run(&MoveCommand, &mut session, &["dest/one.txt", "a", "b"]);
        assert!(matches!(result, Err(CommandError::ExecutionError(_))));
        assert!(run(&CopyCommand, &mut session, &["only"]).is_err());
        Ok(())
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512B");
        assert_eq!(human_size(1536), "1.5K");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0M");
    }

    fn find_fixture() -> Result<(tempfile::TempDir, Session), std::io::Error> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.txt"), "")?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub").join("b.txt"), "")?;
        fs::write(dir.path().join("sub").join("c.md"), "")?;
        let session = session_in(&dir);
        Ok((dir, session))
    }

    #[test]
    fn test_find_walks_in_name_order() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, mut session) = find_fixture()?;
        assert_eq!(
            run(&FindCommand, &mut session, &[])?,
            ".\n./a.txt\n./sub\n./sub/b.txt\n./sub/c.md"
        );
        assert_eq!(run(&FindCommand, &mut session, &["sub", "-type", "f"])?, "sub/b.txt\nsub/c.md");
        assert_eq!(run(&FindCommand, &mut session, &["-type", "d"])?, ".\n./sub");
        Ok(())
    }

    #[test]
    fn test_find_name_patterns_and_depth() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, mut session) = find_fixture()?;
        assert_eq!(run(&FindCommand, &mut session, &[".", "-name", "*.txt"])?, "./a.txt\n./sub/b.txt");
        assert_eq!(run(&FindCommand, &mut session, &["-iname", "*.MD"])?, "./sub/c.md");
        assert_eq!(run(&FindCommand, &mut session, &["-name", "[ab].txt"])?, "./a.txt\n./sub/b.txt");
        assert_eq!(run(&FindCommand, &mut session, &["-name", "[!a]*.txt"])?, "./sub/b.txt");
        assert_eq!(run(&FindCommand, &mut session, &["-maxdepth", "1", "-name", "*.txt"])?, "./a.txt");
        Ok(())
    }

    #[test]
    fn test_find_errors() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, mut session) = find_fixture()?;
        assert_eq!(
            run(&FindCommand, &mut session, &["nope"])?,
            "✗ find: 'nope': No such file or directory"
        );
        assert!(run(&FindCommand, &mut session, &["-bogus"]).is_err());
        assert!(run(&FindCommand, &mut session, &["-name", "[abc"]).is_err());
        assert!(run(&FindCommand, &mut session, &["-type", "x"]).is_err());
        assert!(run(&FindCommand, &mut session, &["-name"]).is_err());
        Ok(())
    }
}
