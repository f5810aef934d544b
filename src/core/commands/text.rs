use std::collections::HashSet;
use std::fs;

use regex::{Captures, RegexBuilder};

use super::options::Options;
use super::{describe_io, Command, CommandError, Context};

const DEFAULT_LINES: usize = 10;

struct Input {
    name: Option<String>,
    content: Result<String, String>,
}

impl Input {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

fn read_inputs(ctx: &Context<'_>, operands: &[&str]) -> Result<Vec<Input>, CommandError> {
    if operands.is_empty() {
        return match ctx.input {
            Some(text) => Ok(vec![Input {
                name: None,
                content: Ok(text.to_string()),
            }]),
            None => Err(CommandError::InvalidArguments(
                "missing file operand".to_string(),
            )),
        };
    }

    Ok(operands
        .iter()
        .map(|operand| {
            if *operand == "-" {
                return Input {
                    name: None,
                    content: Ok(ctx.input.unwrap_or_default().to_string()),
                };
            }
            let content = fs::read(ctx.resolve(operand))
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| describe_io(&e));
            Input {
                name: Some(operand.to_string()),
                content,
            }
        })
        .collect())
}

/// Pulls `-n N`, `-nN` and `-N` out of `args`, leaving the rest.
fn split_line_count(args: &[String]) -> Result<(usize, Vec<String>), CommandError> {
    fn parse(text: &str) -> Result<usize, CommandError> {
        text.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid number of lines: '{text}'"))
        })
    }

    let mut count = DEFAULT_LINES;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-n" {
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments("option requires an argument -- 'n'".to_string())
            })?;
            count = parse(value)?;
        } else if let Some(value) = arg.strip_prefix("-n") {
            count = parse(value)?;
        } else if arg.len() > 1 && arg.starts_with('-') && arg[1..].bytes().all(|b| b.is_ascii_digit()) {
            count = parse(&arg[1..])?;
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((count, rest))
}

pub struct CatCommand;

impl Command for CatCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "n")?;
        let number = options.has('n');

        let mut output = Vec::new();
        let mut line_number = 1;
        for input in read_inputs(ctx, &options.operands)? {
            let content = match &input.content {
                Ok(content) => content,
                Err(message) => {
                    output.push(ctx.error_line("cat", &format!("{}: {message}", input.label())));
                    continue;
                }
            };
            for line in content.lines() {
                if number {
                    output.push(format!("{line_number:>6}  {line}"));
                    line_number += 1;
                } else {
                    output.push(line.to_string());
                }
            }
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "cat [-n] [FILE ...]"
    }
}

#[derive(Clone, Copy)]
enum End {
    Head,
    Tail,
}

fn head_or_tail(
    end: End,
    origin: &str,
    args: &[String],
    ctx: &Context<'_>,
) -> Result<String, CommandError> {
    let (count, rest) = split_line_count(args)?;
    let options = Options::parse(&rest, "")?;
    let inputs = read_inputs(ctx, &options.operands)?;
    let headers = inputs.len() > 1;

    let mut output = Vec::new();
    for input in &inputs {
        if headers {
            output.push(format!("==> {} <==", input.label()));
        }
        match &input.content {
            Ok(content) => {
                let lines: Vec<&str> = content.lines().collect();
                let selected = match end {
                    End::Head => &lines[..count.min(lines.len())],
                    End::Tail => &lines[lines.len().saturating_sub(count)..],
                };
                output.extend(selected.iter().map(|line| line.to_string()));
            }
            Err(message) => {
                output.push(ctx.error_line(origin, &format!("{}: {message}", input.label())));
            }
        }
    }
    Ok(output.join("\n"))
}

pub struct HeadCommand;

impl Command for HeadCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        head_or_tail(End::Head, "head", args, ctx)
    }

    fn usage(&self) -> &'static str {
        "head [-n N | -N] [FILE ...]"
    }
}

pub struct TailCommand;

impl Command for TailCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        head_or_tail(End::Tail, "tail", args, ctx)
    }

    fn usage(&self) -> &'static str {
        "tail [-n N | -N] [FILE ...]"
    }
}

pub struct GrepCommand;

impl Command for GrepCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "ivcn")?;
        let Some((pattern, files)) = options.operands.split_first() else {
            return Err(CommandError::InvalidArguments("missing pattern".to_string()));
        };
        let invert = options.has('v');
        let count_only = options.has('c');
        let numbered = options.has('n');

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.has('i'))
            .build()
            .map_err(|e| {
                let reason = e.to_string();
                let reason = reason.lines().last().unwrap_or_default().trim().to_string();
                CommandError::InvalidArguments(format!("invalid regex '{pattern}': {reason}"))
            })?;

        let inputs = read_inputs(ctx, files)?;
        let show_names = inputs.len() > 1;
        let highlighter = ctx.highlighter;

        let mut output = Vec::new();
        for input in &inputs {
            let content = match &input.content {
                Ok(content) => content,
                Err(message) => {
                    output.push(ctx.error_line("grep", &format!("{}: {message}", input.label())));
                    continue;
                }
            };
            let prefix = if show_names {
                format!("{}:", input.label())
            } else {
                String::new()
            };

            let mut matches = 0;
            for (index, line) in content.lines().enumerate() {
                if regex.is_match(line) == invert {
                    continue;
                }
                matches += 1;
                if count_only {
                    continue;
                }
                let number = if numbered {
                    format!("{}:", index + 1)
                } else {
                    String::new()
                };
                let shown = if invert {
                    line.to_string()
                } else {
                    regex
                        .replace_all(line, |caps: &Captures<'_>| highlighter.highlight_match(&caps[0]))
                        .into_owned()
                };
                output.push(format!("{prefix}{number}{shown}"));
            }
            if count_only {
                output.push(format!("{prefix}{matches}"));
            }
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "grep [-ivcn] PATTERN [FILE ...]"
    }
}

pub struct WcCommand;

impl WcCommand {
    fn format_counts(counts: [usize; 3], shown: [bool; 3], label: Option<&str>) -> String {
        let mut parts: Vec<String> = counts
            .iter()
            .zip(shown)
            .filter(|(_, show)| *show)
            .map(|(count, _)| format!("{count:>8}"))
            .collect();
        if let Some(label) = label {
            parts.push(label.to_string());
        }
        parts.join(" ")
    }
}

impl Command for WcCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "lwc")?;
        let mut shown = [options.has('l'), options.has('w'), options.has('c')];
        if !shown.iter().any(|show| *show) {
            shown = [true; 3];
        }

        let inputs = read_inputs(ctx, &options.operands)?;
        let mut totals = [0usize; 3];
        let mut output = Vec::new();
        for input in &inputs {
            match &input.content {
                Ok(content) => {
                    let counts = [
                        content.matches('\n').count(),
                        content.split_whitespace().count(),
                        content.len(),
                    ];
                    for (total, count) in totals.iter_mut().zip(counts) {
                        *total += count;
                    }
                    output.push(Self::format_counts(counts, shown, input.name.as_deref()));
                }
                Err(message) => {
                    output.push(ctx.error_line("wc", &format!("{}: {message}", input.label())));
                }
            }
        }
        if inputs.len() > 1 {
            output.push(Self::format_counts(totals, shown, Some("total")));
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "wc [-lwc] [FILE ...]"
    }
}

pub struct SortCommand;

impl SortCommand {
    fn numeric_key(line: &str) -> f64 {
        line.split_whitespace()
            .next()
            .and_then(|word| word.parse().ok())
            .unwrap_or(0.0)
    }
}

impl Command for SortCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "rnu")?;

        let mut lines = Vec::new();
        for input in read_inputs(ctx, &options.operands)? {
            let content = input.content.map_err(|message| {
                CommandError::ExecutionError(format!("{}: {message}", input.name.as_deref().unwrap_or("-")))
            })?;
            lines.extend(content.lines().map(str::to_string));
        }

        if options.has('n') {
            lines.sort_by(|a, b| Self::numeric_key(a).total_cmp(&Self::numeric_key(b)));
        } else {
            lines.sort();
        }
        if options.has('r') {
            lines.reverse();
        }
        if options.has('u') {
            let mut seen = HashSet::new();
            lines.retain(|line| seen.insert(line.clone()));
        }

        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "sort [-rnu] [FILE ...]"
    }
}

pub struct UniqCommand;

impl Command for UniqCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "cdu")?;
        let counted = options.has('c');
        let repeated_only = options.has('d');
        let unique_only = options.has('u');

        let mut output = Vec::new();
        for input in read_inputs(ctx, &options.operands)? {
            let content = match &input.content {
                Ok(content) => content,
                Err(message) => {
                    output.push(ctx.error_line("uniq", &format!("{}: {message}", input.label())));
                    continue;
                }
            };

            let mut groups: Vec<(&str, usize)> = Vec::new();
            for line in content.lines() {
                match groups.last_mut() {
                    Some((previous, count)) if *previous == line => *count += 1,
                    _ => groups.push((line, 1)),
                }
            }

            for (line, count) in groups {
                if (repeated_only && count < 2) || (unique_only && count > 1) {
                    continue;
                }
                if counted {
                    output.push(format!("{count:>7} {line}"));
                } else {
                    output.push(line.to_string());
                }
            }
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "uniq [-cdu] [FILE ...]"
    }
}

/// 1-based positions from a list such as `1,3-5,7-`.
#[derive(Debug, PartialEq)]
struct Ranges(Vec<(usize, usize)>);

impl Ranges {
    fn parse(list: &str) -> Result<Self, CommandError> {
        let invalid = || CommandError::InvalidArguments(format!("invalid list '{list}'"));
        let bound = |text: &str, open: usize| -> Result<usize, CommandError> {
            if text.is_empty() {
                Ok(open)
            } else {
                text.parse().map_err(|_| invalid())
            }
        };

        let mut ranges = Vec::new();
        for part in list.split(',') {
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (bound(start, 1)?, bound(end, usize::MAX)?),
                None => {
                    let position = part.parse().map_err(|_| invalid())?;
                    (position, position)
                }
            };
            if start == 0 || start > end {
                return Err(invalid());
            }
            ranges.push((start, end));
        }
        Ok(Self(ranges))
    }

    fn contains(&self, position: usize) -> bool {
        self.0
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&position))
    }
}

pub struct CutCommand;

impl CutCommand {
    fn cut_line(line: &str, ranges: &Ranges, delimiter: Option<&str>) -> String {
        match delimiter {
            Some(delimiter) => line
                .split(delimiter)
                .enumerate()
                .filter(|(index, _)| ranges.contains(index + 1))
                .map(|(_, field)| field)
                .collect::<Vec<_>>()
                .join(delimiter),
            None => line
                .chars()
                .enumerate()
                .filter(|(index, _)| ranges.contains(index + 1))
                .map(|(_, c)| c)
                .collect(),
        }
    }
}

impl Command for CutCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse_with_values(args, "", "dfc")?;
        let delimiter = options.value('d').unwrap_or("\t");
        if delimiter.chars().count() != 1 {
            return Err(CommandError::InvalidArguments(
                "the delimiter must be a single character".to_string(),
            ));
        }

        // `None` as the delimiter selects characters.
        let (ranges, delimiter) = match (options.value('f'), options.value('c')) {
            (Some(list), None) => (Ranges::parse(list)?, Some(delimiter)),
            (None, Some(list)) => (Ranges::parse(list)?, None),
            (Some(_), Some(_)) => {
                return Err(CommandError::InvalidArguments(
                    "only one type of list may be specified".to_string(),
                ))
            }
            (None, None) => {
                return Err(CommandError::InvalidArguments(
                    "you must specify a list of fields or characters".to_string(),
                ))
            }
        };

        let mut output = Vec::new();
        for input in read_inputs(ctx, &options.operands)? {
            match &input.content {
                Ok(content) => output.extend(
                    content
                        .lines()
                        .map(|line| Self::cut_line(line, &ranges, delimiter)),
                ),
                Err(message) => {
                    output.push(ctx.error_line("cut", &format!("{}: {message}", input.label())));
                }
            }
        }
        Ok(output.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "cut -f LIST [-d DELIM] | -c LIST [FILE ...]"
    }
}

pub struct TrCommand;

impl TrCommand {
    fn expand_set(set: &str) -> Vec<char> {
        let mut chars = Vec::new();
        let mut iter = set.chars();
        while let Some(c) = iter.next() {
            let c = if c == '\\' {
                match iter.next() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some(other) => other,
                    None => '\\',
                }
            } else {
                c
            };
            chars.push(c);
        }

        let mut expanded = Vec::new();
        let mut index = 0;
        while index < chars.len() {
            match chars.get(index..index + 3) {
                Some(&[start, '-', end]) if start <= end => {
                    expanded.extend(start..=end);
                    index += 3;
                }
                _ => {
                    expanded.push(chars[index]);
                    index += 1;
                }
            }
        }
        expanded
    }

    /// Characters past the end of `to` map to its last one.
    fn translate(c: char, from: &[char], to: &[char]) -> char {
        match from.iter().rposition(|x| *x == c) {
            Some(index) => to.get(index).or(to.last()).copied().unwrap_or(c),
            None => c,
        }
    }
}

impl Command for TrCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "ds")?;
        let delete = options.has('d');
        let squeeze = options.has('s');

        let sets: Vec<Vec<char>> = options
            .operands
            .iter()
            .map(|set| Self::expand_set(set))
            .collect();
        let expected = match (delete, squeeze) {
            (true, false) => 1..=1,
            (false, true) => 1..=2,
            _ => 2..=2,
        };
        if sets.len() < *expected.start() {
            return Err(CommandError::InvalidArguments("missing operand".to_string()));
        }
        if sets.len() > *expected.end() {
            return Err(CommandError::InvalidArguments(format!(
                "extra operand '{}'",
                options.operands[sets.len() - 1]
            )));
        }

        let input = ctx.input.ok_or_else(|| {
            CommandError::InvalidArguments("reads piped input only".to_string())
        })?;

        let first = &sets[0];
        let squeezed = if squeeze { sets.last() } else { None };
        let mut output = String::with_capacity(input.len());
        for c in input.chars() {
            let c = if delete {
                if first.contains(&c) {
                    continue;
                }
                c
            } else {
                match sets.get(1) {
                    Some(to) => Self::translate(c, first, to),
                    None => c,
                }
            };
            if squeezed.is_some_and(|set| set.contains(&c)) && output.ends_with(c) {
                continue;
            }
            output.push(c);
        }

        Ok(output.strip_suffix('\n').unwrap_or(&output).to_string())
    }

    fn usage(&self) -> &'static str {
        "tr [-ds] SET1 [SET2]"
    }
}

const DIFF_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Edit<'a> {
    Keep(&'a str),
    Remove(&'a str),
    Add(&'a str),
}

pub struct DiffCommand;

impl DiffCommand {
    fn edits<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Edit<'a>> {
        let (n, m) = (old.len(), new.len());
        let mut common = vec![vec![0usize; m + 1]; n + 1];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                common[i][j] = if old[i] == new[j] {
                    common[i + 1][j + 1] + 1
                } else {
                    common[i + 1][j].max(common[i][j + 1])
                };
            }
        }

        let mut edits = Vec::with_capacity(n.max(m));
        let (mut i, mut j) = (0, 0);
        while i < n && j < m {
            if old[i] == new[j] {
                edits.push(Edit::Keep(old[i]));
                i += 1;
                j += 1;
            } else if common[i + 1][j] >= common[i][j + 1] {
                edits.push(Edit::Remove(old[i]));
                i += 1;
            } else {
                edits.push(Edit::Add(new[j]));
                j += 1;
            }
        }
        edits.extend(old[i..].iter().map(|line| Edit::Remove(line)));
        edits.extend(new[j..].iter().map(|line| Edit::Add(line)));
        edits
    }

    /// `start` is the number of lines before the span.
    fn span(start: usize, count: usize) -> String {
        match count {
            0 => format!("{start},0"),
            1 => format!("{}", start + 1),
            _ => format!("{},{count}", start + 1),
        }
    }

    fn unified(old_name: &str, new_name: &str, old: &str, new: &str) -> Vec<String> {
        let old: Vec<&str> = old.lines().collect();
        let new: Vec<&str> = new.lines().collect();
        let edits = Self::edits(&old, &new);

        // Edit index ranges, merged when their context overlaps.
        let mut hunks: Vec<(usize, usize)> = Vec::new();
        for (index, edit) in edits.iter().enumerate() {
            if matches!(edit, Edit::Keep(_)) {
                continue;
            }
            let start = index.saturating_sub(DIFF_CONTEXT);
            let end = (index + 1 + DIFF_CONTEXT).min(edits.len());
            match hunks.last_mut() {
                Some((_, last_end)) if start <= *last_end => *last_end = end,
                _ => hunks.push((start, end)),
            }
        }
        if hunks.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![format!("--- {old_name}"), format!("+++ {new_name}")];
        let (mut old_line, mut new_line, mut cursor) = (0, 0, 0);
        for (start, end) in hunks {
            for edit in &edits[cursor..start] {
                match edit {
                    Edit::Keep(_) => {
                        old_line += 1;
                        new_line += 1;
                    }
                    Edit::Remove(_) => old_line += 1,
                    Edit::Add(_) => new_line += 1,
                }
            }
            let hunk = &edits[start..end];
            let old_count = hunk.iter().filter(|e| !matches!(e, Edit::Add(_))).count();
            let new_count = hunk.iter().filter(|e| !matches!(e, Edit::Remove(_))).count();
            lines.push(format!(
                "@@ -{} +{} @@",
                Self::span(old_line, old_count),
                Self::span(new_line, new_count)
            ));
            lines.extend(hunk.iter().map(|edit| match edit {
                Edit::Keep(line) => format!(" {line}"),
                Edit::Remove(line) => format!("-{line}"),
                Edit::Add(line) => format!("+{line}"),
            }));
            old_line += old_count;
            new_line += new_count;
            cursor = end;
        }
        lines
    }
}

impl Command for DiffCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "u")?;
        let [old_name, new_name] = options.operands.as_slice() else {
            return Err(CommandError::usage(self.usage()));
        };

        let inputs = read_inputs(ctx, &[*old_name, *new_name])?;
        let mut contents = Vec::with_capacity(2);
        for input in &inputs {
            let content = input.content.as_deref().map_err(|message| {
                CommandError::ExecutionError(format!("{}: {message}", input.label()))
            })?;
            contents.push(content);
        }

        let highlighter = ctx.highlighter;
        Ok(Self::unified(old_name, new_name, contents[0], contents[1])
            .iter()
            .map(|line| highlighter.highlight_diff_line(line))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn usage(&self) -> &'static str {
        "diff [-u] FILE1 FILE2"
    }
}
