use super::CommandError;

/// Short flags and operands, getopt style: `-la` sets `l` and `a`, `--` ends
/// the flags and a lone `-` is an operand.
#[derive(Debug, Default)]
pub(crate) struct Options<'a> {
    flags: Vec<char>,
    values: Vec<(char, &'a str)>,
    pub operands: Vec<&'a str>,
}

impl<'a> Options<'a> {
    pub fn parse(args: &'a [String], allowed: &str) -> Result<Self, CommandError> {
        Self::parse_with_values(args, allowed, "")
    }

    /// Flags in `valued` take an argument, either attached (`-d,`) or as the
    /// next word (`-d ,`).
    pub fn parse_with_values(
        args: &'a [String],
        allowed: &str,
        valued: &str,
    ) -> Result<Self, CommandError> {
        let mut options = Self::default();
        let mut flags_done = false;
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            if flags_done || arg == "-" || !arg.starts_with('-') {
                options.operands.push(arg);
                continue;
            }
            if arg == "--" {
                flags_done = true;
                continue;
            }
            for (offset, flag) in arg.char_indices().skip(1) {
                if valued.contains(flag) {
                    let attached = &arg[offset + flag.len_utf8()..];
                    let value = if attached.is_empty() {
                        iter.next().map(String::as_str).ok_or_else(|| {
                            CommandError::InvalidArguments(format!(
                                "option requires an argument -- '{flag}'"
                            ))
                        })?
                    } else {
                        attached
                    };
                    options.values.push((flag, value));
                    break;
                }
                if !allowed.contains(flag) {
                    return Err(CommandError::InvalidArguments(format!(
                        "invalid option -- '{flag}'"
                    )));
                }
                options.flags.push(flag);
            }
        }

        Ok(options)
    }

    pub fn has(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }

    pub fn value(&self, flag: char) -> Option<&'a str> {
        self.values
            .iter()
            .rev()
            .find(|(name, _)| *name == flag)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_combined_flags() -> Result<(), CommandError> {
        let args = args(&["-la", "src", "-h"]);
        let options = Options::parse(&args, "alh")?;
        assert!(options.has('l') && options.has('a') && options.has('h'));
        assert_eq!(options.operands, vec!["src"]);
        Ok(())
    }

    #[test]
    fn test_double_dash_and_lone_dash() -> Result<(), CommandError> {
        let args = args(&["-", "--", "-weird"]);
        let options = Options::parse(&args, "")?;
        assert_eq!(options.operands, vec!["-", "-weird"]);
        Ok(())
    }

    #[test]
    fn test_valued_flags() -> Result<(), CommandError> {
        let given = args(&["-d,", "-f", "2", "-s", "data.csv"]);
        let options = Options::parse_with_values(&given, "s", "df")?;
        assert_eq!(options.value('d'), Some(","));
        assert_eq!(options.value('f'), Some("2"));
        assert!(options.has('s'));
        assert_eq!(options.operands, vec!["data.csv"]);

        let missing = args(&["-f"]);
        assert!(Options::parse_with_values(&missing, "", "f").is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_flag() {
        let args = args(&["-z"]);
        let result = Options::parse(&args, "ab");
        assert!(matches!(result, Err(CommandError::InvalidArguments(ref m)) if m == "invalid option -- 'z'"));
    }
}
