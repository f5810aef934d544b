use std::fmt::Display;
use std::fs;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};

use super::options::Options;
use super::{Command, CommandError, Context};

const DEFAULT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

pub struct DateCommand;

impl DateCommand {
    fn render<Tz>(now: &DateTime<Tz>, format: &str) -> Result<String, CommandError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        // chrono panics while displaying a malformed format.
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(CommandError::InvalidArguments(format!(
                "invalid format '{format}'"
            )));
        }
        Ok(now.format_with_items(items.into_iter()).to_string())
    }
}

impl Command for DateCommand {
    fn execute(&self, args: &[String], _ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "u")?;
        let format = match options.operands.as_slice() {
            [] => DEFAULT_DATE_FORMAT,
            [format] => format.strip_prefix('+').ok_or_else(|| {
                CommandError::InvalidArguments(format!("invalid date '{format}'"))
            })?,
            [_, extra, ..] => {
                return Err(CommandError::InvalidArguments(format!(
                    "extra operand '{extra}'"
                )))
            }
        };

        if options.has('u') {
            Self::render(&Utc::now(), format)
        } else {
            Self::render(&Local::now(), format)
        }
    }

    fn usage(&self) -> &'static str {
        "date [-u] [+FORMAT]"
    }
}

pub struct WhoamiCommand;

impl Command for WhoamiCommand {
    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        ctx.session
            .user_name()
            .map(str::to_string)
            .ok_or_else(|| CommandError::ExecutionError("cannot find name for user".to_string()))
    }

    fn usage(&self) -> &'static str {
        "whoami"
    }
}

fn kernel_value(name: &str) -> Option<String> {
    let value = fs::read_to_string(format!("/proc/sys/kernel/{name}")).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub struct HostnameCommand;

impl Command for HostnameCommand {
    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        ctx.session
            .host_name()
            .map(str::to_string)
            .or_else(|| kernel_value("hostname"))
            .ok_or_else(|| CommandError::ExecutionError("cannot determine host name".to_string()))
    }

    fn usage(&self) -> &'static str {
        "hostname"
    }
}

#[derive(Debug)]
struct SystemInfo {
    kernel: String,
    node: String,
    release: String,
    version: String,
    machine: String,
}

impl SystemInfo {
    fn current(ctx: &Context<'_>) -> Self {
        let kernel = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Darwin",
            "windows" => "Windows_NT",
            other => other,
        };
        let unknown = || "unknown".to_string();
        Self {
            kernel: kernel.to_string(),
            node: ctx
                .session
                .host_name()
                .map(str::to_string)
                .or_else(|| kernel_value("hostname"))
                .unwrap_or_else(unknown),
            release: kernel_value("osrelease").unwrap_or_else(unknown),
            version: kernel_value("version").unwrap_or_else(unknown),
            machine: std::env::consts::ARCH.to_string(),
        }
    }

    fn select(&self, options: &Options<'_>) -> String {
        let all = options.has('a');
        let fields = [
            ('s', &self.kernel),
            ('n', &self.node),
            ('r', &self.release),
            ('v', &self.version),
            ('m', &self.machine),
        ];
        let chosen: Vec<&str> = fields
            .iter()
            .filter(|(flag, _)| all || options.has(*flag))
            .map(|(_, value)| value.as_str())
            .collect();
        if chosen.is_empty() {
            self.kernel.clone()
        } else {
            chosen.join(" ")
        }
    }
}

pub struct UnameCommand;

impl Command for UnameCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let options = Options::parse(args, "asnrvm")?;
        if let Some(extra) = options.operands.first() {
            return Err(CommandError::InvalidArguments(format!(
                "extra operand '{extra}'"
            )));
        }
        Ok(SystemInfo::current(ctx).select(&options))
    }

    fn usage(&self) -> &'static str {
        "uname [-asnrvm]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandRegistry;
    use crate::core::state::Session;
    use crate::path::{PathExpander, PathStyle, PathTranslator};

    fn session() -> Session {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        Session::with_cwd("/home/test", translator)
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
    fn test_date_formats() -> Result<(), Box<dyn std::error::Error>> {
        let moment = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .ok_or("ambiguous time")?;
        assert_eq!(
            DateCommand::render(&moment, "%Y-%m-%d %H:%M:%S")?,
            "2024-03-09 14:05:07"
        );
        assert_eq!(
            DateCommand::render(&moment, DEFAULT_DATE_FORMAT)?,
            "Sat Mar  9 14:05:07 UTC 2024"
        );
        assert!(DateCommand::render(&moment, "%Q").is_err());
        Ok(())
    }

    #[test]
    fn test_date_operands() -> Result<(), CommandError> {
        let mut session = session();
        let year = run(&DateCommand, &mut session, &["-u", "+%Y"])?;
        assert_eq!(year.len(), 4);
        assert!(run(&DateCommand, &mut session, &["tomorrow"]).is_err());
        assert!(run(&DateCommand, &mut session, &["+%Y", "+%m"]).is_err());
        Ok(())
    }

    #[test]
    fn test_whoami_and_hostname_use_session_env() -> Result<(), CommandError> {
        let mut session = session();
        session.env.remove("USERNAME");
        session.env.set("USER", "alice").map_err(CommandError::Env)?;
        session.env.remove("COMPUTERNAME");
        session.env.set("HOSTNAME", "box").map_err(CommandError::Env)?;

        assert_eq!(run(&WhoamiCommand, &mut session, &[])?, "alice");
        assert_eq!(run(&HostnameCommand, &mut session, &[])?, "box");

        session.env.remove("USER");
        assert!(run(&WhoamiCommand, &mut session, &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_uname_fields() -> Result<(), CommandError> {
        let mut session = session();
        session.env.remove("COMPUTERNAME");
        session.env.set("HOSTNAME", "box").map_err(CommandError::Env)?;

        let kernel = run(&UnameCommand, &mut session, &[])?;
        assert_eq!(run(&UnameCommand, &mut session, &["-s"])?, kernel);
        assert_eq!(
            run(&UnameCommand, &mut session, &["-nm"])?,
            format!("box {}", std::env::consts::ARCH)
        );
        let all = run(&UnameCommand, &mut session, &["-a"])?;
        assert!(all.starts_with(&format!("{kernel} box ")));
        assert!(run(&UnameCommand, &mut session, &["extra"]).is_err());
        Ok(())
    }
}
