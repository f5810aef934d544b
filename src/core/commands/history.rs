use super::{Command, CommandError, Context};

const DEFAULT_COUNT: usize = 10;

pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<String, CommandError> {
        let history = &mut ctx.session.history;

        let count = match args {
            [] => DEFAULT_COUNT,
            [flag] if flag == "-c" => {
                history.clear();
                return Ok(String::new());
            }
            [keyword, prefix] if keyword == "search" => {
                return Ok(history.search_prefix(prefix).join("\n"));
            }
            [count] => count.parse::<usize>().map_err(|_| {
                CommandError::InvalidArguments(format!("{count}: numeric argument required"))
            })?,
            _ => return Err(CommandError::usage(self.usage())),
        };

        let lines: Vec<String> = history
            .recent(count)
            .map(|(index, line)| format!(" {index:>4}  {line}"))
            .collect();
        Ok(lines.join("\n"))
    }

    fn usage(&self) -> &'static str {
        "history [N | -c | search PREFIX]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandRegistry;
    use crate::core::state::Session;
    use crate::path::{PathExpander, PathStyle, PathTranslator};

    fn session_with(lines: &[&str]) -> Session {
        let translator = PathTranslator::new(PathStyle::Posix, PathExpander::with_home("/home/test"));
        let mut session = Session::with_cwd("/", translator);
        for line in lines {
            session.history.add(line);
        }
        session
    }

    fn run(session: &mut Session, args: &[&str]) -> Result<String, CommandError> {
        let registry = CommandRegistry::with_builtins();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let highlighter = session.highlighter;
        let mut ctx = Context {
            session,
            highlighter,
            registry: &registry,
            input: None,
        };
        HistoryCommand.execute(&args, &mut ctx)
    }

    #[test]
    fn test_history_numbering_continues() -> Result<(), CommandError> {
        let lines: Vec<String> = (1..=7).map(|i| format!("echo {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut session = session_with(&refs);

        let output = run(&mut session, &["5"])?;
        let expected = "    3  echo 3\n    4  echo 4\n    5  echo 5\n    6  echo 6\n    7  echo 7";
        assert_eq!(output, expected);
        Ok(())
    }

    #[test]
    fn test_history_fewer_than_requested() -> Result<(), CommandError> {
        let mut session = session_with(&["pwd", "ls"]);
        assert_eq!(run(&mut session, &["5"])?, "    1  pwd\n    2  ls");
        assert_eq!(run(&mut session, &[])?, "    1  pwd\n    2  ls");
        Ok(())
    }

    #[test]
    fn test_history_clear_and_search() -> Result<(), CommandError> {
        let mut session = session_with(&["git status", "ls", "git log"]);
        assert_eq!(run(&mut session, &["search", "git"])?, "git status\ngit log");
        run(&mut session, &["-c"])?;
        assert!(session.history.is_empty());
        Ok(())
    }

    #[test]
    fn test_history_bad_count() {
        let mut session = session_with(&[]);
        assert!(matches!(
            run(&mut session, &["many"]),
            Err(CommandError::InvalidArguments(_))
        ));
    }
}
