use clap::Parser;
use winux::flags::Flags;
use winux::logging;
use winux::shell::Shell;

fn main() -> Result<(), winux::error::ShellError> {
    let flags = Flags::parse();
    logging::init(&flags)?;

    // Handler panics are caught and shown as an error line; keep the default
    // hook's backtrace banner out of the terminal.
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "command handler panicked");
    }));

    let command = flags.command.clone();
    let mut shell = Shell::new(flags)?;
    match command {
        Some(line) => shell.run_command(&line),
        None => shell.run(),
    }
}
