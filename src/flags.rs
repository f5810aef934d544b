use std::path::PathBuf;

use clap::Parser;

/// Command line options for the winux shell.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "winux", version, about = "Unix-style command shell with drive-letter path translation")]
pub struct Flags {
    /// Suppress the banner and non-fatal warnings
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug output (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub debug: bool,

    /// Execute a single command line and exit
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Use an alternate rc file instead of ~/.winuxrc
    #[arg(long, value_name = "FILE", env = "WINUX_RC")]
    pub rc: Option<PathBuf>,

    /// Skip loading the rc file
    #[arg(long)]
    pub no_rc: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
