use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ShellError;
use crate::flags::Flags;

pub fn init(flags: &Flags) -> Result<(), ShellError> {
    let level = if flags.debug {
        "debug"
    } else if flags.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .map_err(|e| ShellError::Logging(e.to_string()))
}
