use thiserror::Error;

pub mod executor;
pub mod signal;

pub use executor::HostExecutor;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
