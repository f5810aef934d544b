use std::path::PathBuf;

use thiserror::Error;

mod loader;
mod paths;

pub use loader::ConfigLoader;
pub use paths::ConfigPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
