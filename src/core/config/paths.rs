use std::path::PathBuf;

use super::ConfigError;

const RC_FILE_NAME: &str = ".winuxrc";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self {
            rc_path: home.join(RC_FILE_NAME),
        })
    }

    pub fn with_rc(rc_path: impl Into<PathBuf>) -> Self {
        Self {
            rc_path: rc_path.into(),
        }
    }
}
