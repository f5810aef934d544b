mod vars;

pub use vars::Environment;
pub(crate) use vars::{validate_name, PATH_SEPARATOR};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("variable name cannot be empty")]
    EmptyName,
    #[error("`{0}': not a valid identifier")]
    InvalidName(String),
}
