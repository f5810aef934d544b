mod expander;
mod translator;

pub use expander::PathExpander;
pub use translator::{lexical_normalize, PathStyle, PathTranslator};
