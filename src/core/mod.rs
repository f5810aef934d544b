pub mod aliases;
pub mod commands;
pub mod config;
pub mod env;
pub mod state;
pub mod tokenizer;

pub use aliases::AliasTable;
pub use state::Session;
pub use tokenizer::{tokenize, tokenize_with, Tokens};
