//! Board configuration
//!
//! Types for `board.toml` and the no_std parser that fills them.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
