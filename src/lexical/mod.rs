//! Lexical utilities (C1): date parsing/normalization, text cleaning, and
//! word-level similarity shared by every later component.

pub mod dates;
pub mod similarity;
pub mod text;

pub use dates::*;
pub use similarity::*;
pub use text::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexicalError {
    #[error("parseable but impossible date: {0}")]
    InvalidDate(String),
}
