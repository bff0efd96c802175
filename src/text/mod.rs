//! Types for reading and writing INI text
//!
//! The lexer turns text into one token per logical line, the parser groups those tokens into
//! an [`Ini`](crate::Ini) tree, and the writer renders a tree back to text.
mod lexer;
mod parser;
mod writer;

pub use self::lexer::{Lexer, Token};
pub use self::parser::{IniParser, Options};
pub use self::writer::IniWriter;
