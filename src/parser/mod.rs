mod ast;
mod grammar;
mod locations;
pub mod tokenizer;

pub use ast::*;
pub use grammar::parse;
pub use locations::{Locatable, Location, Span};
pub use tokenizer::tokenize;
