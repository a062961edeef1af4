mod error;
pub use error::{Error, Result};

mod parser;
pub use parser::tokenizer::{Token, TokenType, Tokenizer};
pub use parser::{parse, tokenize, Locatable, Location, Name, Node, Property, Span};
pub use parser::VariableDeclaration;

mod interpreter;
pub use interpreter::{
    evaluate, Environment, Function, Interpreter, NativeFn, Object, ScopeId, Value,
};
