use thiserror::Error as ThisError;

use crate::interpreter::ScopeId;
use crate::parser::{Location, Span};

/// Everything that can abort a run. The first error stops tokenizing, parsing or evaluation;
/// there is no recovery and no partial result.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unexpected character '{character}' at {location}")]
    Lex { character: char, location: Location },

    #[error("{message} at {span}")]
    Parse { message: String, span: Span },

    #[error("Variable '{0}' was already declared in the current scope")]
    Redeclaration(String),

    #[error("Variable '{0}' is constant and cannot be assigned to")]
    ConstAssignment(String),

    #[error("Variable '{0}' was not found, unable to resolve")]
    UnresolvedName(String),

    #[error("Unknown numeric operator '{0}'")]
    UnsupportedOperator(String),

    #[error("Unsupported AST node {0}")]
    UnsupportedNode(&'static str),

    #[error("Invalid assignment target {0}")]
    InvalidAssignmentTarget(String),

    #[error("Scope {0} was released or belongs to another environment")]
    StaleScope(ScopeId),
}

impl Error {
    pub(crate) fn parse(span: Span, msg: &str) -> Self {
        Self::Parse {
            message: msg.to_string(),
            span,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
