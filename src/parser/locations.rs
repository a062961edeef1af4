use super::ast::{Name, Node, Property};
use super::tokenizer::Token;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub(crate) fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub trait Locatable {
    fn span(&self) -> Span;
}

/// A region of source text. Lines and columns are 1-based; `end` points just past the last
/// character. Nodes built by hand instead of by the parser carry the default (empty) span.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub(crate) fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start: Location::new(start_line, start_col),
            end: Location::new(end_line, end_col),
        }
    }

    pub(crate) fn till<R: Locatable>(&self, other: &R) -> Self {
        Self {
            start: self.start,
            end: other.span().end,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl Locatable for Span {
    fn span(&self) -> Span {
        *self
    }
}

impl Locatable for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl<R> Locatable for Box<R>
where
    R: Locatable,
{
    fn span(&self) -> Span {
        (**self).span()
    }
}

impl Locatable for Name {
    fn span(&self) -> Span {
        self.span
    }
}

impl Locatable for Property {
    fn span(&self) -> Span {
        self.span
    }
}

impl Locatable for Node {
    fn span(&self) -> Span {
        match self {
            Self::Program(_, s) => *s,
            Self::VariableDeclaration(_, s) => *s,
            Self::Assignment(_, s) => *s,
            Self::BinaryOperation(_, _, s) => *s,
            Self::Identifier(name) => name.span,
            Self::NumericLiteral(_, s) => *s,
            Self::ObjectLiteral(_, s) => *s,
            Self::Property(property) => property.span,
        }
    }
}
