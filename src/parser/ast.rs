use derivative::Derivative;

use super::locations::Span;
use super::tokenizer::{Token, TokenType as TT};

/// A parsed program fragment. Spans are carried for diagnostics only and never take part in
/// equality, so hand-built trees compare equal to parsed ones.
#[derive(Derivative)]
#[derivative(Debug, Clone)]
pub enum Node {
    Program(Vec<Node>, #[derivative(Debug = "ignore")] Span),
    VariableDeclaration(VariableDeclaration, #[derivative(Debug = "ignore")] Span),
    /// Target and assigned value.
    Assignment(Box<(Node, Node)>, #[derivative(Debug = "ignore")] Span),
    /// Operator symbol, left and right operand.
    BinaryOperation(String, Box<(Node, Node)>, #[derivative(Debug = "ignore")] Span),
    Identifier(Name),
    NumericLiteral(f64, #[derivative(Debug = "ignore")] Span),
    ObjectLiteral(Vec<Property>, #[derivative(Debug = "ignore")] Span),
    Property(Property),
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Program(a, _), Self::Program(b, _)) => a == b,
            (Self::VariableDeclaration(a, _), Self::VariableDeclaration(b, _)) => a == b,
            (Self::Assignment(a, _), Self::Assignment(b, _)) => a == b,
            (Self::BinaryOperation(op, a, _), Self::BinaryOperation(other_op, b, _)) => {
                op == other_op && a == b
            }
            (Self::Identifier(a), Self::Identifier(b)) => a == b,
            (Self::NumericLiteral(a, _), Self::NumericLiteral(b, _)) => a == b,
            (Self::ObjectLiteral(a, _), Self::ObjectLiteral(b, _)) => a == b,
            (Self::Property(a), Self::Property(b)) => a == b,
            _ => false,
        }
    }
}

impl Node {
    pub fn program(body: Vec<Node>) -> Self {
        Self::Program(body, Span::default())
    }
    pub fn declaration(name: &str, value: Option<Node>, constant: bool) -> Self {
        Self::VariableDeclaration(
            VariableDeclaration {
                name: Name::new(name),
                value: value.map(Box::new),
                constant,
            },
            Span::default(),
        )
    }
    pub fn assignment(target: Node, value: Node) -> Self {
        Self::Assignment(Box::new((target, value)), Span::default())
    }
    pub fn binary(operator: &str, left: Node, right: Node) -> Self {
        Self::BinaryOperation(operator.to_string(), Box::new((left, right)), Span::default())
    }
    pub fn identifier(name: &str) -> Self {
        Self::Identifier(Name::new(name))
    }
    pub fn number(value: f64) -> Self {
        Self::NumericLiteral(value, Span::default())
    }
    pub fn object(properties: Vec<Property>) -> Self {
        Self::ObjectLiteral(properties, Span::default())
    }

    /// The node-kind tag, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Program(..) => "Program",
            Self::VariableDeclaration(..) => "VariableDeclaration",
            Self::Assignment(..) => "AssignmentExpr",
            Self::BinaryOperation(..) => "BinaryExpr",
            Self::Identifier(_) => "Identifier",
            Self::NumericLiteral(..) => "NumericLiteral",
            Self::ObjectLiteral(..) => "ObjectLiteral",
            Self::Property(_) => "Property",
        }
    }

    /// Number of top-level statements if this is a program, otherwise zero.
    pub fn statement_count(&self) -> usize {
        match self {
            Self::Program(body, _) => body.len(),
            _ => 0,
        }
    }
}

#[derive(Derivative)]
#[derivative(Clone, PartialEq)]
pub struct Name {
    pub name: String,
    #[derivative(PartialEq = "ignore")]
    pub span: Span,
}

impl Name {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            span: Span::default(),
        }
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name(\"{}\")", self.name)
    }
}

impl From<Token> for Name {
    fn from(value: Token) -> Self {
        match value.typ {
            TT::NAME => Self {
                name: value.lexeme,
                span: value.span,
            },
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: Name,
    pub value: Option<Box<Node>>,
    pub constant: bool,
}

/// An object literal entry. A missing value means shorthand: the value is the variable named
/// like the key.
#[derive(Derivative)]
#[derivative(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Option<Box<Node>>,
    #[derivative(PartialEq = "ignore", Debug = "ignore")]
    pub span: Span,
}

impl Property {
    pub fn new(key: &str, value: Option<Node>) -> Self {
        Self {
            key: key.to_string(),
            value: value.map(Box::new),
            span: Span::default(),
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.key, value),
            None => write!(f, "{}", self.key),
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Program(body, _) => {
                for (i, statement) in body.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{statement}")?;
                }
                Ok(())
            }
            Self::VariableDeclaration(decl, _) => {
                let keyword = if decl.constant { "const" } else { "let" };
                match &decl.value {
                    Some(value) => write!(f, "{keyword} {} = {value};", decl.name.name),
                    None => write!(f, "{keyword} {};", decl.name.name),
                }
            }
            Self::Assignment(operands, _) => write!(f, "{} = {}", operands.0, operands.1),
            Self::BinaryOperation(op, operands, _) => {
                write!(f, "({} {op} {})", operands.0, operands.1)
            }
            Self::Identifier(name) => write!(f, "{}", name.name),
            Self::NumericLiteral(value, _) => write!(f, "{value}"),
            Self::ObjectLiteral(properties, _) => {
                if properties.is_empty() {
                    return write!(f, "{{}}");
                }
                let entries: Vec<String> = properties.iter().map(|p| p.to_string()).collect();
                write!(f, "{{ {} }}", entries.join(", "))
            }
            Self::Property(property) => write!(f, "{property}"),
        }
    }
}
