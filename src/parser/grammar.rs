// # ============================ THE GRAMMAR ============================
//
// program       := statement* ENDMARKER
// statement     := var_decl | expr_stmt
// var_decl      := ("let" | "const") NAME (";" | "=" expression ";")
// expr_stmt     := assignment ";"?
// assignment    := object ("=" assignment)?
// object        := "{" (NAME (":" expression)? ","?)* "}" | additive
// additive      := multiplicative (("+" | "-") multiplicative)*
// multiplicative:= primary (("*" | "/" | "%") primary)*
// primary       := NAME | NUMBER | "(" additive ")"
//
// Each rule below is a method on `Parser`; tokens are consumed front to back with a single
// token of lookahead.

use std::collections::VecDeque;

use log::trace;

use super::ast::*;
use super::locations::Locatable;
use super::tokenizer::{Token, TokenType as TT};
use crate::error::{Error, Result};

/// Parses a complete token stream into a `Node::Program`.
pub fn parse(tokens: &[Token]) -> Result<Node> {
    Parser::new(tokens.to_vec()).program()
}

pub(crate) struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = VecDeque::from(tokens);
        // A stream without an ENDMARKER would make the lookahead run dry.
        if tokens.back().map(|t| t.typ) != Some(TT::ENDMARKER) {
            let span = tokens.back().map(|t| t.span).unwrap_or_default();
            tokens.push_back(Token {
                typ: TT::ENDMARKER,
                lexeme: "".to_string(),
                span,
            });
        }
        Self { tokens }
    }

    fn current(&self) -> &Token {
        // The ENDMARKER is never popped, so the queue is never empty.
        &self.tokens[0]
    }

    fn at(&self, typ: TT) -> bool {
        self.current().typ == typ
    }

    fn at_operator(&self, symbols: &[&str]) -> bool {
        self.at(TT::OPERATOR) && symbols.contains(&self.current().lexeme.as_str())
    }

    fn advance(&mut self) -> Token {
        if self.at(TT::ENDMARKER) {
            return self.current().clone();
        }
        self.tokens.pop_front().unwrap_or_default()
    }

    fn expect(&mut self, typ: TT, msg: &str) -> Result<Token> {
        if self.at(typ) {
            Ok(self.advance())
        } else {
            Err(Error::parse(self.current().span, msg))
        }
    }

    // program: statement* ENDMARKER
    pub(crate) fn program(&mut self) -> Result<Node> {
        let start = self.current().span;
        let mut body = vec![];
        while !self.at(TT::ENDMARKER) {
            body.push(self.statement()?);
        }
        let span = start.till(self.current());
        trace!("parsed program with {} statements", body.len());
        Ok(Node::Program(body, span))
    }

    // statement: var_decl | expr_stmt
    fn statement(&mut self) -> Result<Node> {
        match self.current().typ {
            TT::LET | TT::CONST => self.variable_declaration(),
            _ => self.expression_statement(),
        }
    }

    // expr_stmt: assignment ";"?
    fn expression_statement(&mut self) -> Result<Node> {
        let expr = self.assignment()?;
        if self.at(TT::SEMI) {
            self.advance();
        }
        Ok(expr)
    }

    // var_decl: ("let" | "const") NAME (";" | "=" expression ";")
    fn variable_declaration(&mut self) -> Result<Node> {
        let keyword = self.advance();
        let constant = keyword.typ == TT::CONST;
        let name: Name = self
            .expect(
                TT::NAME,
                &format!("Expected identifier name after '{}' keyword", keyword.lexeme),
            )?
            .into();

        if self.at(TT::SEMI) {
            let semi = self.advance();
            if constant {
                return Err(Error::parse(
                    name.span,
                    &format!("Constant '{}' must be initialized with a value", name.name),
                ));
            }
            return Ok(Node::VariableDeclaration(
                VariableDeclaration {
                    name,
                    value: None,
                    constant,
                },
                keyword.span.till(&semi),
            ));
        }

        self.expect(
            TT::EQUAL,
            &format!("Expected '=' after identifier name '{}'", name.name),
        )?;
        let value = self.assignment()?;
        let semi = self.expect(
            TT::SEMI,
            &format!("Expected ';' after variable declaration '{}'", name.name),
        )?;
        Ok(Node::VariableDeclaration(
            VariableDeclaration {
                name,
                value: Some(Box::new(value)),
                constant,
            },
            keyword.span.till(&semi),
        ))
    }

    // assignment: object ("=" assignment)?
    fn assignment(&mut self) -> Result<Node> {
        let target = self.object()?;
        if self.at(TT::EQUAL) {
            self.advance();
            let value = self.assignment()?;
            let span = target.span().till(&value);
            return Ok(Node::Assignment(Box::new((target, value)), span));
        }
        Ok(target)
    }

    // object: "{" (NAME (":" expression)? ","?)* "}" | additive
    fn object(&mut self) -> Result<Node> {
        if !self.at(TT::LBRACE) {
            return self.additive();
        }
        let open = self.advance();
        let mut properties = vec![];

        while !self.at(TT::ENDMARKER) && !self.at(TT::RBRACE) {
            let key: Name = self
                .expect(TT::NAME, "Expected a property key in object literal")?
                .into();

            // shorthand: { key, } or { key }
            if self.at(TT::COMMA) || self.at(TT::RBRACE) {
                if self.at(TT::COMMA) {
                    self.advance();
                }
                properties.push(Property {
                    key: key.name,
                    value: None,
                    span: key.span,
                });
                continue;
            }

            self.expect(
                TT::COLON,
                &format!("Expected ':' after property key '{}'", key.name),
            )?;
            let value = self.assignment()?;
            let span = key.span.till(&value);
            if !self.at(TT::RBRACE) {
                self.expect(
                    TT::COMMA,
                    &format!("Expected ',' or '}}' after property '{}'", key.name),
                )?;
            }
            properties.push(Property {
                key: key.name,
                value: Some(Box::new(value)),
                span,
            });
        }

        let close = self.expect(TT::RBRACE, "Expected '}' to close object literal")?;
        Ok(Node::ObjectLiteral(properties, open.span.till(&close)))
    }

    // additive: multiplicative (("+" | "-") multiplicative)*
    fn additive(&mut self) -> Result<Node> {
        let mut left = self.multiplicative()?;
        while self.at_operator(&["+", "-"]) {
            let op = self.advance().lexeme;
            let right = self.multiplicative()?;
            let span = left.span().till(&right);
            left = Node::BinaryOperation(op, Box::new((left, right)), span);
        }
        Ok(left)
    }

    // multiplicative: primary (("*" | "/" | "%") primary)*
    fn multiplicative(&mut self) -> Result<Node> {
        let mut left = self.primary()?;
        while self.at_operator(&["*", "/", "%"]) {
            let op = self.advance().lexeme;
            let right = self.primary()?;
            let span = left.span().till(&right);
            left = Node::BinaryOperation(op, Box::new((left, right)), span);
        }
        Ok(left)
    }

    // primary: NAME | NUMBER | "(" additive ")"
    fn primary(&mut self) -> Result<Node> {
        match self.current().typ {
            TT::NAME => Ok(Node::Identifier(self.advance().into())),
            TT::NUMBER => {
                let token = self.advance();
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    Error::parse(token.span, &format!("Invalid number literal '{}'", token.lexeme))
                })?;
                Ok(Node::NumericLiteral(value, token.span))
            }
            TT::LPAR => {
                self.advance();
                let inner = self.additive()?;
                self.expect(
                    TT::RPAR,
                    &format!("Unexpected token {}, expected ')'", self.current()),
                )?;
                Ok(inner)
            }
            _ => Err(Error::parse(
                self.current().span,
                &format!("Unexpected token {} found during parsing", self.current()),
            )),
        }
    }
}

