use log::{info, trace};

use crate::error::{Error, Result};
use crate::parser::{self, Node, Property};

mod environment;
mod value;

pub use environment::{Environment, ScopeId};
pub use value::{Function, NativeFn, Object, Value};

/// Evaluates `node` in `scope`, returning the value it produces. Declarations and assignments
/// write into `env`; every other node only reads from it.
pub fn evaluate(node: &Node, env: &mut Environment, scope: ScopeId) -> Result<Value> {
    trace!("evaluating {} in scope {:?}", node.kind(), scope);
    match node {
        Node::NumericLiteral(value, _) => Ok(Value::Number(*value)),
        Node::Identifier(name) => env.lookup(scope, &name.name),
        Node::ObjectLiteral(properties, _) => evaluate_object(properties, env, scope),
        Node::BinaryOperation(op, operands, _) => {
            let left = evaluate(&operands.0, env, scope)?;
            let right = evaluate(&operands.1, env, scope)?;
            match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => evaluate_numeric_operation(op, l, r).map(Value::Number),
                _ => {
                    trace!(
                        "{} {op} {} is not numeric, yielding null",
                        left.type_name(),
                        right.type_name()
                    );
                    Ok(Value::Null)
                }
            }
        }
        Node::VariableDeclaration(decl, _) => {
            let value = match &decl.value {
                Some(expr) => evaluate(expr, env, scope)?,
                None => Value::Null,
            };
            env.declare(scope, &decl.name.name, value, decl.constant)
        }
        Node::Assignment(operands, _) => {
            let (target, value) = operands.as_ref();
            let Node::Identifier(name) = target else {
                return Err(Error::InvalidAssignmentTarget(target.to_string()));
            };
            let value = evaluate(value, env, scope)?;
            env.assign(scope, &name.name, value)
        }
        Node::Program(body, _) => {
            let mut last = Value::Null;
            for statement in body {
                last = evaluate(statement, env, scope)?;
            }
            Ok(last)
        }
        Node::Property(_) => Err(Error::UnsupportedNode(node.kind())),
    }
}

fn evaluate_numeric_operation(op: &str, left: f64, right: f64) -> Result<f64> {
    match op {
        "+" => Ok(left + right),
        "-" => Ok(left - right),
        "*" => Ok(left * right),
        // Division by zero is left to IEEE 754: inf or NaN.
        "/" => Ok(left / right),
        "%" => Ok(integer_remainder(left, right)),
        _ => Err(Error::UnsupportedOperator(op.to_string())),
    }
}

/// C-style integer remainder: both operands are truncated toward zero first and the result
/// takes the sign of the dividend. The remainder is taken in f64, so operands beyond the i64
/// range stay exact; a zero divisor or a NaN operand yields NaN.
fn integer_remainder(left: f64, right: f64) -> f64 {
    left.trunc() % right.trunc()
}

/// Properties are evaluated in order inside a nested scope that is released afterwards.
fn evaluate_object(properties: &[Property], env: &mut Environment, scope: ScopeId) -> Result<Value> {
    let inner = env.child(scope)?;
    let result = build_object(properties, env, inner);
    env.release(inner);
    result.map(Value::Object)
}

fn build_object(properties: &[Property], env: &mut Environment, scope: ScopeId) -> Result<Object> {
    let mut object = Object::new();
    for property in properties {
        let value = match &property.value {
            Some(expr) => evaluate(expr, env, scope)?,
            None => env.lookup(scope, &property.key)?,
        };
        object.insert(&property.key, value);
    }
    Ok(object)
}

/// A session that keeps its global scope alive across runs, so a REPL can declare a variable
/// on one line and use it on the next.
#[derive(Debug, Default)]
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        info!("starting interpreter session");
        Self {
            env: Environment::new(),
        }
    }

    /// Tokenizes, parses and evaluates `source` in the global scope.
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let tokens = parser::tokenize(source)?;
        let program = parser::parse(&tokens)?;
        self.evaluate(&program)
    }

    pub fn evaluate(&mut self, node: &Node) -> Result<Value> {
        let global = self.env.global();
        evaluate(node, &mut self.env, global)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.env.lookup(self.env.global(), name)
    }
}

#[cfg(test)]
mod test;
