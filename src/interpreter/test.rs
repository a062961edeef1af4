use pretty_assertions::assert_eq;

use super::{evaluate, Environment, Function, Interpreter, Object, Value};
use crate::error::Error;
use crate::parser::{Node, Property};

fn run(input: &str) -> Result<Value, Error> {
    Interpreter::new().run(input)
}

fn evaluates_to(input: &str, expected: Value) {
    match run(input) {
        Ok(value) => assert_eq!(value, expected, "evaluating \"{input}\""),
        Err(err) => panic!("evaluating \"{input}\" failed: {err}"),
    }
}

fn assert_raises(input: &str, expected: Error) {
    assert_eq!(run(input), Err(expected), "evaluating \"{input}\"");
}

fn eval_node(node: Node) -> Result<Value, Error> {
    let mut env = Environment::new();
    let global = env.global();
    evaluate(&node, &mut env, global)
}

#[test]
fn test_arithmetic_precedence() {
    evaluates_to("let x = 2 + 3 * 4; x", Value::Number(14.0));
    evaluates_to("(2 + 3) * 4", Value::Number(20.0));
    evaluates_to("10 - 4 - 3", Value::Number(3.0));
    evaluates_to("7 / 2", Value::Number(3.5));
    evaluates_to("0 - 5", Value::Number(-5.0));
}

#[test]
fn test_modulo_truncates_operands() {
    assert_eq!(
        eval_node(Node::binary("%", Node::number(5.7), Node::number(2.0))),
        Ok(Value::Number(1.0))
    );
    assert_eq!(
        eval_node(Node::binary("%", Node::number(-7.0), Node::number(3.0))),
        Ok(Value::Number(-1.0))
    );
    assert_eq!(
        eval_node(Node::binary("%", Node::number(9.0), Node::number(-2.9))),
        Ok(Value::Number(1.0))
    );
    evaluates_to("17 % 5", Value::Number(2.0));
}

#[test]
fn test_modulo_beyond_integer_range() {
    // 99999999999999999999 rounds to 1e20, which is 2 modulo 7.
    evaluates_to("99999999999999999999 % 7", Value::Number(2.0));
    evaluates_to("7 % 99999999999999999999", Value::Number(7.0));
    assert_eq!(
        eval_node(Node::binary("%", Node::number(-1e19), Node::number(3.0))),
        Ok(Value::Number(-1.0))
    );
}

#[test]
fn test_modulo_propagates_nan() {
    let nan = run("(0 / 0) % 2").unwrap();
    assert!(matches!(nan, Value::Number(n) if n.is_nan()));
    let nan = eval_node(Node::binary("%", Node::number(5.0), Node::number(f64::NAN))).unwrap();
    assert!(matches!(nan, Value::Number(n) if n.is_nan()));
}

#[test]
fn test_division_by_zero_is_not_trapped() {
    evaluates_to("1 / 0", Value::Number(f64::INFINITY));
    let nan = run("0 / 0").unwrap();
    assert!(matches!(nan, Value::Number(n) if n.is_nan()));
    let nan = run("3 % 0").unwrap();
    assert!(matches!(nan, Value::Number(n) if n.is_nan()));
}

#[test]
fn test_non_numeric_operands_yield_null() {
    assert_eq!(
        eval_node(Node::binary("+", Node::object(vec![]), Node::number(1.0))),
        Ok(Value::Null)
    );
    evaluates_to("let o = {}; o + 1", Value::Null);
    evaluates_to("1 * true", Value::Null);
    evaluates_to("null - null", Value::Null);
    evaluates_to("let o = { a: 1 }; o % 2", Value::Null);
}

#[test]
fn test_unsupported_operator() {
    assert_eq!(
        eval_node(Node::binary("^", Node::number(2.0), Node::number(3.0))),
        Err(Error::UnsupportedOperator("^".to_string()))
    );
    // Non-numeric operands short-circuit to null before the operator is looked at.
    assert_eq!(
        eval_node(Node::binary("^", Node::object(vec![]), Node::number(3.0))),
        Ok(Value::Null)
    );
}

#[test]
fn test_predefined_constants() {
    evaluates_to("true", Value::Bool(true));
    evaluates_to("false", Value::Bool(false));
    evaluates_to("null", Value::Null);
    assert_raises("true = 1", Error::ConstAssignment("true".to_string()));
    assert_raises("let null = 1;", Error::Redeclaration("null".to_string()));
}

#[test]
fn test_declarations() {
    evaluates_to("let a;", Value::Null);
    evaluates_to("let a; a", Value::Null);
    evaluates_to("let a = 3;", Value::Number(3.0));
    evaluates_to("const c = 1; c + 1", Value::Number(2.0));
}

#[test]
fn test_const_assignment_fails() {
    assert_raises("const c = 1; c = 2;", Error::ConstAssignment("c".to_string()));
}

#[test]
fn test_redeclaration_fails() {
    assert_raises("let a = 1; let a = 2;", Error::Redeclaration("a".to_string()));
    assert_raises("let a = 1; const a = 2;", Error::Redeclaration("a".to_string()));
}

#[test]
fn test_unresolved_name() {
    assert_raises("y", Error::UnresolvedName("y".to_string()));
    assert_raises("y = 1", Error::UnresolvedName("y".to_string()));
    assert_raises("{ k }", Error::UnresolvedName("k".to_string()));
}

#[test]
fn test_assignment() {
    evaluates_to("let a = 1; a = a + 1; a", Value::Number(2.0));
    evaluates_to("let a; let b; a = b = 5; a + b", Value::Number(10.0));
    evaluates_to("let a = 1; a = 7", Value::Number(7.0));
}

#[test]
fn test_invalid_assignment_target() {
    assert_raises("1 = 2", Error::InvalidAssignmentTarget("1".to_string()));
    assert_raises(
        "let a = 1; a + 1 = 2",
        Error::InvalidAssignmentTarget("(a + 1)".to_string()),
    );
}

#[test]
fn test_object_literals() {
    let mut expected = Object::new();
    expected.insert("k", Value::Number(5.0));
    evaluates_to("let k = 5; { k }", Value::Object(expected));

    let result = run("let x = 1; { x, y: x + 1, z: { x } }").unwrap();
    let object = result.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    assert_eq!(object.get("y"), Some(&Value::Number(2.0)));
    assert_eq!(result.to_string(), "{ x: 1, y: 2, z: { x: 1 } }");
}

#[test]
fn test_duplicate_keys_keep_position_and_last_value() {
    let result = run("{ a: 1, b: 2, a: 3 }").unwrap();
    let object = result.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(object.get("a"), Some(&Value::Number(3.0)));
}

#[test]
fn test_object_scope_is_released() {
    let mut interpreter = Interpreter::new();
    let depth = interpreter.environment().depth();
    interpreter.run("let a = 1; { a, b: { a } }").unwrap();
    assert_eq!(interpreter.environment().depth(), depth);
    assert!(interpreter.run("{ missing }").is_err());
    assert_eq!(interpreter.environment().depth(), depth);
}

#[test]
fn test_program_yields_last_value() {
    evaluates_to("", Value::Null);
    evaluates_to("1; 2; 3", Value::Number(3.0));
    assert_eq!(eval_node(Node::program(vec![])), Ok(Value::Null));
}

#[test]
fn test_bare_property_is_unsupported() {
    assert_eq!(
        eval_node(Node::Property(Property::new("a", None))),
        Err(Error::UnsupportedNode("Property"))
    );
}

#[test]
fn test_errors_abort_the_run() {
    let mut interpreter = Interpreter::new();
    assert!(interpreter.run("let a = 1; let a = 2; let b = 3;").is_err());
    assert_eq!(interpreter.lookup("a"), Ok(Value::Number(1.0)));
    assert_eq!(
        interpreter.lookup("b"),
        Err(Error::UnresolvedName("b".to_string()))
    );
}

#[test]
fn test_session_persists_between_runs() {
    let mut interpreter = Interpreter::new();
    interpreter.run("let counter = 1;").unwrap();
    interpreter.run("counter = counter * 10;").unwrap();
    assert_eq!(interpreter.run("counter"), Ok(Value::Number(10.0)));
}

#[test]
fn test_shadowing_in_nested_scope() {
    let mut env = Environment::new();
    let global = env.global();
    env.declare(global, "a", Value::Number(1.0), false).unwrap();

    let inner = env.child(global).unwrap();
    assert_eq!(
        env.declare(inner, "a", Value::Number(2.0), true),
        Ok(Value::Number(2.0))
    );
    assert_eq!(env.lookup(inner, "a"), Ok(Value::Number(2.0)));
    assert_eq!(env.resolve(inner, "a"), Ok(inner));
    assert_eq!(env.lookup(global, "a"), Ok(Value::Number(1.0)));

    env.release(inner);
    assert_eq!(env.lookup(global, "a"), Ok(Value::Number(1.0)));
}

#[test]
fn test_scope_parents() {
    let mut env = Environment::new();
    let global = env.global();
    let inner = env.child(global).unwrap();
    let innermost = env.child(inner).unwrap();
    assert_eq!(env.parent(global), None);
    assert_eq!(env.parent(inner), Some(global));
    assert_eq!(env.parent(innermost), Some(inner));
    assert_eq!(env.depth(), 3);

    env.release(inner);
    assert_eq!(env.depth(), 1);
    assert_eq!(env.parent(innermost), None);
}

#[test]
fn test_released_scope_handles_stay_invalid() {
    let mut env = Environment::new();
    let global = env.global();
    let first = env.child(global).unwrap();
    env.release(first);

    let second = env.child(global).unwrap();
    assert_ne!(first, second);
    env.declare(second, "y", Value::Number(1.0), false).unwrap();
    assert_eq!(env.lookup(second, "y"), Ok(Value::Number(1.0)));
    assert_eq!(env.lookup(first, "y"), Err(Error::StaleScope(first)));
    assert_eq!(
        env.declare(first, "z", Value::Null, false),
        Err(Error::StaleScope(first))
    );
    assert_eq!(env.child(first), Err(Error::StaleScope(first)));

    // Releasing the old handle must not drop the scope now living in its slot.
    env.release(first);
    assert_eq!(env.lookup(second, "y"), Ok(Value::Number(1.0)));

    env.release(second);
    assert_eq!(
        env.assign(second, "y", Value::Null),
        Err(Error::StaleScope(second))
    );
    assert_eq!(env.is_constant(second, "true"), Err(Error::StaleScope(second)));
    assert_eq!(env.lookup(global, "true"), Ok(Value::Bool(true)));
}

#[test]
fn test_global_scope_cannot_be_released() {
    let mut env = Environment::new();
    let global = env.global();
    env.release(global);
    assert_eq!(env.depth(), 1);
    assert_eq!(env.lookup(global, "null"), Ok(Value::Null));
}

#[test]
fn test_assignment_writes_owning_scope() {
    let mut env = Environment::new();
    let global = env.global();
    env.declare(global, "a", Value::Number(1.0), false).unwrap();
    let inner = env.child(global).unwrap();

    env.assign(inner, "a", Value::Number(5.0)).unwrap();
    assert_eq!(env.resolve(inner, "a"), Ok(global));
    assert_eq!(env.lookup(global, "a"), Ok(Value::Number(5.0)));

    let node = Node::assignment(Node::identifier("a"), Node::number(9.0));
    assert_eq!(evaluate(&node, &mut env, inner), Ok(Value::Number(9.0)));
    assert_eq!(env.lookup(global, "a"), Ok(Value::Number(9.0)));
}

#[test]
fn test_constness_belongs_to_the_binding() {
    let mut env = Environment::new();
    let global = env.global();
    env.declare(global, "a", Value::Number(1.0), true).unwrap();
    let inner = env.child(global).unwrap();
    env.declare(inner, "b", env.lookup(global, "a").unwrap(), false)
        .unwrap();

    assert_eq!(env.is_constant(inner, "a"), Ok(true));
    assert_eq!(env.is_constant(inner, "b"), Ok(false));
    assert_eq!(env.assign(inner, "b", Value::Null), Ok(Value::Null));
    assert_eq!(
        env.assign(inner, "a", Value::Null),
        Err(Error::ConstAssignment("a".to_string()))
    );
}

#[test]
fn test_host_functions_are_opaque_values() {
    fn answer(_: &[Value]) -> Value {
        Value::Number(42.0)
    }
    let mut interpreter = Interpreter::new();
    let global = interpreter.environment().global();
    interpreter
        .environment_mut()
        .declare(
            global,
            "answer",
            Value::Function(Function::native("answer", answer)),
            true,
        )
        .unwrap();

    let value = interpreter.run("let f = answer; f").unwrap();
    assert_eq!(value.to_string(), "<function answer>");
    match value {
        Value::Function(f) => assert_eq!(f.call(&[]), Value::Number(42.0)),
        other => panic!("expected a function, got {other:?}"),
    }
    assert_eq!(interpreter.run("answer + 1"), Ok(Value::Null));
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Bool(false).to_string(), "false");
    assert_eq!(Value::Number(14.0).to_string(), "14");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
    assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    assert_eq!(Value::Object(Object::new()).to_string(), "{}");
}

#[test]
fn test_value_accessors() {
    assert_eq!(Value::Number(3.0).as_number(), Some(3.0));
    assert_eq!(Value::Bool(true).as_number(), None);
    assert_eq!(Value::Null.type_name(), "null");
    assert_eq!(Value::Bool(true).type_name(), "bool");
    assert_eq!(Value::Number(1.0).type_name(), "number");
    assert_eq!(Value::Object(Object::new()).type_name(), "object");
    fn noop(_: &[Value]) -> Value {
        Value::Null
    }
    assert_eq!(
        Value::Function(Function::native("noop", noop)).type_name(),
        "function"
    );
}
