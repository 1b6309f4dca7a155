use std::cell::RefCell;
use std::rc::Rc;

use minilang::Engine;

fn engine_capturing_output() -> (Engine, Rc<RefCell<Vec<String>>>) {
    let output = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&output);
    let engine = Engine::with_io(
        Box::new(move |line: &str| sink.borrow_mut().push(line.to_string())),
        Box::new(|_| {}),
        Box::new(|| None),
    );
    (engine, output)
}

#[test]
fn precedence_and_power_associativity() {
    let (engine, output) = engine_capturing_output();
    engine.eval("print(1 + 2 * 3)").unwrap();
    engine.eval("print(2 ** 3 ** 2)").unwrap();
    engine.eval("print((1 + 2) * 3)").unwrap();
    assert_eq!(*output.borrow(), vec!["7", "512", "9"]);
}

#[test]
fn division_by_zero_is_a_runtime_error_with_position() {
    let (engine, _output) = engine_capturing_output();
    let err = engine.eval("print(1/0)").unwrap_err();
    assert!(err.message.contains("Division by zero"));
}

#[test]
fn modulo_by_zero_is_a_runtime_error() {
    let (engine, _output) = engine_capturing_output();
    let err = engine.eval("print(1 % 0)").unwrap_err();
    assert!(err.message.contains("Modulo by zero"));
}

#[test]
fn string_concat_coerces_numbers() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print("x=" + 5)"#).unwrap();
    assert_eq!(output.borrow()[0], "x=5");
}

#[test]
fn string_and_array_repetition_via_multiply() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print("ab" * 3)"#).unwrap();
    engine.eval("print([1, 2] * 2)").unwrap();
    assert_eq!(output.borrow()[0], "ababab");
    assert_eq!(output.borrow()[1], "[1, 2, 1, 2]");
}

#[test]
fn short_circuit_and_or_do_not_evaluate_the_right_operand() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            func side_effect() { print("called"); return true }
            false and side_effect()
            true or side_effect()
            "#,
        )
        .unwrap();
    assert!(output.borrow().is_empty(), "right operand must not run: {:?}", output.borrow());
}

#[test]
fn and_or_return_the_deciding_value_not_a_coerced_boolean() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print(0 or "fallback")"#).unwrap();
    engine.eval("print(5 and 10)").unwrap();
    assert_eq!(output.borrow()[0], "fallback");
    assert_eq!(output.borrow()[1], "10");
}
