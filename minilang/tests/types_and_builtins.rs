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
fn type_reports_the_declared_kind_of_every_literal() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print(type(null))"#).unwrap();
    engine.eval(r#"print(type(true))"#).unwrap();
    engine.eval(r#"print(type(1))"#).unwrap();
    engine.eval(r#"print(type(1.5))"#).unwrap();
    engine.eval(r#"print(type("s"))"#).unwrap();
    engine.eval(r#"print(type([1]))"#).unwrap();
    engine.eval(r#"func f() {} print(type(f))"#).unwrap();
    assert_eq!(
        *output.borrow(),
        vec!["null", "boolean", "integer", "float", "string", "array", "function"]
    );
}

#[test]
fn cross_kind_equality_is_always_false() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print(1 == "1")"#).unwrap();
    engine.eval("print(true == 1)").unwrap();
    assert_eq!(*output.borrow(), vec!["false", "false"]);
}

#[test]
fn int_and_float_conversions() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print(int("42"))"#).unwrap();
    engine.eval("print(int(3.9))").unwrap();
    engine.eval("print(float(2))").unwrap();
    engine.eval("print(int(true))").unwrap();
    assert_eq!(*output.borrow(), vec!["42", "3", "2.0", "1"]);
}

#[test]
fn min_and_max_are_variadic() {
    let (engine, output) = engine_capturing_output();
    engine.eval("print(min(3, 1, 2))").unwrap();
    engine.eval("print(max(3, 1, 2))").unwrap();
    assert_eq!(*output.borrow(), vec!["1", "3"]);
}

#[test]
fn sqrt_floor_ceil_abs() {
    let (engine, output) = engine_capturing_output();
    engine.eval("print(sqrt(9))").unwrap();
    engine.eval("print(floor(1.7))").unwrap();
    engine.eval("print(ceil(1.2))").unwrap();
    engine.eval("print(abs(-5))").unwrap();
    assert_eq!(*output.borrow(), vec!["3.0", "1", "2", "5"]);
}

#[test]
fn len_works_on_strings_and_arrays() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print(len("hello"))"#).unwrap();
    engine.eval("print(len([1, 2, 3]))").unwrap();
    assert_eq!(*output.borrow(), vec!["5", "3"]);
}

#[test]
fn input_builtin_reads_an_injected_line_and_writes_the_prompt_without_a_newline() {
    let output = Rc::new(RefCell::new(Vec::new()));
    let prompts = Rc::new(RefCell::new(Vec::new()));
    let print_sink = Rc::clone(&output);
    let prompt_sink = Rc::clone(&prompts);
    let engine = Engine::with_io(
        Box::new(move |line: &str| print_sink.borrow_mut().push(line.to_string())),
        Box::new(move |text: &str| prompt_sink.borrow_mut().push(text.to_string())),
        Box::new(|| Some("42".to_string())),
    );
    engine.eval(r#"print(input("enter: "))"#).unwrap();
    assert_eq!(*output.borrow(), vec!["42"]);
    assert_eq!(*prompts.borrow(), vec!["enter: "]);
}

#[test]
fn input_on_eof_yields_an_empty_string() {
    let engine = Engine::with_io(Box::new(|_| {}), Box::new(|_| {}), Box::new(|| None));
    let value = engine.eval("input()").unwrap();
    assert_eq!(value.to_string(), "");
}
