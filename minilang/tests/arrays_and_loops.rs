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
fn for_loop_mutates_array_in_place() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            let a = [0, 0, 0]
            for let i = 0; i < 3; i = i + 1 { a[i] = i * i }
            print(a)
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "[0, 1, 4]");
}

#[test]
fn arrays_are_reference_shared_across_bindings() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            let a = [1, 2, 3]
            let b = a
            push(b, 4)
            print(a)
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "[1, 2, 3, 4]");
}

#[test]
fn passing_an_array_to_a_function_aliases_it() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            func append_one(arr) { push(arr, 1) }
            let a = []
            append_one(a)
            append_one(a)
            print(a)
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "[1, 1]");
}

#[test]
fn while_loop_break_and_continue() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            let i = 0
            while i < 10 {
                i = i + 1
                if i == 3 { continue }
                if i == 6 { break }
                print(i)
            }
            "#,
        )
        .unwrap();
    assert_eq!(*output.borrow(), vec!["1", "2", "4", "5"]);
}

#[test]
fn negative_array_index_is_a_runtime_error() {
    let (engine, _output) = engine_capturing_output();
    let err = engine.eval("let a = [1, 2, 3]\nprint(a[-1])").unwrap_err();
    assert!(err.message.contains("out of range") || err.message.contains("index"));
}

#[test]
fn string_indexing_returns_a_one_character_string() {
    let (engine, output) = engine_capturing_output();
    engine.eval(r#"print("hello"[1])"#).unwrap();
    assert_eq!(output.borrow()[0], "e");
}

#[test]
fn range_builtin_generates_the_expected_sequence() {
    let (engine, output) = engine_capturing_output();
    engine.eval("print(range(5))").unwrap();
    engine.eval("print(range(2, 5))").unwrap();
    engine.eval("print(range(0, 10, 2))").unwrap();
    assert_eq!(output.borrow()[0], "[0, 1, 2, 3, 4]");
    assert_eq!(output.borrow()[1], "[2, 3, 4]");
    assert_eq!(output.borrow()[2], "[0, 2, 4, 6, 8]");
}

#[test]
fn push_and_pop_mutate_and_return() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            let a = [1, 2]
            push(a, 3)
            print(a)
            print(pop(a))
            print(a)
            "#,
        )
        .unwrap();
    assert_eq!(*output.borrow(), vec!["[1, 2, 3]", "3", "[1, 2]"]);
}
