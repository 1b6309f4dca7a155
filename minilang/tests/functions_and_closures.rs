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
fn recursive_fibonacci() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            func fib(n) { if n <= 1 { return n } return fib(n-1) + fib(n-2) }
            print(fib(10))
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "55");
}

#[test]
fn closure_counter_captures_and_mutates_outer_local() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            func make() {
                let c = 0
                func inc() { c = c + 1; return c }
                return inc
            }
            let f = make()
            print(f())
            print(f())
            print(f())
            "#,
        )
        .unwrap();
    assert_eq!(*output.borrow(), vec!["1", "2", "3"]);
}

#[test]
fn mutual_recursion_within_the_same_scope() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            func is_even(n) { if n == 0 { return true } return is_odd(n - 1) }
            func is_odd(n) { if n == 0 { return false } return is_even(n - 1) }
            print(is_even(10))
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "true");
}

#[test]
fn call_target_must_be_a_bare_identifier() {
    let (engine, _output) = engine_capturing_output();
    assert!(engine.eval("func f() { return 1 } (f)()").is_err());
}

#[test]
fn function_arity_mismatch_is_a_runtime_error() {
    let (engine, _output) = engine_capturing_output();
    let err = engine.eval("func add(a, b) { return a + b }\nadd(1)").unwrap_err();
    assert!(err.message.contains("expects"));
}

#[test]
fn block_scoped_let_is_invisible_outside_the_block() {
    let (engine, _output) = engine_capturing_output();
    let err = engine
        .eval(
            r#"
            if true { let x = 1 }
            print(x)
            "#,
        )
        .unwrap_err();
    assert!(err.message.contains("undefined variable"));
}

#[test]
fn reassignment_without_let_mutates_the_enclosing_binding() {
    let (engine, output) = engine_capturing_output();
    engine
        .eval(
            r#"
            let x = 1
            func bump() { x = x + 1 }
            bump()
            bump()
            print(x)
            "#,
        )
        .unwrap();
    assert_eq!(output.borrow()[0], "3");
}
