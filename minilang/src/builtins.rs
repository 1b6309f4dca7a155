//! The fixed built-in function table (spec §4.5).
//!
//! Every entry is a bare `fn` pointer: builtins never close over state, so
//! there is no need for `Rc<dyn Fn>` here, unlike `Function`'s captured
//! environment.

use std::rc::Rc;

use crate::value::{Builtin, Value};

fn arity_error(name: &str, expected: &str, got: usize) -> String {
    format!("'{name}' expects {expected} argument(s), got {got}")
}

fn type_error(name: &str, detail: &str) -> String {
    format!("'{name}': {detail}")
}

fn len(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
        Value::Array(a) => Ok(Value::Integer(a.borrow().len() as i64)),
        other => Err(type_error("len", &format!("expected string or array, got {}", other.type_name()))),
    }
}

fn type_of(args: &[Value]) -> Result<Value, String> {
    Ok(Value::string(args[0].type_name()))
}

fn str_of(args: &[Value]) -> Result<Value, String> {
    Ok(Value::string(args[0].to_string()))
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn int_of(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => Ok(Value::Integer(*f as i64)),
        Value::String(s) => parse_numeric_text(s)
            .map(|v| Value::Integer(v as i64))
            .ok_or_else(|| type_error("int", &format!("cannot parse '{s}' as a number"))),
        other => Err(type_error("int", &format!("cannot convert {} to integer", other.type_name()))),
    }
}

fn float_of(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::String(s) => parse_numeric_text(s)
            .map(Value::Float)
            .ok_or_else(|| type_error("float", &format!("cannot parse '{s}' as a number"))),
        other => Err(type_error("float", &format!("cannot convert {} to float", other.type_name()))),
    }
}

fn abs(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(i.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_error("abs", &format!("expected a number, got {}", other.type_name()))),
    }
}

fn numeric_as_f64(value: &Value, name: &str) -> Result<f64, String> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(type_error(name, &format!("expected a number, got {}", other.type_name()))),
    }
}

fn min(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err(arity_error("min", "at least 1", 0));
    }
    let mut best = args[0].clone();
    let mut best_f = numeric_as_f64(&best, "min")?;
    for candidate in &args[1..] {
        let f = numeric_as_f64(candidate, "min")?;
        if f < best_f {
            best_f = f;
            best = candidate.clone();
        }
    }
    Ok(best)
}

fn max(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err(arity_error("max", "at least 1", 0));
    }
    let mut best = args[0].clone();
    let mut best_f = numeric_as_f64(&best, "max")?;
    for candidate in &args[1..] {
        let f = numeric_as_f64(candidate, "max")?;
        if f > best_f {
            best_f = f;
            best = candidate.clone();
        }
    }
    Ok(best)
}

fn push(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Array(a) => {
            a.borrow_mut().push(args[1].clone());
            Ok(Value::Array(Rc::clone(a)))
        }
        other => Err(type_error("push", &format!("expected an array, got {}", other.type_name()))),
    }
}

fn pop(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Array(a) => a.borrow_mut().pop().ok_or_else(|| type_error("pop", "array is empty")),
        other => Err(type_error("pop", &format!("expected an array, got {}", other.type_name()))),
    }
}

fn range(args: &[Value]) -> Result<Value, String> {
    let as_int = |v: &Value| match v {
        Value::Integer(i) => Ok(*i),
        other => Err(type_error("range", &format!("expected an integer, got {}", other.type_name()))),
    };

    let (start, stop, step) = match args.len() {
        0 => return Err(arity_error("range", "1 to 3", 0)),
        1 => (0, as_int(&args[0])?, 1),
        2 => (as_int(&args[0])?, as_int(&args[1])?, 1),
        _ => (as_int(&args[0])?, as_int(&args[1])?, as_int(&args[2])?),
    };

    if step == 0 {
        return Err(type_error("range", "step must not be zero"));
    }

    let mut values = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            values.push(Value::Integer(i));
            i += step;
        }
    } else {
        while i > stop {
            values.push(Value::Integer(i));
            i += step;
        }
    }
    Ok(Value::array(values))
}

fn sqrt(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Float(numeric_as_f64(&args[0], "sqrt")?.sqrt()))
}

fn floor(args: &[Value]) -> Result<Value, String> {
    // `math.floor`/`math.ceil` return `int` in the original (interpreter.py:263-275).
    Ok(Value::Integer(numeric_as_f64(&args[0], "floor")?.floor() as i64))
}

fn ceil(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Integer(numeric_as_f64(&args[0], "ceil")?.ceil() as i64))
}

/// `input` needs access to the engine's injected reader/writer, which a bare
/// `fn` pointer cannot capture. Its table entry exists only so the name
/// resolves through `Environment::get` like any other builtin; `Engine`
/// intercepts calls to it before this handler would ever run.
fn input_unreachable(_args: &[Value]) -> Result<Value, String> {
    unreachable!("Engine special-cases calls to 'input' before builtin dispatch")
}

/// Builds the fixed table of builtins installed into the global environment
/// at `Engine` construction (spec §4.5's table).
pub(crate) fn table() -> Vec<(&'static str, Rc<Builtin>)> {
    macro_rules! entry {
        ($name:literal, $arity:expr, $handler:expr) => {
            ($name, Rc::new(Builtin { name: $name, arity: $arity, handler: $handler }))
        };
    }

    vec![
        entry!("len", 1, len),
        entry!("type", 1, type_of),
        entry!("str", 1, str_of),
        entry!("int", 1, int_of),
        entry!("float", 1, float_of),
        entry!("abs", 1, abs),
        entry!("min", -1, min),
        entry!("max", -1, max),
        entry!("push", 2, push),
        entry!("pop", 1, pop),
        entry!("range", -1, range),
        entry!("sqrt", 1, sqrt),
        entry!("floor", 1, floor),
        entry!("ceil", 1, ceil),
        entry!("input", -1, input_unreachable),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_one_argument_starts_at_zero() {
        let Value::Array(a) = range(&[Value::Integer(3)]).unwrap() else { panic!() };
        let values: Vec<i64> = a.borrow().iter().map(|v| match v {
            Value::Integer(i) => *i,
            _ => unreachable!(),
        }).collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn range_ignores_extra_arguments_past_three() {
        let a = range(&[Value::Integer(0), Value::Integer(3), Value::Integer(1), Value::Integer(99)]).unwrap();
        assert!(matches!(a, Value::Array(_)));
    }

    #[test]
    fn pop_on_empty_array_fails() {
        assert!(pop(&[Value::array(vec![])]).is_err());
    }

    #[test]
    fn min_max_are_variadic() {
        let args = vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)];
        match min(&args).unwrap() {
            Value::Integer(1) => {}
            other => panic!("{other:?}"),
        }
        match max(&args).unwrap() {
            Value::Integer(3) => {}
            other => panic!("{other:?}"),
        }
    }
}
