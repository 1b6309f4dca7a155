//! The AST-walking evaluator.

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use crate::ast::{AssignOperator, BinaryOperator, Expression, Program, Statement, UnaryOperator};
use crate::environment::Environment;
use crate::error::EvalError;
use crate::parse::parse;
use crate::token::Position;
use crate::value::{Function, Value};
use crate::{builtins, Identifier};

/// Where `print` output goes: each call is one already-newline-terminated
/// line. Boxed so a host can redirect it to a string buffer, a file, or (by
/// default) standard output.
pub type OnPrintCallback = Box<dyn Fn(&str)>;

/// Where an `input()` prompt is written: raw text, no newline appended,
/// since a prompt precedes user input on the same line.
pub type OnPromptCallback = Box<dyn Fn(&str)>;

/// Where `input()` reads a line from. Returns `None` on EOF.
pub type OnInputCallback = Box<dyn FnMut() -> Option<String>>;

/// Internal, non-error control-transfer markers raised by `return`,
/// `break`, and `continue` (spec §9: "Control-flow unwinding"). `Signal`
/// never escapes `Engine` — every public entry point resolves it back into
/// a plain `Value` or an error before returning.
enum Signal {
    Return(Value),
    Break,
    Continue,
}

type ExecResult = Result<Option<Signal>, EvalError>;
type EvalResult = Result<Value, EvalError>;

/// The tree-walking evaluator. Holds the current environment and the
/// injectable I/O sinks; otherwise stateless between calls to [`Engine::eval`]
/// / [`Engine::run`].
pub struct Engine {
    globals: Rc<RefCell<Environment>>,
    on_print: OnPrintCallback,
    on_prompt: OnPromptCallback,
    on_input: RefCell<OnInputCallback>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Builds an engine that prints to standard output and reads `input()`
    /// from standard input.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(
            Box::new(|s| println!("{s}")),
            Box::new(|s| {
                use std::io::Write as _;
                print!("{s}");
                let _ = std::io::stdout().flush();
            }),
            Box::new(|| {
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) => None,
                    Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
                    Err(_) => None,
                }
            }),
        )
    }

    /// Builds an engine with injected print/prompt/input sinks, e.g. for
    /// capturing output in tests.
    #[must_use]
    pub fn with_io(on_print: OnPrintCallback, on_prompt: OnPromptCallback, on_input: OnInputCallback) -> Self {
        let globals = Environment::new_global();
        for (name, builtin) in builtins::table() {
            globals.borrow_mut().define(name.into(), Value::Builtin(builtin));
        }
        Self { globals, on_print, on_prompt, on_input: RefCell::new(on_input) }
    }

    /// Parses and evaluates `source` as a single program, returning the
    /// value of the final expression statement (or `Null`).
    pub fn eval(&self, source: &str) -> Result<Value, EvalError> {
        let program = parse(source)?;
        self.run(&program)
    }

    /// Evaluates an already-parsed program. The returned value is that of
    /// the final top-level expression statement, or `Null` if the program is
    /// empty or ends with some other statement kind.
    pub fn run(&self, program: &Program) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for stmt in &program.statements {
            last = Value::Null;
            if let Statement::ExpressionStatement { expression, .. } = stmt {
                last = self.eval_expression(expression, &self.globals)?;
                continue;
            }
            if let Some(signal) = self.exec_statement(stmt, &self.globals)? {
                match signal {
                    Signal::Return(_) => {
                        return Err(EvalError::new("'return' outside a function", stmt.position()));
                    }
                    Signal::Break | Signal::Continue => {
                        return Err(EvalError::new("'break'/'continue' outside a loop", stmt.position()));
                    }
                }
            }
        }
        Ok(last)
    }

    fn print(&self, text: &str) {
        (self.on_print)(text);
    }

    // ---- statements ----

    fn exec_block(&self, statements: &[Statement], env: &Rc<RefCell<Environment>>) -> ExecResult {
        let scope = Environment::new_child(env);
        for stmt in statements {
            if let Some(signal) = self.exec_statement(stmt, &scope)? {
                return Ok(Some(signal));
            }
        }
        Ok(None)
    }

    fn exec_statement(&self, stmt: &Statement, env: &Rc<RefCell<Environment>>) -> ExecResult {
        match stmt {
            Statement::ExpressionStatement { expression, .. } => {
                self.eval_expression(expression, env)?;
                Ok(None)
            }
            Statement::VariableDeclaration { name, initializer, .. } => {
                let value = match initializer {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Value::Null,
                };
                env.borrow_mut().define(name.clone(), value);
                Ok(None)
            }
            Statement::Block { statements, .. } => self.exec_block(statements, env),
            Statement::IfStatement { condition, then_branch, else_branch, .. } => {
                if self.eval_expression(condition, env)?.is_truthy() {
                    self.exec_statement(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.exec_statement(else_branch, env)
                } else {
                    Ok(None)
                }
            }
            Statement::WhileStatement { condition, body, .. } => {
                while self.eval_expression(condition, env)?.is_truthy() {
                    match self.exec_statement(body, env)? {
                        Some(Signal::Break) => break,
                        Some(Signal::Continue) | None => {}
                        Some(signal @ Signal::Return(_)) => return Ok(Some(signal)),
                    }
                }
                Ok(None)
            }
            Statement::ForStatement { initializer, condition, increment, body, .. } => {
                let scope = Environment::new_child(env);
                if let Some(init) = initializer {
                    if let Some(signal) = self.exec_statement(init, &scope)? {
                        return Ok(Some(signal));
                    }
                }
                loop {
                    let should_continue = match condition {
                        Some(cond) => self.eval_expression(cond, &scope)?.is_truthy(),
                        None => true,
                    };
                    if !should_continue {
                        break;
                    }

                    match self.exec_statement(body, &scope)? {
                        Some(Signal::Break) => break,
                        Some(Signal::Continue) | None => {}
                        Some(signal @ Signal::Return(_)) => return Ok(Some(signal)),
                    }

                    if let Some(incr) = increment {
                        self.eval_expression(incr, &scope)?;
                    }
                }
                Ok(None)
            }
            Statement::FunctionDeclaration { name, parameters, body, .. } => {
                let function = Function {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    body: body.clone(),
                    closure: Rc::clone(env),
                };
                env.borrow_mut().define(name.clone(), Value::Function(Rc::new(function)));
                Ok(None)
            }
            Statement::ReturnStatement { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Value::Null,
                };
                Ok(Some(Signal::Return(value)))
            }
            Statement::BreakStatement { .. } => Ok(Some(Signal::Break)),
            Statement::ContinueStatement { .. } => Ok(Some(Signal::Continue)),
            Statement::PrintStatement { arguments, .. } => {
                let mut parts = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    parts.push(self.eval_expression(arg, env)?.to_string());
                }
                self.print(&parts.join(" "));
                Ok(None)
            }
        }
    }

    // ---- expressions ----

    fn eval_expression(&self, expr: &Expression, env: &Rc<RefCell<Environment>>) -> EvalResult {
        match expr {
            Expression::IntegerLiteral { value, .. } => Ok(Value::Integer(*value)),
            Expression::FloatLiteral { value, .. } => Ok(Value::Float(*value)),
            Expression::StringLiteral { value, .. } => Ok(Value::string(value.as_str())),
            Expression::BooleanLiteral { value, .. } => Ok(Value::Boolean(*value)),
            Expression::NullLiteral { .. } => Ok(Value::Null),
            Expression::Identifier { name, position } => Environment::get(env, name)
                .ok_or_else(|| EvalError::new(format!("undefined variable '{name}'"), *position)),
            Expression::BinaryOp { left, operator, right, position } => {
                self.eval_binary(left, *operator, right, *position, env)
            }
            Expression::UnaryOp { operator, operand, position } => {
                let value = self.eval_expression(operand, env)?;
                eval_unary(*operator, value, *position)
            }
            Expression::Assignment { target, operator, value, position } => {
                self.eval_assignment(target, *operator, value, *position, env)
            }
            Expression::FunctionCall { name, arguments, position } => {
                self.eval_call(name, arguments, *position, env)
            }
            Expression::ArrayLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expression(element, env)?);
                }
                Ok(Value::array(values))
            }
            Expression::ArrayAccess { array, index, position } => {
                let array_value = self.eval_expression(array, env)?;
                let index_value = self.eval_expression(index, env)?;
                eval_array_access(&array_value, &index_value, *position)
            }
            Expression::ArrayIndexAssignment { array, index, operator, value, position } => {
                self.eval_array_index_assignment(array, index, *operator, value, *position, env)
            }
            Expression::TernaryOp { condition, then_branch, else_branch, .. } => {
                if self.eval_expression(condition, env)?.is_truthy() {
                    self.eval_expression(then_branch, env)
                } else {
                    self.eval_expression(else_branch, env)
                }
            }
        }
    }

    fn eval_binary(
        &self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
        position: Position,
        env: &Rc<RefCell<Environment>>,
    ) -> EvalResult {
        // `and`/`or` short-circuit and return the deciding value, not a
        // coerced boolean (spec §4.5).
        match operator {
            BinaryOperator::And => {
                let left_value = self.eval_expression(left, env)?;
                return if !left_value.is_truthy() { Ok(left_value) } else { self.eval_expression(right, env) };
            }
            BinaryOperator::Or => {
                let left_value = self.eval_expression(left, env)?;
                return if left_value.is_truthy() { Ok(left_value) } else { self.eval_expression(right, env) };
            }
            _ => {}
        }

        let left_value = self.eval_expression(left, env)?;
        let right_value = self.eval_expression(right, env)?;
        eval_binary_values(operator, left_value, right_value, position)
    }

    fn eval_assignment(
        &self,
        target: &str,
        operator: AssignOperator,
        value_expr: &Expression,
        position: Position,
        env: &Rc<RefCell<Environment>>,
    ) -> EvalResult {
        let rhs = self.eval_expression(value_expr, env)?;

        let new_value = match operator {
            AssignOperator::Assign => rhs,
            _ => {
                let current = Environment::get(env, target)
                    .ok_or_else(|| EvalError::new(format!("undefined variable '{target}'"), position))?;
                apply_compound(operator, current, rhs, position)?
            }
        };

        if operator == AssignOperator::Assign && !Environment::exists(env, target) {
            // Implicit declaration on first bare assignment (spec §9).
            env.borrow_mut().define(Identifier::from(target), new_value.clone());
            return Ok(new_value);
        }

        if !Environment::set(env, target, new_value.clone()) {
            return Err(EvalError::new(format!("undefined variable '{target}'"), position));
        }
        Ok(new_value)
    }

    fn eval_array_index_assignment(
        &self,
        array_expr: &Expression,
        index_expr: &Expression,
        operator: AssignOperator,
        value_expr: &Expression,
        position: Position,
        env: &Rc<RefCell<Environment>>,
    ) -> EvalResult {
        let array_value = self.eval_expression(array_expr, env)?;
        let Value::Array(array) = &array_value else {
            return Err(EvalError::new(
                format!("cannot index-assign into a {}", array_value.type_name()),
                position,
            ));
        };

        let index_value = self.eval_expression(index_expr, env)?;
        let index = expect_index(&index_value, array.borrow().len(), position)?;

        let rhs = self.eval_expression(value_expr, env)?;
        let new_value = match operator {
            AssignOperator::Assign => rhs,
            _ => {
                let current = array.borrow()[index].clone();
                apply_compound(operator, current, rhs, position)?
            }
        };

        array.borrow_mut()[index] = new_value.clone();
        Ok(new_value)
    }

    fn eval_call(
        &self,
        name: &str,
        arguments: &[Expression],
        position: Position,
        env: &Rc<RefCell<Environment>>,
    ) -> EvalResult {
        let mut values = Vec::with_capacity(arguments.len());
        for arg in arguments {
            values.push(self.eval_expression(arg, env)?);
        }

        if name == "input" {
            return self.call_input(&values, position);
        }

        let callee = Environment::get(env, name)
            .ok_or_else(|| EvalError::new(format!("undefined variable '{name}'"), position))?;

        match callee {
            Value::Builtin(builtin) => {
                if builtin.arity >= 0 && builtin.arity as usize != values.len() {
                    return Err(EvalError::new(
                        format!("'{name}' expects {} argument(s), got {}", builtin.arity, values.len()),
                        position,
                    ));
                }
                (builtin.handler)(&values).map_err(|msg| EvalError::new(msg, position))
            }
            Value::Function(function) => self.call_function(&function, values, position),
            other => Err(EvalError::new(format!("'{name}' is not callable ({})", other.type_name()), position)),
        }
    }

    fn call_function(&self, function: &Rc<Function>, arguments: Vec<Value>, position: Position) -> EvalResult {
        if arguments.len() != function.parameters.len() {
            return Err(EvalError::new(
                format!(
                    "function '{}' expects {} argument(s), got {}",
                    function.name,
                    function.parameters.len(),
                    arguments.len()
                ),
                position,
            ));
        }

        let frame = Environment::new_child(&function.closure);
        for (param, value) in function.parameters.iter().zip(arguments) {
            frame.borrow_mut().define(param.clone(), value);
        }

        match self.exec_block(&function.body, &frame)? {
            Some(Signal::Return(value)) => Ok(value),
            Some(Signal::Break | Signal::Continue) | None => Ok(Value::Null),
        }
    }

    fn call_input(&self, arguments: &[Value], _position: Position) -> EvalResult {
        if let Some(prompt) = arguments.first() {
            (self.on_prompt)(&prompt.to_string());
        }
        match (self.on_input.borrow_mut())() {
            Some(line) => Ok(Value::string(line)),
            None => Ok(Value::string("")),
        }
    }
}

fn expect_index(value: &Value, len: usize, position: Position) -> Result<usize, EvalError> {
    match value {
        Value::Integer(i) if *i >= 0 && (*i as usize) < len => Ok(*i as usize),
        Value::Integer(_) => Err(EvalError::new("array index out of range", position)),
        other => Err(EvalError::new(format!("array index must be an integer, got {}", other.type_name()), position)),
    }
}

fn eval_array_access(array: &Value, index: &Value, position: Position) -> EvalResult {
    match array {
        Value::Array(a) => {
            let i = expect_index(index, a.borrow().len(), position)?;
            Ok(a.borrow()[i].clone())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = expect_index(index, chars.len(), position)?;
            Ok(Value::string(chars[i].to_string()))
        }
        other => Err(EvalError::new(format!("cannot index a {}", other.type_name()), position)),
    }
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64, bool)> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some((*a as f64, *b as f64, true)),
        (Value::Integer(a), Value::Float(b)) => Some((*a as f64, *b, false)),
        (Value::Float(a), Value::Integer(b)) => Some((*a, *b as f64, false)),
        (Value::Float(a), Value::Float(b)) => Some((*a, *b, false)),
        _ => None,
    }
}

fn eval_binary_values(operator: BinaryOperator, left: Value, right: Value, position: Position) -> EvalResult {
    use BinaryOperator as Op;

    match operator {
        Op::Add => eval_add(left, right, position),
        Op::Subtract | Op::Modulo | Op::Power => {
            let (a, b, both_int) =
                numeric_pair(&left, &right).ok_or_else(|| type_mismatch(operator, &left, &right, position))?;
            match operator {
                Op::Subtract => Ok(numeric_result(a - b, both_int)),
                Op::Modulo => {
                    if b == 0.0 {
                        return Err(EvalError::new("Modulo by zero", position));
                    }
                    Ok(numeric_result(a % b, both_int))
                }
                Op::Power => Ok(numeric_result(a.powf(b), both_int)),
                _ => unreachable!(),
            }
        }
        Op::Divide => {
            let (a, b, _) =
                numeric_pair(&left, &right).ok_or_else(|| type_mismatch(operator, &left, &right, position))?;
            if b == 0.0 {
                return Err(EvalError::new("Division by zero", position));
            }
            // Always true division, matching the original's Python `/` (spec §4.5 is
            // silent on int/int division; original_source/src/interpreter.py:537).
            Ok(Value::Float(a / b))
        }
        Op::Multiply => eval_multiply(left, right, position),
        Op::Equal => Ok(Value::Boolean(left.structurally_equals(&right))),
        Op::NotEqual => Ok(Value::Boolean(!left.structurally_equals(&right))),
        Op::Less | Op::Greater | Op::LessEqual | Op::GreaterEqual => eval_compare(operator, &left, &right, position),
        Op::And | Op::Or => unreachable!("short-circuit operators are handled by eval_binary"),
    }
}

fn numeric_result(value: f64, both_int: bool) -> Value {
    if both_int {
        Value::Integer(value as i64)
    } else {
        Value::Float(value)
    }
}

fn type_mismatch(operator: BinaryOperator, left: &Value, right: &Value, position: Position) -> EvalError {
    EvalError::new(
        format!(
            "unsupported operand types for '{:?}': {} and {}",
            operator,
            left.type_name(),
            right.type_name()
        ),
        position,
    )
}

fn eval_add(left: Value, right: Value, position: Position) -> EvalResult {
    match (&left, &right) {
        (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::string(format!("{left}{right}"))),
        (Value::Array(a), Value::Array(b)) => {
            let mut combined = a.borrow().clone();
            combined.extend(b.borrow().iter().cloned());
            Ok(Value::array(combined))
        }
        _ => {
            let (a, b, both_int) =
                numeric_pair(&left, &right).ok_or_else(|| type_mismatch(BinaryOperator::Add, &left, &right, position))?;
            Ok(numeric_result(a + b, both_int))
        }
    }
}

fn eval_multiply(left: Value, right: Value, position: Position) -> EvalResult {
    match (&left, &right) {
        (Value::String(s), Value::Integer(n)) | (Value::Integer(n), Value::String(s)) => {
            if *n < 0 {
                return Err(EvalError::new("cannot repeat a string a negative number of times", position));
            }
            Ok(Value::string(s.repeat(*n as usize)))
        }
        (Value::Array(a), Value::Integer(n)) | (Value::Integer(n), Value::Array(a)) => {
            if *n < 0 {
                return Err(EvalError::new("cannot repeat an array a negative number of times", position));
            }
            let source = a.borrow();
            let mut repeated = Vec::with_capacity(source.len() * (*n as usize));
            for _ in 0..*n {
                repeated.extend(source.iter().cloned());
            }
            Ok(Value::array(repeated))
        }
        _ => {
            let (a, b, both_int) = numeric_pair(&left, &right)
                .ok_or_else(|| type_mismatch(BinaryOperator::Multiply, &left, &right, position))?;
            Ok(numeric_result(a * b, both_int))
        }
    }
}

fn eval_compare(operator: BinaryOperator, left: &Value, right: &Value, position: Position) -> EvalResult {
    use std::cmp::Ordering;

    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => a.as_ref().cmp(b.as_ref()),
        _ => {
            let (a, b, _) =
                numeric_pair(left, right).ok_or_else(|| type_mismatch(operator, left, right, position))?;
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    };

    let result = match operator {
        BinaryOperator::Less => ordering == Ordering::Less,
        BinaryOperator::Greater => ordering == Ordering::Greater,
        BinaryOperator::LessEqual => ordering != Ordering::Greater,
        BinaryOperator::GreaterEqual => ordering != Ordering::Less,
        _ => unreachable!(),
    };
    Ok(Value::Boolean(result))
}

fn eval_unary(operator: UnaryOperator, value: Value, position: Position) -> EvalResult {
    match operator {
        UnaryOperator::Negate => match value {
            Value::Integer(i) => Ok(Value::Integer(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(EvalError::new(format!("cannot negate a {}", other.type_name()), position)),
        },
        UnaryOperator::Not => Ok(Value::Boolean(!value.is_truthy())),
    }
}

fn apply_compound(operator: AssignOperator, current: Value, rhs: Value, position: Position) -> EvalResult {
    let binary_op = match operator {
        AssignOperator::Assign => unreachable!("Assign never reaches apply_compound"),
        AssignOperator::AddAssign => BinaryOperator::Add,
        AssignOperator::SubtractAssign => BinaryOperator::Subtract,
        AssignOperator::MultiplyAssign => BinaryOperator::Multiply,
        AssignOperator::DivideAssign => BinaryOperator::Divide,
    };
    eval_binary_values(binary_op, current, rhs, position)
}
