//! The runtime value model.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::Statement;
use crate::environment::Environment;
use crate::Identifier;

/// Array values are reference-shared: aliasing a binding aliases the
/// underlying storage.
pub type SharedArray = Rc<RefCell<Vec<Value>>>;

/// A user-defined function: its declared shape plus the environment that was
/// current at the point of declaration. This is the closure.
#[derive(Debug)]
pub struct Function {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Vec<Statement>,
    pub closure: Rc<RefCell<Environment>>,
}

/// A host-implemented function reachable from MiniLang code. Carries a bare
/// function pointer rather than a boxed closure: builtins never capture
/// environment state, only `Function` values do.
pub struct Builtin {
    pub name: &'static str,
    /// `-1` marks a variadic builtin; any other value is an exact arity.
    pub arity: i32,
    pub handler: fn(&[Value]) -> Result<Value, String>,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).field("arity", &self.arity).finish()
    }
}

/// A MiniLang runtime value. Closed tagged union: exhaustive case analysis
/// over a fixed set of variants rather than dispatch through a trait object.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Array(SharedArray),
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
}

impl Value {
    #[must_use]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Self::String(s.into())
    }

    #[must_use]
    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    /// The name `type(x)` reports for each variant (spec §4.5).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Function(_) | Self::Builtin(_) => "function",
        }
    }

    /// The boolean a condition sees (spec §4.5, "Truthiness").
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Array(a) => !a.borrow().is_empty(),
            Self::Function(_) | Self::Builtin(_) => true,
        }
    }

    /// Structural equality for `==`/`!=`. Cross-kind values are unequal.
    #[must_use]
    pub fn structurally_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => (*a as f64) == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structurally_equals(y))
            }
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// The string-conversion rule from spec §4.5.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(fl) => {
                // Matches the original's Python `str(value)`, which always shows a
                // decimal point for floats (interpreter.py:290); Rust's bare `{}`
                // drops it for whole numbers, so force one back in that case.
                if fl.is_finite() && fl.fract() == 0.0 {
                    write!(f, "{fl:.1}")
                } else {
                    write!(f, "{fl}")
                }
            }
            Self::String(s) => write!(f, "{s}"),
            Self::Array(a) => {
                write!(f, "[")?;
                for (i, element) in a.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Self::Function(func) => write!(f, "<function {}>", func.name),
            Self::Builtin(b) => write!(f, "<builtin {}>", b.name),
        }
    }
}
