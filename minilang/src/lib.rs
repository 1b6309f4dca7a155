//! MiniLang: a tree-walking evaluator for a small dynamically-typed scripting
//! language, composed of a lexer, a recursive-descent parser, and an
//! AST-walking evaluator with lexically scoped environments, closures, and
//! non-local control flow (`return`, `break`, `continue`).
//!
//! ```
//! use minilang::Engine;
//!
//! let engine = Engine::new();
//! let value = engine.eval("1 + 2 * 3").unwrap();
//! assert_eq!(value.to_string(), "7");
//! ```

mod ast;
mod builtins;
mod engine;
mod environment;
mod error;
mod error_parsing;
mod lexer;
mod parse;
mod printer;
mod token;
mod value;

/// Compact, inline-storing string type used for identifiers throughout the
/// crate, avoiding a heap allocation for the short names typical scripts use.
pub(crate) type Identifier = smartstring::SmartString<smartstring::LazyCompact>;

pub use ast::{Expression, Program, Statement};
pub use engine::{Engine, OnInputCallback, OnPrintCallback, OnPromptCallback};
pub use environment::Environment;
pub use error::EvalError;
pub use error_parsing::{LexError, ParseError, ParseErrorType};
pub use lexer::{tokenize, Lexer};
pub use parse::{parse, Parser};
pub use printer::print_ast;
pub use token::{Position, Token, TokenKind};
pub use value::Value;
