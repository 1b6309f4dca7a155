//! Error types for the lexing and parsing stages.
//!
//! Hand-written `Display`/`Error` impls: the library stays free of an
//! error-derive dependency so that error formatting is fully under this
//! crate's control.

use std::error::Error;
use std::fmt;

use crate::token::{Position, TokenKind};

/// An error raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnterminatedString(Position),
    UnterminatedComment(Position),
    UnexpectedCharacter(char, Position),
}

impl LexError {
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::UnterminatedString(p) | Self::UnterminatedComment(p) => *p,
            Self::UnexpectedCharacter(_, p) => *p,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString(pos) => write!(f, "unterminated string literal at {pos}"),
            Self::UnterminatedComment(pos) => write!(f, "unterminated block comment at {pos}"),
            Self::UnexpectedCharacter(c, pos) => write!(f, "unexpected character '{c}' at {pos}"),
        }
    }
}

impl Error for LexError {}

/// The specific kind of grammar violation a [`ParseError`] reports.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    /// Expected one of a set of tokens but found something else.
    Expected { expected: &'static str, found: TokenKind },
    /// A token appeared where no expression could start.
    UnexpectedToken(TokenKind),
    /// The left-hand side of an assignment was not an assignable target.
    InvalidAssignmentTarget,
    /// A function call's target was not a bare identifier.
    InvalidCallTarget,
    /// Source ended before a construct was closed.
    UnexpectedEof { expected: &'static str },
    /// Tokenizing failed before parsing could begin.
    Lex(LexError),
}

impl fmt::Display for ParseErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {}", found.describe())
            }
            Self::UnexpectedToken(found) => write!(f, "unexpected {}", found.describe()),
            Self::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            Self::InvalidCallTarget => write!(f, "only identifiers can be called"),
            Self::UnexpectedEof { expected } => write!(f, "unexpected end of input, expected {expected}"),
            Self::Lex(err) => write!(f, "{err}"),
        }
    }
}

/// An error raised while parsing a token stream into an AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error_type: ParseErrorType,
    pub position: Position,
}

impl ParseError {
    #[must_use]
    pub fn new(error_type: ParseErrorType, position: Position) -> Self {
        Self { error_type, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.error_type, self.position)
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let position = err.position();
        Self::new(ParseErrorType::Lex(err), position)
    }
}
