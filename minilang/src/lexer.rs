//! Lexer: turns source text into a finite ordered sequence of [`Token`]s.

use std::iter::Peekable;
use std::str::Chars;

use crate::error_parsing::LexError;
use crate::token::{self, Position, Token, TokenKind};

type LResult<T> = Result<T, LexError>;

/// Two-character operators, checked before their one-character prefixes.
const TWO_CHAR_OPERATORS: &[(&str, TokenKind)] = &[
    ("**", TokenKind::Power),
    ("==", TokenKind::Eq),
    ("!=", TokenKind::Neq),
    ("<=", TokenKind::Lte),
    (">=", TokenKind::Gte),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::MultAssign),
    ("/=", TokenKind::DivAssign),
];

fn one_char_operator(c: char) -> Option<TokenKind> {
    Some(match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Multiply,
        '/' => TokenKind::Divide,
        '%' => TokenKind::Modulo,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        '=' => TokenKind::Assign,
        '!' => TokenKind::Not,
        _ => return None,
    })
}

fn delimiter(c: char) -> Option<TokenKind> {
    Some(match c {
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        _ => return None,
    })
}

/// Hand-written character-at-a-time lexer over a source string.
///
/// A position-tracking cursor over a [`Peekable`] char iterator, emitting
/// MiniLang's closed [`TokenKind`] set.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            pos: Position::START,
        }
    }

    fn current(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => self.pos.newline(),
            Some(_) => self.pos.advance(),
            None => {}
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    /// Returns `true` if a comment was consumed at the current position.
    fn skip_comment(&mut self) -> LResult<bool> {
        match (self.current(), self.peek2()) {
            (Some('#'), _) | (Some('/'), Some('/')) => {
                while !matches!(self.current(), None | Some('\n')) {
                    self.advance();
                }
                Ok(true)
            }
            (Some('/'), Some('*')) => {
                let start = self.pos;
                self.advance();
                self.advance();
                loop {
                    match self.current() {
                        None => {
                            return Err(LexError::UnterminatedComment(start));
                        }
                        Some('*') if self.peek2() == Some('/') => {
                            self.advance();
                            self.advance();
                            return Ok(true);
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
            }
            _ => Ok(false),
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        let mut text = String::new();
        let mut has_dot = false;

        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && !has_dot && matches!(self.peek2(), Some(d) if d.is_ascii_digit()) {
                has_dot = true;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if has_dot {
            Token::new(TokenKind::Float(text.parse().unwrap_or(0.0)), start)
        } else {
            Token::new(TokenKind::Integer(text.parse().unwrap_or(0)), start)
        }
    }

    fn read_string(&mut self) -> LResult<Token> {
        let start = self.pos;
        let quote = self.advance().expect("caller checked current char");
        let mut value = String::new();

        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString(start)),
                Some('\n') => return Err(LexError::UnterminatedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => {
                            value.push('\n');
                            self.advance();
                        }
                        Some('t') => {
                            value.push('\t');
                            self.advance();
                        }
                        Some('r') => {
                            value.push('\r');
                            self.advance();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.advance();
                        }
                        Some(c) if c == quote => {
                            value.push(quote);
                            self.advance();
                        }
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                            self.advance();
                        }
                        None => return Err(LexError::UnterminatedString(start)),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Ok(Token::new(TokenKind::Str(value), start))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        let mut text = String::new();

        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match token::keyword(&text) {
            Some(kind) => Token::new(kind, start),
            None => Token::new(TokenKind::Identifier(text.into()), start),
        }
    }

    fn read_operator(&mut self) -> LResult<Token> {
        let start = self.pos;
        let first = self.current().expect("caller checked current char");

        if let Some(second) = self.peek2() {
            let mut two = String::with_capacity(2);
            two.push(first);
            two.push(second);
            if let Some((_, kind)) = TWO_CHAR_OPERATORS.iter().find(|(op, _)| *op == two) {
                self.advance();
                self.advance();
                return Ok(Token::new(kind.clone(), start));
            }
        }

        if let Some(kind) = one_char_operator(first) {
            self.advance();
            return Ok(Token::new(kind, start));
        }

        Err(LexError::UnexpectedCharacter(first, start))
    }

    /// Tokenizes the entire source, returning a finite sequence ending in `Eof`.
    pub fn tokenize(mut self) -> LResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.current().is_none() {
                break;
            }

            if self.skip_comment()? {
                continue;
            }

            match self.current() {
                Some('\n') => {
                    let pos = self.pos;
                    self.advance();
                    if !matches!(tokens.last(), Some(Token { kind: TokenKind::Newline, .. })) {
                        tokens.push(Token::new(TokenKind::Newline, pos));
                    }
                }
                Some(c) if c.is_ascii_digit() => tokens.push(self.read_number()),
                Some(c) if c == '"' || c == '\'' => tokens.push(self.read_string()?),
                Some(c) if c.is_alphabetic() || c == '_' => tokens.push(self.read_identifier()),
                Some(c) if delimiter(c).is_some() => {
                    let pos = self.pos;
                    self.advance();
                    tokens.push(Token::new(delimiter(c).unwrap(), pos));
                }
                Some(_) => tokens.push(self.read_operator()?),
                None => unreachable!(),
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.pos));
        Ok(tokens)
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> LResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_blank_lines_collapsing_consecutive_newlines() {
        let ks = kinds("let x = 1\n\n\nlet y = 2");
        let newline_run = ks
            .windows(2)
            .any(|w| matches!(w, [TokenKind::Newline, TokenKind::Newline]));
        assert!(!newline_run, "consecutive NEWLINE tokens must never appear: {ks:?}");
    }

    #[test]
    fn reads_integer_and_float() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer(42), TokenKind::Eof]);
        assert_eq!(kinds("3.5"), vec![TokenKind::Float(3.5), TokenKind::Eof]);
    }

    #[test]
    fn a_trailing_dot_is_not_consumed_without_a_following_digit() {
        // `1.` has no digit after the dot, so `.` is not part of the number.
        let ks = kinds("1.foo");
        assert_eq!(ks[0], TokenKind::Integer(1));
    }

    #[test]
    fn string_escapes() {
        let ks = kinds(r#""a\nb\t\"c\\d""#);
        assert_eq!(ks[0], TokenKind::Str("a\nb\t\"c\\d".to_string()));
    }

    #[test]
    fn unknown_escape_is_preserved_literally() {
        let ks = kinds(r#""\q""#);
        assert_eq!(ks[0], TokenKind::Str("\\q".to_string()));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"abc").is_err());
        assert!(tokenize("\"abc\ndef\"").is_err());
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(tokenize("/* never closes").is_err());
    }

    #[test]
    fn true_false_collapse_to_boolean_tokens() {
        assert_eq!(kinds("true false"), vec![TokenKind::Boolean(true), TokenKind::Boolean(false), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators_win_over_one_char_prefixes() {
        assert_eq!(kinds("a <= b"), vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Lte,
            TokenKind::Identifier("b".into()),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn and_or_keyword_and_symbol_forms_share_a_kind() {
        assert_eq!(kinds("a and b"), kinds("a && b"));
        assert_eq!(kinds("a or b"), kinds("a || b"));
    }

    #[test]
    fn line_and_double_slash_and_hash_comments_are_skipped() {
        let ks = kinds("let x = 1 // trailing\n# whole line\nlet y = 2");
        assert!(!ks.iter().any(|k| matches!(k, TokenKind::Identifier(s) if s == "trailing")));
    }

    #[test]
    fn block_comment_spans_lines() {
        let ks = kinds("let x = 1 /* spans\nlines */ let y = 2");
        assert_eq!(ks[0], TokenKind::Let);
    }

    #[test]
    fn unexpected_character_is_an_error() {
        assert!(tokenize("let x = @").is_err());
    }
}
