//! Recursive-descent parser with precedence climbing.

use crate::ast::{AssignOperator, BinaryOperator, Expression, Program, Statement, UnaryOperator};
use crate::error_parsing::{ParseError, ParseErrorType};
use crate::token::{Position, Token, TokenKind};
use crate::Identifier;

type PResult<T> = Result<T, ParseError>;

const DECLARATION_STARTS: &[TokenKind] = &[
    TokenKind::Let,
    TokenKind::Func,
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Return,
    TokenKind::Print,
];

/// Token-cursor parser producing a [`Program`] plus an accumulated error list.
///
/// A flat token buffer with a cursor, `peek`/`match_token`/`consume` helpers,
/// and panic-mode error recovery via `synchronize`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub errors: Vec<ParseError>,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, errors: Vec::new() }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().expect("token stream always ends in Eof"))
    }

    fn previous(&self) -> &Token {
        if self.pos > 0 {
            &self.tokens[self.pos - 1]
        } else {
            &self.tokens[0]
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn check(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|k| kind_matches(&self.current().kind, k))
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous().clone()
    }

    fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        if self.check(kinds) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, expected: &'static str) -> PResult<Token> {
        if self.check(&[kind.clone()]) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                ParseErrorType::Expected { expected, found: self.current().kind.clone() },
                self.current().position,
            ))
        }
    }

    fn skip_newlines(&mut self) {
        while self.match_token(&[TokenKind::Newline]) {}
    }

    fn consume_statement_terminator(&mut self) {
        // Permissive: missing terminator is not an error (see grammar note).
        let _ = self.match_token(&[TokenKind::Semicolon, TokenKind::Newline]);
    }

    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if matches!(self.previous().kind, TokenKind::Semicolon | TokenKind::Newline) {
                return;
            }
            if self.check(DECLARATION_STARTS) {
                return;
            }
            self.advance();
        }
    }

    /// Parses the whole token stream into a [`Program`], accumulating
    /// recoverable errors in `self.errors` rather than aborting at the first
    /// one.
    pub fn parse(mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        self.skip_newlines();

        while !self.is_at_end() {
            match self.parse_declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
            self.skip_newlines();
        }

        (Program { statements }, self.errors)
    }

    fn parse_declaration(&mut self) -> PResult<Statement> {
        if self.match_token(&[TokenKind::Let]) {
            return self.parse_variable_declaration(true);
        }
        if self.match_token(&[TokenKind::Func]) {
            return self.parse_function_declaration();
        }
        self.parse_statement()
    }

    fn parse_variable_declaration(&mut self, with_terminator: bool) -> PResult<Statement> {
        let name_token = self.consume(&TokenKind::Identifier(Identifier::new()), "a variable name")?;
        let position = name_token.position;
        let name = identifier_text(&name_token);

        let initializer = if self.match_token(&[TokenKind::Assign]) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        if with_terminator {
            self.consume_statement_terminator();
        }

        Ok(Statement::VariableDeclaration { name, initializer, position })
    }

    fn parse_function_declaration(&mut self) -> PResult<Statement> {
        let name_token = self.consume(&TokenKind::Identifier(Identifier::new()), "a function name")?;
        let position = name_token.position;
        let name = identifier_text(&name_token);

        self.consume(&TokenKind::LParen, "'(' after function name")?;

        let mut parameters = Vec::new();
        if !self.check(&[TokenKind::RParen]) {
            let first = self.consume(&TokenKind::Identifier(Identifier::new()), "a parameter name")?;
            parameters.push(identifier_text(&first));
            while self.match_token(&[TokenKind::Comma]) {
                let next = self.consume(&TokenKind::Identifier(Identifier::new()), "a parameter name")?;
                parameters.push(identifier_text(&next));
            }
        }

        self.consume(&TokenKind::RParen, "')' after parameters")?;
        self.skip_newlines();
        self.consume(&TokenKind::LBrace, "'{' before function body")?;
        let body = self.parse_block_statements()?;

        Ok(Statement::FunctionDeclaration { name, parameters, body, position })
    }

    fn parse_statement(&mut self) -> PResult<Statement> {
        if self.match_token(&[TokenKind::If]) {
            return self.parse_if_statement();
        }
        if self.match_token(&[TokenKind::While]) {
            return self.parse_while_statement();
        }
        if self.match_token(&[TokenKind::For]) {
            return self.parse_for_statement();
        }
        if self.match_token(&[TokenKind::Return]) {
            return self.parse_return_statement();
        }
        if self.match_token(&[TokenKind::Break]) {
            let position = self.previous().position;
            self.consume_statement_terminator();
            return Ok(Statement::BreakStatement { position });
        }
        if self.match_token(&[TokenKind::Continue]) {
            let position = self.previous().position;
            self.consume_statement_terminator();
            return Ok(Statement::ContinueStatement { position });
        }
        if self.match_token(&[TokenKind::Print]) {
            return self.parse_print_statement();
        }
        if self.match_token(&[TokenKind::LBrace]) {
            let position = self.previous().position;
            let statements = self.parse_block_statements()?;
            return Ok(Statement::Block { statements, position });
        }
        self.parse_expression_statement()
    }

    fn parse_if_statement(&mut self) -> PResult<Statement> {
        let position = self.previous().position;
        let has_paren = self.match_token(&[TokenKind::LParen]);
        let condition = self.parse_expression()?;
        if has_paren {
            self.consume(&TokenKind::RParen, "')' after if condition")?;
        }

        self.skip_newlines();
        self.consume(&TokenKind::LBrace, "'{' after if condition")?;
        let then_statements = self.parse_block_statements()?;
        let then_branch = Box::new(Statement::Block { statements: then_statements, position });

        self.skip_newlines();
        let mut else_branch = None;
        if self.match_token(&[TokenKind::Else]) {
            self.skip_newlines();
            if self.match_token(&[TokenKind::If]) {
                else_branch = Some(Box::new(self.parse_if_statement()?));
            } else {
                self.consume(&TokenKind::LBrace, "'{' after 'else'")?;
                let else_position = self.previous().position;
                let else_statements = self.parse_block_statements()?;
                else_branch = Some(Box::new(Statement::Block { statements: else_statements, position: else_position }));
            }
        }

        Ok(Statement::IfStatement { condition, then_branch, else_branch, position })
    }

    fn parse_while_statement(&mut self) -> PResult<Statement> {
        let position = self.previous().position;
        let has_paren = self.match_token(&[TokenKind::LParen]);
        let condition = self.parse_expression()?;
        if has_paren {
            self.consume(&TokenKind::RParen, "')' after while condition")?;
        }

        self.skip_newlines();
        self.consume(&TokenKind::LBrace, "'{' after while condition")?;
        let body_position = self.previous().position;
        let body_statements = self.parse_block_statements()?;
        let body = Box::new(Statement::Block { statements: body_statements, position: body_position });

        Ok(Statement::WhileStatement { condition, body, position })
    }

    fn parse_for_statement(&mut self) -> PResult<Statement> {
        let position = self.previous().position;
        let has_paren = self.match_token(&[TokenKind::LParen]);

        let initializer = if self.match_token(&[TokenKind::Semicolon]) {
            None
        } else if self.match_token(&[TokenKind::Let]) {
            let decl = self.parse_variable_declaration(false)?;
            self.consume(&TokenKind::Semicolon, "';' after for initializer")?;
            Some(Box::new(decl))
        } else {
            let expr_position = self.current().position;
            let expr = self.parse_expression()?;
            self.consume(&TokenKind::Semicolon, "';' after for initializer")?;
            Some(Box::new(Statement::ExpressionStatement { expression: expr, position: expr_position }))
        };

        let condition = if self.check(&[TokenKind::Semicolon]) { None } else { Some(self.parse_expression()?) };
        self.consume(&TokenKind::Semicolon, "';' after for condition")?;

        let increment = if has_paren {
            let increment = if self.check(&[TokenKind::RParen]) { None } else { Some(self.parse_expression()?) };
            self.consume(&TokenKind::RParen, "')' after for clauses")?;
            increment
        } else if !self.check(&[TokenKind::LBrace]) && !self.check(&[TokenKind::Newline]) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.skip_newlines();
        self.consume(&TokenKind::LBrace, "'{' after for clauses")?;
        let body_position = self.previous().position;
        let body_statements = self.parse_block_statements()?;
        let body = Box::new(Statement::Block { statements: body_statements, position: body_position });

        Ok(Statement::ForStatement { initializer, condition, increment, body, position })
    }

    fn parse_return_statement(&mut self) -> PResult<Statement> {
        let position = self.previous().position;
        let value = if self.check(&[TokenKind::Semicolon, TokenKind::Newline, TokenKind::RBrace, TokenKind::Eof]) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_statement_terminator();
        Ok(Statement::ReturnStatement { value, position })
    }

    fn parse_print_statement(&mut self) -> PResult<Statement> {
        let position = self.previous().position;
        self.consume(&TokenKind::LParen, "'(' after 'print'")?;

        let mut arguments = Vec::new();
        if !self.check(&[TokenKind::RParen]) {
            arguments.push(self.parse_expression()?);
            while self.match_token(&[TokenKind::Comma]) {
                arguments.push(self.parse_expression()?);
            }
        }

        self.consume(&TokenKind::RParen, "')' after print arguments")?;
        self.consume_statement_terminator();
        Ok(Statement::PrintStatement { arguments, position })
    }

    /// Parses the statements of a block up to (and consuming) the closing
    /// `}`. The caller has already consumed the opening `{`.
    fn parse_block_statements(&mut self) -> PResult<Vec<Statement>> {
        let mut statements = Vec::new();
        self.skip_newlines();

        while !self.check(&[TokenKind::RBrace]) && !self.is_at_end() {
            match self.parse_declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
            self.skip_newlines();
        }

        self.consume(&TokenKind::RBrace, "'}' after block")?;
        Ok(statements)
    }

    fn parse_expression_statement(&mut self) -> PResult<Statement> {
        let position = self.current().position;
        let expression = self.parse_expression()?;
        self.consume_statement_terminator();
        Ok(Statement::ExpressionStatement { expression, position })
    }

    // ---- expressions, lowest to highest precedence ----

    fn parse_expression(&mut self) -> PResult<Expression> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> PResult<Expression> {
        let expr = self.parse_or()?;

        const ASSIGN_OPS: &[TokenKind] =
            &[TokenKind::Assign, TokenKind::PlusAssign, TokenKind::MinusAssign, TokenKind::MultAssign, TokenKind::DivAssign];

        if self.match_token(ASSIGN_OPS) {
            let op_kind = self.previous().kind.clone();
            let operator = assign_operator(&op_kind);
            let position = expr.position();
            let value = Box::new(self.parse_assignment()?);

            return match expr {
                Expression::Identifier { name, .. } => {
                    Ok(Expression::Assignment { target: name, operator, value, position })
                }
                Expression::ArrayAccess { array, index, .. } => {
                    Ok(Expression::ArrayIndexAssignment { array, index, operator, value, position })
                }
                _ => Err(ParseError::new(ParseErrorType::InvalidAssignmentTarget, position)),
            };
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_and()?;
        while self.match_token(&[TokenKind::Or]) {
            let position = expr.position();
            let right = self.parse_and()?;
            expr = Expression::BinaryOp {
                left: Box::new(expr),
                operator: BinaryOperator::Or,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_equality()?;
        while self.match_token(&[TokenKind::And]) {
            let position = expr.position();
            let right = self.parse_equality()?;
            expr = Expression::BinaryOp {
                left: Box::new(expr),
                operator: BinaryOperator::And,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_comparison()?;
        while self.match_token(&[TokenKind::Eq, TokenKind::Neq]) {
            let op = binary_operator(&self.previous().kind);
            let position = expr.position();
            let right = self.parse_comparison()?;
            expr = Expression::BinaryOp { left: Box::new(expr), operator: op, right: Box::new(right), position };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_additive()?;
        while self.match_token(&[TokenKind::Lt, TokenKind::Gt, TokenKind::Lte, TokenKind::Gte]) {
            let op = binary_operator(&self.previous().kind);
            let position = expr.position();
            let right = self.parse_additive()?;
            expr = Expression::BinaryOp { left: Box::new(expr), operator: op, right: Box::new(right), position };
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_multiplicative()?;
        while self.match_token(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = binary_operator(&self.previous().kind);
            let position = expr.position();
            let right = self.parse_multiplicative()?;
            expr = Expression::BinaryOp { left: Box::new(expr), operator: op, right: Box::new(right), position };
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_power()?;
        while self.match_token(&[TokenKind::Multiply, TokenKind::Divide, TokenKind::Modulo]) {
            let op = binary_operator(&self.previous().kind);
            let position = expr.position();
            let right = self.parse_power()?;
            expr = Expression::BinaryOp { left: Box::new(expr), operator: op, right: Box::new(right), position };
        }
        Ok(expr)
    }

    /// Right-associative: recurses on itself rather than looping.
    fn parse_power(&mut self) -> PResult<Expression> {
        let expr = self.parse_unary()?;
        if self.match_token(&[TokenKind::Power]) {
            let position = expr.position();
            let right = self.parse_power()?;
            return Ok(Expression::BinaryOp {
                left: Box::new(expr),
                operator: BinaryOperator::Power,
                right: Box::new(right),
                position,
            });
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> PResult<Expression> {
        if self.match_token(&[TokenKind::Not, TokenKind::Minus]) {
            let position = self.previous().position;
            let operator = match self.previous().kind {
                TokenKind::Minus => UnaryOperator::Negate,
                _ => UnaryOperator::Not,
            };
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expression::UnaryOp { operator, operand, position });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&[TokenKind::LParen]) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(&[TokenKind::LBracket]) {
                let position = expr.position();
                let index = self.parse_expression()?;
                self.consume(&TokenKind::RBracket, "']' after index")?;
                expr = Expression::ArrayAccess { array: Box::new(expr), index: Box::new(index), position };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expression) -> PResult<Expression> {
        let mut arguments = Vec::new();
        if !self.check(&[TokenKind::RParen]) {
            arguments.push(self.parse_expression()?);
            while self.match_token(&[TokenKind::Comma]) {
                arguments.push(self.parse_expression()?);
            }
        }
        self.consume(&TokenKind::RParen, "')' after function arguments")?;

        match callee {
            Expression::Identifier { name, position } => Ok(Expression::FunctionCall { name, arguments, position }),
            other => Err(ParseError::new(ParseErrorType::InvalidCallTarget, other.position())),
        }
    }

    fn parse_primary(&mut self) -> PResult<Expression> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expression::IntegerLiteral { value, position: token.position })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expression::FloatLiteral { value, position: token.position })
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expression::StringLiteral { value, position: token.position })
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Expression::BooleanLiteral { value, position: token.position })
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::NullLiteral { position: token.position })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier { name, position: token.position })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "')' after expression")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&[TokenKind::RBracket]) {
                    elements.push(self.parse_expression()?);
                    while self.match_token(&[TokenKind::Comma]) {
                        elements.push(self.parse_expression()?);
                    }
                }
                self.consume(&TokenKind::RBracket, "']' after array elements")?;
                Ok(Expression::ArrayLiteral { elements, position: token.position })
            }
            TokenKind::Input => {
                self.advance();
                self.consume(&TokenKind::LParen, "'(' after 'input'")?;
                let mut arguments = Vec::new();
                if !self.check(&[TokenKind::RParen]) {
                    arguments.push(self.parse_expression()?);
                }
                self.consume(&TokenKind::RParen, "')' after input")?;
                Ok(Expression::FunctionCall { name: "input".into(), arguments, position: token.position })
            }
            other => Err(ParseError::new(ParseErrorType::UnexpectedToken(other), token.position)),
        }
    }
}

/// `TokenKind::Identifier`/`Str`/`Integer`/`Float`/`Boolean` carry a payload
/// that must not be compared for equality by `check`/`consume` — only the
/// discriminant matters when probing "is the next token an identifier".
fn kind_matches(actual: &TokenKind, expected: &TokenKind) -> bool {
    std::mem::discriminant(actual) == std::mem::discriminant(expected)
}

fn identifier_text(token: &Token) -> Identifier {
    match &token.kind {
        TokenKind::Identifier(name) => name.clone(),
        _ => unreachable!("consume(Identifier) guarantees this"),
    }
}

fn binary_operator(kind: &TokenKind) -> BinaryOperator {
    match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Subtract,
        TokenKind::Multiply => BinaryOperator::Multiply,
        TokenKind::Divide => BinaryOperator::Divide,
        TokenKind::Modulo => BinaryOperator::Modulo,
        TokenKind::Power => BinaryOperator::Power,
        TokenKind::Eq => BinaryOperator::Equal,
        TokenKind::Neq => BinaryOperator::NotEqual,
        TokenKind::Lt => BinaryOperator::Less,
        TokenKind::Gt => BinaryOperator::Greater,
        TokenKind::Lte => BinaryOperator::LessEqual,
        TokenKind::Gte => BinaryOperator::GreaterEqual,
        other => unreachable!("parser only calls this after matching a binary operator token, got {other:?}"),
    }
}

fn assign_operator(kind: &TokenKind) -> AssignOperator {
    match kind {
        TokenKind::Assign => AssignOperator::Assign,
        TokenKind::PlusAssign => AssignOperator::AddAssign,
        TokenKind::MinusAssign => AssignOperator::SubtractAssign,
        TokenKind::MultAssign => AssignOperator::MultiplyAssign,
        TokenKind::DivAssign => AssignOperator::DivideAssign,
        other => unreachable!("parser only calls this after matching an assignment token, got {other:?}"),
    }
}

/// Tokenizes and parses `source` in one step.
pub fn parse(source: &str) -> PResult<Program> {
    let tokens = crate::lexer::tokenize(source)?;
    let (program, errors) = Parser::new(tokens).parse();
    if let Some(first) = errors.into_iter().next() {
        return Err(first);
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        parse(src).unwrap_or_else(|e| panic!("unexpected parse error: {e}"))
    }

    #[test]
    fn minus_is_left_associative() {
        let program = parse_ok("a - b - c");
        let Statement::ExpressionStatement { expression, .. } = &program.statements[0] else { panic!() };
        let Expression::BinaryOp { left, operator: BinaryOperator::Subtract, .. } = expression else { panic!() };
        assert!(matches!(**left, Expression::BinaryOp { operator: BinaryOperator::Subtract, .. }));
    }

    #[test]
    fn power_is_right_associative() {
        let program = parse_ok("a ** b ** c");
        let Statement::ExpressionStatement { expression, .. } = &program.statements[0] else { panic!() };
        let Expression::BinaryOp { right, operator: BinaryOperator::Power, .. } = expression else { panic!() };
        assert!(matches!(**right, Expression::BinaryOp { operator: BinaryOperator::Power, .. }));
    }

    #[test]
    fn bare_assignment_target_must_be_identifier_or_index() {
        assert!(parse("1 + 1 = 2").is_err());
    }

    #[test]
    fn array_index_assignment_reuses_access_array_and_index() {
        let program = parse_ok("a[0] = 1");
        let Statement::ExpressionStatement { expression, .. } = &program.statements[0] else { panic!() };
        assert!(matches!(expression, Expression::ArrayIndexAssignment { .. }));
    }

    #[test]
    fn call_target_must_be_a_bare_identifier() {
        assert!(parse("(f)()").is_err());
        assert!(parse("arr[0]()").is_err());
    }

    #[test]
    fn if_condition_parentheses_are_optional() {
        parse_ok("if x > 1 { print(x) }");
        parse_ok("if (x > 1) { print(x) }");
    }

    #[test]
    fn missing_statement_terminator_is_not_an_error() {
        parse_ok("let x = 1 let y = 2");
    }

    #[test]
    fn for_loop_with_all_clauses() {
        let program = parse_ok("for let i = 0; i < 3; i = i + 1 { print(i) }");
        assert!(matches!(program.statements[0], Statement::ForStatement { .. }));
    }

    #[test]
    fn parser_recovers_after_an_error_via_synchronize() {
        let tokens = crate::lexer::tokenize("let = ;\nlet x = 1").unwrap();
        let (program, errors) = Parser::new(tokens).parse();
        assert!(!errors.is_empty());
        assert!(program.statements.iter().any(|s| matches!(s, Statement::VariableDeclaration { .. })));
    }
}
