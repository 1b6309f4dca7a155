//! Deterministic multi-line AST pretty-printer (spec §4.3).
//!
//! Not on the execution path: a debugging collaborator for the `-a`/`tokens`/
//! `ast` CLI surfaces only.

use std::fmt::Write as _;

use crate::ast::{AssignOperator, BinaryOperator, Expression, Program, Statement, UnaryOperator};

fn binary_symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Power => "**",
        BinaryOperator::Equal => "==",
        BinaryOperator::NotEqual => "!=",
        BinaryOperator::Less => "<",
        BinaryOperator::Greater => ">",
        BinaryOperator::LessEqual => "<=",
        BinaryOperator::GreaterEqual => ">=",
        BinaryOperator::And => "and",
        BinaryOperator::Or => "or",
    }
}

fn unary_symbol(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Negate => "-",
        UnaryOperator::Not => "not",
    }
}

fn assign_symbol(op: AssignOperator) -> &'static str {
    match op {
        AssignOperator::Assign => "=",
        AssignOperator::AddAssign => "+=",
        AssignOperator::SubtractAssign => "-=",
        AssignOperator::MultiplyAssign => "*=",
        AssignOperator::DivideAssign => "/=",
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_expression(out: &mut String, expr: &Expression, depth: usize) {
    indent(out, depth);
    match expr {
        Expression::IntegerLiteral { value, .. } => {
            let _ = writeln!(out, "Integer({value})");
        }
        Expression::FloatLiteral { value, .. } => {
            let _ = writeln!(out, "Float({value})");
        }
        Expression::StringLiteral { value, .. } => {
            let _ = writeln!(out, "String({value:?})");
        }
        Expression::BooleanLiteral { value, .. } => {
            let _ = writeln!(out, "Boolean({value})");
        }
        Expression::NullLiteral { .. } => {
            let _ = writeln!(out, "Null");
        }
        Expression::Identifier { name, .. } => {
            let _ = writeln!(out, "Identifier({name})");
        }
        Expression::BinaryOp { left, operator, right, .. } => {
            let _ = writeln!(out, "BinaryOp({})", binary_symbol(*operator));
            print_expression(out, left, depth + 1);
            print_expression(out, right, depth + 1);
        }
        Expression::UnaryOp { operator, operand, .. } => {
            let _ = writeln!(out, "UnaryOp({})", unary_symbol(*operator));
            print_expression(out, operand, depth + 1);
        }
        Expression::Assignment { target, operator, value, .. } => {
            let _ = writeln!(out, "Assignment({target} {})", assign_symbol(*operator));
            print_expression(out, value, depth + 1);
        }
        Expression::FunctionCall { name, arguments, .. } => {
            let _ = writeln!(out, "FunctionCall({name})");
            for arg in arguments {
                print_expression(out, arg, depth + 1);
            }
        }
        Expression::ArrayLiteral { elements, .. } => {
            let _ = writeln!(out, "ArrayLiteral");
            for element in elements {
                print_expression(out, element, depth + 1);
            }
        }
        Expression::ArrayAccess { array, index, .. } => {
            let _ = writeln!(out, "ArrayAccess");
            print_expression(out, array, depth + 1);
            print_expression(out, index, depth + 1);
        }
        Expression::ArrayIndexAssignment { array, index, operator, value, .. } => {
            let _ = writeln!(out, "ArrayIndexAssignment({})", assign_symbol(*operator));
            print_expression(out, array, depth + 1);
            print_expression(out, index, depth + 1);
            print_expression(out, value, depth + 1);
        }
        Expression::TernaryOp { condition, then_branch, else_branch, .. } => {
            let _ = writeln!(out, "TernaryOp");
            print_expression(out, condition, depth + 1);
            print_expression(out, then_branch, depth + 1);
            print_expression(out, else_branch, depth + 1);
        }
    }
}

fn print_statement(out: &mut String, stmt: &Statement, depth: usize) {
    indent(out, depth);
    match stmt {
        Statement::ExpressionStatement { expression, .. } => {
            let _ = writeln!(out, "ExpressionStatement");
            print_expression(out, expression, depth + 1);
        }
        Statement::VariableDeclaration { name, initializer, .. } => {
            let _ = writeln!(out, "VariableDeclaration({name})");
            if let Some(init) = initializer {
                print_expression(out, init, depth + 1);
            }
        }
        Statement::Block { statements, .. } => {
            let _ = writeln!(out, "Block");
            for s in statements {
                print_statement(out, s, depth + 1);
            }
        }
        Statement::IfStatement { condition, then_branch, else_branch, .. } => {
            let _ = writeln!(out, "IfStatement");
            print_expression(out, condition, depth + 1);
            print_statement(out, then_branch, depth + 1);
            if let Some(else_branch) = else_branch {
                print_statement(out, else_branch, depth + 1);
            }
        }
        Statement::WhileStatement { condition, body, .. } => {
            let _ = writeln!(out, "WhileStatement");
            print_expression(out, condition, depth + 1);
            print_statement(out, body, depth + 1);
        }
        Statement::ForStatement { initializer, condition, increment, body, .. } => {
            let _ = writeln!(out, "ForStatement");
            if let Some(init) = initializer {
                print_statement(out, init, depth + 1);
            }
            if let Some(cond) = condition {
                print_expression(out, cond, depth + 1);
            }
            if let Some(incr) = increment {
                print_expression(out, incr, depth + 1);
            }
            print_statement(out, body, depth + 1);
        }
        Statement::FunctionDeclaration { name, parameters, body, .. } => {
            let _ = writeln!(out, "FunctionDeclaration({name}, [{}])", parameters.join(", "));
            for s in body {
                print_statement(out, s, depth + 1);
            }
        }
        Statement::ReturnStatement { value, .. } => {
            let _ = writeln!(out, "ReturnStatement");
            if let Some(value) = value {
                print_expression(out, value, depth + 1);
            }
        }
        Statement::BreakStatement { .. } => {
            let _ = writeln!(out, "BreakStatement");
        }
        Statement::ContinueStatement { .. } => {
            let _ = writeln!(out, "ContinueStatement");
        }
        Statement::PrintStatement { arguments, .. } => {
            let _ = writeln!(out, "PrintStatement");
            for arg in arguments {
                print_expression(out, arg, depth + 1);
            }
        }
    }
}

/// Renders `program` as a deterministic, indented multi-line tree.
#[must_use]
pub fn print_ast(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    for stmt in &program.statements {
        print_statement(&mut out, stmt, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn pretty_print_is_stable_across_runs() {
        let program = parse("let x = 1 + 2 * 3").unwrap();
        assert_eq!(print_ast(&program), print_ast(&program));
    }

    #[test]
    fn pretty_print_nests_binary_operands() {
        let program = parse("print(1 + 2)").unwrap();
        let rendered = print_ast(&program);
        assert!(rendered.contains("PrintStatement"));
        assert!(rendered.contains("BinaryOp(+)"));
    }
}
