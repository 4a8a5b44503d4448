//! Numeric expressions (spec C6, C13).

use crate::domain::{ArithOp, Expression, Requirement, Requirements};
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

use super::{expect, expect_number, parse_qualified_name, parse_term_list, trace_rule, Scope};

fn arith_op(tok: &Token) -> Option<ArithOp> {
    Some(match tok {
        Token::Plus => ArithOp::Add,
        Token::Dash => ArithOp::Sub,
        Token::Times => ArithOp::Mul,
        Token::Divide => ArithOp::Div,
        _ => return None,
    })
}

/// Parses a numeric expression: a literal, `#t`, a parenthesized
/// arithmetic operator applied n-ary (folded pairwise left to right),
/// unary `-` negation, or a (possibly class-qualified) function
/// application.
pub fn parse_expression<'a>(
    i: TokenStream<'a>,
    scope: &Scope,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, Expression), ParserError> {
    trace_rule("expression", &i);
    // `#t` (inside a `:condition`/`:effect` timing check) and
    // `?duration` (inside a `:duration` constraint) are both the same
    // placeholder: whatever the actual duration turns out to be once
    // the durative action is grounded.
    if matches!(i.peek(), Some(Token::TimeVar) | Some(Token::DurationVar)) {
        return Ok((i.advance(), Expression::DurationPlaceholder));
    }
    if let Ok((next, number)) = expect_number(i.clone()) {
        return Ok((next, Expression::NumberLiteral(number)));
    }
    if let Ok((next, term)) = super::parse_term(i.clone(), scope) {
        if !term.is_variable() {
            // A bare object name is ambiguous with a 0-ary function
            // application only inside parens; outside parens it can
            // only be an object-fluent term reference.
            return Ok((next, Expression::TermRef(term)));
        }
        return Ok((next, Expression::TermRef(term)));
    }

    let mut i = expect(i, Token::OpenParen)?;
    if let Some(tok) = i.peek() {
        if let Some(op) = arith_op(&tok) {
            let construct = match op {
                ArithOp::Add => "+",
                ArithOp::Sub => "-",
                ArithOp::Mul => "*",
                ArithOp::Div => "/",
            };
            requirements.require(Requirement::NumericFluents, construct, i.offset())?;
            i = i.advance();
            let (next, first) = parse_expression(i, scope, requirements)?;
            i = next;
            let mut acc = first;
            let mut operands = Vec::new();
            while !super::at(&i, &Token::CloseParen) {
                let (next, operand) = parse_expression(i, scope, requirements)?;
                operands.push(operand);
                i = next;
            }
            if operands.is_empty() && op == ArithOp::Sub {
                acc = Expression::negate(acc);
            } else {
                for operand in operands {
                    acc = Expression::binary(op, acc, operand);
                }
            }
            i = expect(i, Token::CloseParen)?;
            return Ok((i, acc));
        }
    }
    let (i, (class, name)) = parse_qualified_name(i, requirements)?;
    let (i, args) = parse_term_list(i, scope)?;
    let i = expect(i, Token::CloseParen)?;
    Ok((i, Expression::FunctionApplication { name, class, args }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Number;

    #[test]
    fn parses_number_literal() {
        let (_, e) = parse_expression(TokenStream::new("5"), &Scope::new(), &Requirements::new()).unwrap();
        assert_eq!(e, Expression::NumberLiteral(Number::Int(5)));
    }

    fn numeric_fluents_reqs() -> Requirements {
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::NumericFluents);
        reqs
    }

    #[test]
    fn folds_nary_sum_pairwise() {
        let (_, e) = parse_expression(TokenStream::new("(+ 1 2 3)"), &Scope::new(), &numeric_fluents_reqs()).unwrap();
        assert!(matches!(e, Expression::BinaryOp { op: ArithOp::Add, .. }));
    }

    #[test]
    fn arithmetic_needs_numeric_fluents_requirement() {
        let err = parse_expression(TokenStream::new("(+ 1 2)"), &Scope::new(), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn unary_minus_negates() {
        let (_, e) = parse_expression(TokenStream::new("(- 5)"), &Scope::new(), &numeric_fluents_reqs()).unwrap();
        assert!(matches!(e, Expression::Negate(_)));
    }

    #[test]
    fn parses_function_application() {
        let mut scope = Scope::new();
        scope.bind("r", "robot", 0).unwrap();
        let (_, e) =
            parse_expression(TokenStream::new("(battery-level ?r)"), &scope, &Requirements::new()).unwrap();
        match e {
            Expression::FunctionApplication { name, class, args } => {
                assert_eq!(name, "battery-level");
                assert!(class.is_none());
                assert_eq!(args.len(), 1);
            },
            _ => panic!("expected function application"),
        }
    }

    #[test]
    fn class_qualified_function_needs_modules_requirement() {
        let err = parse_expression(TokenStream::new("(robot.battery-level)"), &Scope::new(), &Requirements::new())
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);

        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::Modules);
        let (_, e) = parse_expression(TokenStream::new("(robot.battery-level)"), &Scope::new(), &reqs).unwrap();
        assert!(matches!(e, Expression::FunctionApplication { class: Some(c), .. } if c == "robot"));
    }
}
