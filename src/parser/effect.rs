//! Effects: operator bodies and the restricted `:init` shape (spec C8, C13).

use crate::domain::effect::AssignOp;
use crate::domain::{Effect, Requirement, Requirements, TimeSpecifier};
use crate::error::ParserError;
use crate::ident::Named;
use crate::lexer::{Token, TokenStream};

use super::expr::parse_expression;
use super::formula::parse_formula;
use super::{at, expect, parse_qualified_name, parse_term_list, parse_typed_list, expect_var, trace_rule, Scope};

fn assign_op(tok: &Token) -> Option<AssignOp> {
    Some(match tok {
        Token::Assign => AssignOp::Assign,
        Token::Increase => AssignOp::Increase,
        Token::Decrease => AssignOp::Decrease,
        Token::ScaleUp => AssignOp::ScaleUp,
        Token::ScaleDown => AssignOp::ScaleDown,
        _ => return None,
    })
}

/// Parses one effect node (spec §4.4/§4.5's "aggregation parsing
/// pattern": `and`/`oneof` both collect a list of sibling effects the
/// same way `and`/`or` formulas do).
pub fn parse_effect<'a>(
    i: TokenStream<'a>,
    scope: &mut Scope,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, Effect), ParserError> {
    trace_rule("effect", &i);
    let offset = i.offset();
    let mut i = expect(i, Token::OpenParen)?;
    if at(&i, &Token::CloseParen) {
        return Ok((expect(i, Token::CloseParen)?, Effect::True));
    }

    let tok = i.peek().ok_or_else(|| ParserError::expected("an effect", &i))?;
    match tok {
        Token::And => {
            i = i.advance();
            let mut parts = Vec::new();
            while !at(&i, &Token::CloseParen) {
                let (next, e) = parse_effect(i, scope, requirements)?;
                parts.push(e);
                i = next;
            }
            i = expect(i, Token::CloseParen)?;
            Ok((i, Effect::and(parts)))
        },
        Token::Oneof => {
            i = i.advance();
            let mut parts = Vec::new();
            while !at(&i, &Token::CloseParen) {
                let (next, e) = parse_effect(i, scope, requirements)?;
                parts.push(e);
                i = next;
            }
            i = expect(i, Token::CloseParen)?;
            Ok((i, Effect::Oneof(parts)))
        },
        Token::Not => {
            i = i.advance();
            let (i, inner) = parse_effect(i, scope, requirements)?;
            let i = expect(i, Token::CloseParen)?;
            Ok((i, Effect::Not(Box::new(inner))))
        },
        Token::Forall => {
            requirements.require(Requirement::ConditionalEffects, "forall effect", offset)?;
            i = i.advance();
            scope.push();
            let vars_start = expect(i, Token::OpenParen)?;
            let (next, groups) = parse_typed_list(vars_start, expect_var, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            let params = super::formula::groups_to_parameters(groups);
            for p in params.iter() {
                scope.bind(p.name(), p.type_name(), offset)?;
            }
            let (next, body) = parse_effect(next, scope, requirements)?;
            scope.pop();
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Effect::Forall { vars: params, body: Box::new(body) }))
        },
        Token::When => {
            requirements.require(Requirement::ConditionalEffects, "when", offset)?;
            i = i.advance();
            let (next, condition) = parse_formula(i, scope, requirements)?;
            let (next, effect) = parse_effect(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Effect::When { condition, effect: Box::new(effect) }))
        },
        Token::At => {
            i = i.advance();
            match i.peek() {
                Some(Token::Start) => {
                    i = i.advance();
                    let (next, body) = parse_effect(i, scope, requirements)?;
                    let next = expect(next, Token::CloseParen)?;
                    Ok((next, Effect::Timed { when: TimeSpecifier::Start, body: Box::new(body) }))
                },
                Some(Token::End) => {
                    i = i.advance();
                    let (next, body) = parse_effect(i, scope, requirements)?;
                    let next = expect(next, Token::CloseParen)?;
                    Ok((next, Effect::Timed { when: TimeSpecifier::End, body: Box::new(body) }))
                },
                _ => {
                    requirements.require(Requirement::TimedInitialLiterals, "at <number>", offset)?;
                    let (next, number) = super::expect_number(i)?;
                    let (next, literal) = parse_effect(next, scope, requirements)?;
                    let next = expect(next, Token::CloseParen)?;
                    Ok((next, Effect::At { time: number.as_f64(), literal: Box::new(literal) }))
                },
            }
        },
        Token::EqSign => {
            // `(= (fluent args) value)` is PDDL's shorthand for
            // `(assign (fluent args) value)`, used almost exclusively
            // to set a numeric fluent's initial value in `:init`.
            requirements.require(Requirement::NumericFluents, "=", offset)?;
            i = i.advance();
            let (next, fhead) = parse_expression(i, scope, requirements)?;
            let (next, value) = parse_expression(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Effect::Assign { op: AssignOp::Assign, fhead, value }))
        },
        ref t if assign_op(t).is_some() => {
            let op = assign_op(&tok).expect("checked above");
            requirements.require(Requirement::NumericFluents, &op.to_string(), offset)?;
            i = i.advance();
            let (next, fhead) = parse_expression(i, scope, requirements)?;
            let (next, value) = parse_expression(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Effect::Assign { op, fhead, value }))
        },
        _ => {
            let (i, (class, name)) = parse_qualified_name(i, requirements)?;
            let (i, args) = parse_term_list(i, scope)?;
            let i = expect(i, Token::CloseParen)?;
            Ok((i, Effect::Predicate { name, class, args }))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conjunction_of_literals() {
        let (_, e) = parse_effect(TokenStream::new("(and (p) (not (q)))"), &mut Scope::new(), &Requirements::new()).unwrap();
        assert!(matches!(e, Effect::And(items) if items.len() == 2));
    }

    #[test]
    fn init_restriction_rejects_forall_and_when() {
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::ConditionalEffects);
        reqs.insert(Requirement::Typing);
        let (_, e) =
            parse_effect(TokenStream::new("(forall (?x - obj) (p ?x))"), &mut Scope::new(), &reqs).unwrap();
        assert!(!e.is_init_legal());
    }

    #[test]
    fn equals_shorthand_assigns_a_fluents_initial_value() {
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::NumericFluents);
        let (_, e) = parse_effect(TokenStream::new("(= (f a) 3)"), &mut Scope::new(), &reqs).unwrap();
        assert!(matches!(e, Effect::Assign { op: AssignOp::Assign, .. }));
    }

    #[test]
    fn equals_shorthand_needs_numeric_fluents_requirement() {
        let err = parse_effect(TokenStream::new("(= (f a) 3)"), &mut Scope::new(), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn timed_initial_literal_needs_requirement() {
        let err = parse_effect(TokenStream::new("(at 5 (p))"), &mut Scope::new(), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }
}
