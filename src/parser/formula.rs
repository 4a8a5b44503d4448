//! Logical formulas: preconditions, goals, derived-predicate bodies
//! (spec C7, C13).

use crate::containers::SymbolList;
use crate::domain::{ComparisonOp, Constraint, Formula, Requirement, Requirements, TimeSpecifier};
use crate::error::ParserError;
use crate::ident::Named;
use crate::lexer::{Token, TokenStream};

use super::{
    at, expect, expect_var, parse_qualified_name, parse_term_list, parse_typed_list, trace_rule, Scope, TypedGroup,
};
use super::expr::parse_expression;

fn comparison_op(tok: &Token) -> Option<ComparisonOp> {
    Some(match tok {
        Token::Lt => ComparisonOp::Lt,
        Token::Le => ComparisonOp::Le,
        Token::EqSign => ComparisonOp::Eq,
        Token::Ge => ComparisonOp::Ge,
        Token::Gt => ComparisonOp::Gt,
        _ => return None,
    })
}

/// A duration constraint (`(= ?duration 5)`, `(<= ?duration 10)`) is a
/// numeric comparison too, but it's gated by `:durative-actions` /
/// `:duration-inequalities` rather than `:numeric-fluents` — comparing
/// against the duration placeholder doesn't itself involve a fluent.
fn require_numeric_unless_duration(
    requirements: &Requirements,
    lhs: &crate::domain::Expression,
    rhs: &crate::domain::Expression,
    construct: &str,
    offset: usize,
) -> Result<(), ParserError> {
    use crate::domain::Expression;
    if matches!(lhs, Expression::DurationPlaceholder) || matches!(rhs, Expression::DurationPlaceholder) {
        return Ok(());
    }
    requirements.require(Requirement::NumericFluents, construct, offset)
}

pub(crate) fn groups_to_parameters(groups: Vec<TypedGroup>) -> SymbolList<crate::domain::Parameter> {
    let mut params = SymbolList::new();
    for group in groups {
        let type_name = group.types.first().cloned().unwrap_or_else(|| "object".to_string());
        for name in group.names {
            params.append(crate::domain::Parameter::new(&name, &type_name));
        }
    }
    params
}

/// Parses a quantifier's `(?x ?y - type ...)` variable list, binding
/// each into a fresh scope frame the caller pops after parsing the
/// quantifier body.
fn parse_quantified_vars<'a>(
    i: TokenStream<'a>,
    scope: &mut Scope,
    offset: usize,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, SymbolList<crate::domain::Parameter>), ParserError> {
    let i = expect(i, Token::OpenParen)?;
    let (i, groups) = parse_typed_list(i, expect_var, requirements)?;
    let i = expect(i, Token::CloseParen)?;
    let params = groups_to_parameters(groups);
    for p in params.iter() {
        scope.bind(p.name(), p.type_name(), offset)?;
    }
    Ok((i, params))
}

/// Parses one formula node. `requirements` gates which constructs are
/// legal (spec §4.6's table): `and`/literals are always available,
/// everything else checks its requirement before committing.
pub fn parse_formula<'a>(
    i: TokenStream<'a>,
    scope: &mut Scope,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, Formula), ParserError> {
    trace_rule("formula", &i);
    let offset = i.offset();
    let mut i = expect(i, Token::OpenParen)?;
    if at(&i, &Token::CloseParen) {
        return Ok((expect(i, Token::CloseParen)?, Formula::True));
    }

    let tok = i.peek().ok_or_else(|| ParserError::expected("a formula", &i))?;
    match tok {
        Token::And => {
            i = i.advance();
            let mut parts = Vec::new();
            while !at(&i, &Token::CloseParen) {
                let (next, f) = parse_formula(i, scope, requirements)?;
                parts.push(f);
                i = next;
            }
            i = expect(i, Token::CloseParen)?;
            Ok((i, Formula::and(parts)))
        },
        Token::Or => {
            requirements.require(Requirement::DisjunctivePreconditions, "or", offset)?;
            i = i.advance();
            let mut parts = Vec::new();
            while !at(&i, &Token::CloseParen) {
                let (next, f) = parse_formula(i, scope, requirements)?;
                parts.push(f);
                i = next;
            }
            i = expect(i, Token::CloseParen)?;
            Ok((i, Formula::or(parts)))
        },
        Token::Not => {
            i = i.advance();
            let (i, inner) = parse_formula(i, scope, requirements)?;
            let i = expect(i, Token::CloseParen)?;
            // Negating a term-(in)equality test is gated by `:equality`
            // alone (PDDL convention: `(not (= ?x ?y))` is a plain
            // inequality test, not a "negative precondition"); negating
            // anything else — predicates included — needs the flag.
            if !matches!(inner, Formula::TermEquals(..)) {
                requirements.require(Requirement::NegativePreconditions, "not", offset)?;
            }
            Ok((i, Formula::not(inner)))
        },
        Token::Imply => {
            requirements.require(Requirement::DisjunctivePreconditions, "imply", offset)?;
            i = i.advance();
            let (next, lhs) = parse_formula(i, scope, requirements)?;
            let (next, rhs) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Imply(Box::new(lhs), Box::new(rhs))))
        },
        Token::Forall => {
            requirements.require(Requirement::UniversalPreconditions, "forall", offset)?;
            i = i.advance();
            scope.push();
            let (next, vars) = parse_quantified_vars(i, scope, offset, requirements)?;
            let (next, body) = parse_formula(next, scope, requirements)?;
            scope.pop();
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Forall { vars, body: Box::new(body) }))
        },
        Token::Exists => {
            requirements.require(Requirement::ExistentialPreconditions, "exists", offset)?;
            i = i.advance();
            scope.push();
            let (next, vars) = parse_quantified_vars(i, scope, offset, requirements)?;
            let (next, body) = parse_formula(next, scope, requirements)?;
            scope.pop();
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Exists { vars, body: Box::new(body) }))
        },
        Token::Preference => {
            requirements.require(Requirement::Preferences, "preference", offset)?;
            i = i.advance();
            let (i, name) = match super::expect_id(i.clone()) {
                Ok((next, n)) if at(&next, &Token::OpenParen) => (next, Some(n)),
                _ => (i, None),
            };
            let (i, body) = parse_formula(i, scope, requirements)?;
            let i = expect(i, Token::CloseParen)?;
            Ok((i, Formula::Preference { name, body: Box::new(body) }))
        },
        Token::At => {
            i = i.advance();
            match i.peek() {
                Some(Token::Start) => {
                    i = i.advance();
                    let (next, body) = parse_formula(i, scope, requirements)?;
                    let next = expect(next, Token::CloseParen)?;
                    Ok((next, Formula::Timed { when: TimeSpecifier::Start, body: Box::new(body) }))
                },
                Some(Token::End) => {
                    i = i.advance();
                    let (next, body) = parse_formula(i, scope, requirements)?;
                    let next = expect(next, Token::CloseParen)?;
                    Ok((next, Formula::Timed { when: TimeSpecifier::End, body: Box::new(body) }))
                },
                other => Err(ParserError::expected_token(Token::Start, other, &i)),
            }
        },
        Token::Over => {
            i = i.advance();
            i = expect(i, Token::All)?;
            let (next, body) = parse_formula(i, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Timed { when: TimeSpecifier::OverAll, body: Box::new(body) }))
        },
        Token::Always => {
            requirements.require(Requirement::Constraints, "always", offset)?;
            i = i.advance();
            let (next, body) = parse_formula(i, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::Always(Box::new(body)))))
        },
        Token::Sometime => {
            requirements.require(Requirement::Constraints, "sometime", offset)?;
            i = i.advance();
            let (next, body) = parse_formula(i, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::Sometime(Box::new(body)))))
        },
        Token::AtMostOnce => {
            requirements.require(Requirement::Constraints, "at-most-once", offset)?;
            i = i.advance();
            let (next, body) = parse_formula(i, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::AtMostOnce(Box::new(body)))))
        },
        Token::Within => {
            requirements.require(Requirement::Constraints, "within", offset)?;
            i = i.advance();
            let (next, n) = super::expect_number(i)?;
            let (next, body) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::Within(n, Box::new(body)))))
        },
        Token::HoldAfter => {
            requirements.require(Requirement::Constraints, "hold-after", offset)?;
            i = i.advance();
            let (next, n) = super::expect_number(i)?;
            let (next, body) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::HoldAfter(n, Box::new(body)))))
        },
        Token::HoldDuring => {
            requirements.require(Requirement::Constraints, "hold-during", offset)?;
            i = i.advance();
            let (next, n1) = super::expect_number(i)?;
            let (next, n2) = super::expect_number(next)?;
            let (next, body) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::HoldDuring(n1, n2, Box::new(body)))))
        },
        Token::SometimeAfter => {
            requirements.require(Requirement::Constraints, "sometime-after", offset)?;
            i = i.advance();
            let (next, a) = parse_formula(i, scope, requirements)?;
            let (next, b) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::SometimeAfter(Box::new(a), Box::new(b)))))
        },
        Token::SometimeBefore => {
            requirements.require(Requirement::Constraints, "sometime-before", offset)?;
            i = i.advance();
            let (next, a) = parse_formula(i, scope, requirements)?;
            let (next, b) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::SometimeBefore(Box::new(a), Box::new(b)))))
        },
        Token::AlwaysWithin => {
            requirements.require(Requirement::Constraints, "always-within", offset)?;
            i = i.advance();
            let (next, n) = super::expect_number(i)?;
            let (next, a) = parse_formula(next, scope, requirements)?;
            let (next, b) = parse_formula(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            Ok((next, Formula::Constraint(Constraint::AlwaysWithin(n, Box::new(a), Box::new(b)))))
        },
        Token::EqSign => {
            // `=` is overloaded: `(= ?a ?b ...)` is term equality over
            // two or more terms (needs `:equality`), but `(= (fn ?x)
            // 5)` is a binary numeric comparison between fluent
            // expressions (spec §4.6's term-equality-vs-expression-
            // equality disambiguation; spec: a term-equality list has
            // length at least 2). Parse every operand as an expression
            // and only commit to `TermEquals` once every one of them
            // turned out to be a bare term reference.
            i = i.advance();
            let mut exprs = Vec::new();
            loop {
                let (next, e) = parse_expression(i, scope, requirements)?;
                exprs.push(e);
                i = next;
                if at(&i, &Token::CloseParen) {
                    break;
                }
            }
            let next = expect(i, Token::CloseParen)?;
            let all_terms = exprs.len() >= 2 && exprs.iter().all(|e| matches!(e, crate::domain::Expression::TermRef(_)));
            if all_terms {
                requirements.require(Requirement::Equality, "=", offset)?;
                let terms = exprs
                    .into_iter()
                    .map(|e| match e {
                        crate::domain::Expression::TermRef(t) => t,
                        _ => unreachable!("all_terms checked above"),
                    })
                    .collect();
                Ok((next, Formula::TermEquals(terms)))
            } else if exprs.len() == 2 {
                let mut it = exprs.into_iter();
                let lhs = it.next().expect("len checked");
                let rhs = it.next().expect("len checked");
                require_numeric_unless_duration(requirements, &lhs, &rhs, "=", offset)?;
                Ok((next, Formula::Comparison { op: ComparisonOp::Eq, lhs, rhs }))
            } else {
                Err(ParserError::expected("exactly two operands in a numeric `=` comparison", &next))
            }
        },
        ref t if comparison_op(t).is_some() => {
            let op = comparison_op(&tok).expect("checked above");
            i = i.advance();
            let (next, lhs) = parse_expression(i, scope, requirements)?;
            let (next, rhs) = parse_expression(next, scope, requirements)?;
            let next = expect(next, Token::CloseParen)?;
            require_numeric_unless_duration(requirements, &lhs, &rhs, &op.to_string(), offset)?;
            Ok((next, Formula::Comparison { op, lhs, rhs }))
        },
        _ => {
            let (i, (class, name)) = parse_qualified_name(i, requirements)?;
            let (i, args) = parse_term_list(i, scope)?;
            let i = expect(i, Token::CloseParen)?;
            Ok((i, Formula::Predicate { name, class, args }))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_precondition_as_true() {
        let (_, f) = parse_formula(TokenStream::new("()"), &mut Scope::new(), &Requirements::new()).unwrap();
        assert_eq!(f, Formula::True);
    }

    #[test]
    fn rejects_or_without_requirement() {
        let err = parse_formula(TokenStream::new("(or (p) (q))"), &mut Scope::new(), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn parses_predicate_application() {
        let (_, f) = parse_formula(TokenStream::new("(on a b)"), &mut Scope::new(), &Requirements::new()).unwrap();
        match f {
            Formula::Predicate { name, args, .. } => {
                assert_eq!(name, "on");
                assert_eq!(args.len(), 2);
            },
            _ => panic!("expected predicate"),
        }
    }

    #[test]
    fn bare_equals_between_terms_needs_equality_requirement() {
        let err = parse_formula(TokenStream::new("(= a b)"), &mut Scope::new(), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn equals_over_three_terms_parses_as_a_single_term_equality() {
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::Equality);
        let (rest, f) = parse_formula(TokenStream::new("(= a b c)"), &mut Scope::new(), &reqs).unwrap();
        assert!(rest.is_empty());
        match f {
            Formula::TermEquals(terms) => assert_eq!(terms.len(), 3),
            _ => panic!("expected term equality"),
        }
    }

    #[test]
    fn equals_against_a_function_application_is_a_numeric_comparison() {
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::NumericFluents);
        let (_, f) = parse_formula(TokenStream::new("(= (total-cost) 5)"), &mut Scope::new(), &reqs).unwrap();
        assert!(matches!(f, Formula::Comparison { op: ComparisonOp::Eq, .. }));
    }

    #[test]
    fn sometime_after_needs_the_constraints_requirement() {
        let err =
            parse_formula(TokenStream::new("(sometime-after (p) (q))"), &mut Scope::new(), &Requirements::new())
                .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn hold_during_parses_its_two_numeric_bounds() {
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::Constraints);
        let (_, f) =
            parse_formula(TokenStream::new("(hold-during 1 5 (p))"), &mut Scope::new(), &reqs).unwrap();
        match f {
            Formula::Constraint(crate::domain::Constraint::HoldDuring(n1, n2, _)) => {
                assert_eq!(n1, crate::domain::Number::Int(1));
                assert_eq!(n2, crate::domain::Number::Int(5));
            },
            other => panic!("unexpected constraint shape: {other:?}"),
        }
    }

    #[test]
    fn forall_binds_and_unbinds_its_variable() {
        let mut scope = Scope::new();
        let mut reqs = Requirements::new();
        reqs.insert(Requirement::UniversalPreconditions);
        reqs.insert(Requirement::Typing);
        let (_, f) = parse_formula(TokenStream::new("(forall (?x - obj) (p ?x))"), &mut scope, &reqs).unwrap();
        assert!(matches!(f, Formula::Forall { .. }));
        assert!(scope.resolve("x", 0).is_err());
    }
}
