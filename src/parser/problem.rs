//! `(define (problem ...) ...)` (spec C11, C13).

use std::rc::Rc;

use crate::domain::{Domain, Effect, Requirement};
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};
use crate::problem::{MetricDirection, Problem};

use super::effect::parse_effect;
use super::expr::parse_expression;
use super::formula::parse_formula;
use super::requirements::parse_requirements;
use super::{at, expect, expect_id, parse_typed_list, skip_balanced, trace_rule, Scope};

/// Scans just far enough to read the `:domain` a problem file names,
/// without fully parsing it — used by the driver's forward-reference
/// pre-pass, which must resolve every problem's domain before parsing
/// that problem's body (spec's two-pass ordering).
pub fn peek_domain_name(source: &str) -> Result<String, ParserError> {
    let i = TokenStream::new(source);
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Define)?;
    i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::ProblemHead)?;
    let (i, _name) = expect_id(i)?;
    let mut i = expect(i, Token::CloseParen)?;
    loop {
        if at(&i, &Token::CloseParen) {
            return Err(ParserError::syntax("problem is missing a :domain reference", i.offset()));
        }
        let peeked = i.peek_n(2);
        if peeked.get(1) == Some(&Token::DomainRef) {
            let inner = expect(i, Token::OpenParen)?;
            let inner = expect(inner, Token::DomainRef)?;
            let (_, name) = expect_id(inner)?;
            return Ok(name);
        }
        i = skip_balanced(i)?;
    }
}

pub fn parse_problem(source: &str, domain: Rc<Domain>) -> Result<Problem, ParserError> {
    let i = TokenStream::new(source);
    trace_rule("problem", &i);
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Define)?;
    i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::ProblemHead)?;
    let (i, name) = expect_id(i)?;
    let mut i = expect(i, Token::CloseParen)?;

    let requirements = domain.requirements().clone();
    let mut problem = Problem::new(&name, domain, requirements);
    let mut scope = Scope::new();

    while !at(&i, &Token::CloseParen) {
        let offset = i.offset();
        let peeked = i.peek_n(2);
        i = match peeked.get(1) {
            Some(Token::DomainRef) => skip_balanced(i)?,
            Some(Token::Requirements) => {
                let (next, reqs) = parse_requirements(i)?;
                *problem.requirements_mut() = reqs;
                next
            },
            Some(Token::Objects) => parse_objects(i, &mut problem)?,
            Some(Token::Init) => parse_init(i, &mut problem, &mut scope)?,
            Some(Token::Goal) => {
                let oi = expect(i, Token::OpenParen)?;
                let oi = expect(oi, Token::Goal)?;
                let (next, f) = parse_formula(oi, &mut scope, problem.requirements())?;
                let next = expect(next, Token::CloseParen)?;
                problem.set_goal(f);
                next
            },
            Some(Token::Constraints) => {
                problem.requirements().require(Requirement::Constraints, ":constraints", offset)?;
                let oi = expect(i, Token::OpenParen)?;
                let oi = expect(oi, Token::Constraints)?;
                let (next, f) = parse_formula(oi, &mut scope, problem.requirements())?;
                let next = expect(next, Token::CloseParen)?;
                problem.set_constraints(f);
                next
            },
            Some(Token::Metric) => parse_metric(i, &mut problem, &mut scope)?,
            _ => return Err(ParserError::expected("a problem section", &i)),
        };
    }
    i = expect(i, Token::CloseParen)?;
    debug_assert!(i.is_empty(), "trailing tokens after a well-formed problem are a caller bug, not a parse error");
    Ok(problem)
}

fn parse_objects<'a>(i: TokenStream<'a>, problem: &mut Problem) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Objects)?;
    let reqs = problem.requirements().clone();
    let (mut i, groups) = parse_typed_list(i, expect_id, &reqs)?;
    for group in groups {
        let type_name = group.types.first().cloned().unwrap_or_else(|| "object".to_string());
        for name in &group.names {
            problem.objects_mut().add(crate::domain::Object::new(name, &type_name))?;
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

/// Parses `:init`, rejecting any literal that isn't legal in an
/// initial state (spec §4.5's init-state restriction).
fn parse_init<'a>(i: TokenStream<'a>, problem: &mut Problem, scope: &mut Scope) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Init)?;
    let mut parts = Vec::new();
    while !at(&i, &Token::CloseParen) {
        let offset = i.offset();
        let (next, effect) = parse_effect(i, scope, problem.requirements())?;
        if !effect.is_init_legal() {
            return Err(ParserError::bad_initial_state("this effect shape is not legal in :init", offset));
        }
        parts.push(effect);
        i = next;
    }
    i = expect(i, Token::CloseParen)?;
    problem.set_init(Effect::and(parts));
    Ok(i)
}

fn parse_metric<'a>(i: TokenStream<'a>, problem: &mut Problem, scope: &mut Scope) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Metric)?;
    let direction = match i.peek() {
        Some(Token::Minimize) => {
            i = i.advance();
            MetricDirection::Minimize
        },
        Some(Token::Maximize) => {
            i = i.advance();
            MetricDirection::Maximize
        },
        _ => return Err(ParserError::expected("minimize or maximize", &i)),
    };
    let reqs = problem.requirements().clone();
    let (i, expr) = parse_expression(i, scope, &reqs)?;
    let i = expect(i, Token::CloseParen)?;
    problem.set_metric(direction, expr);
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Requirements, TypingGraph};

    fn empty_domain() -> Rc<Domain> {
        Rc::new(Domain::new("d", Requirements::new(), TypingGraph::new()))
    }

    fn typed_domain() -> Rc<Domain> {
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::Typing);
        Rc::new(Domain::new("d", reqs, TypingGraph::new()))
    }

    #[test]
    fn peeks_domain_name_without_it_being_defined_yet() {
        let src = "(define (problem p) (:domain letseat) (:objects a - obj))";
        assert_eq!(peek_domain_name(src).unwrap(), "letseat");
    }

    #[test]
    fn parses_objects_and_goal() {
        let src = "(define (problem p) (:domain d) (:objects a - obj) (:init) (:goal (p a)))";
        let problem = parse_problem(src, typed_domain()).unwrap();
        assert_eq!(problem.objects().len(), 1);
    }

    #[test]
    fn init_rejects_conditional_effects() {
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::ConditionalEffects);
        let domain = Rc::new(Domain::new("d", reqs, TypingGraph::new()));
        let src = "(define (problem p) (:domain d) (:init (when (p) (q))))";
        let err = parse_problem(src, domain).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::BadInitialState);
    }
}
