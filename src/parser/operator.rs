//! `:action`, `:durative-action`, `:event`, `:process` (spec C9, C13).

use crate::containers::SymbolList;
use crate::domain::{Action, ComparisonOp, DurativeAction, Event, Formula, Operator, Parameter, Process, Requirement, Requirements};
use crate::error::ParserError;
use crate::ident::Named;
use crate::lexer::{Token, TokenStream};

use super::effect::parse_effect;
use super::formula::{groups_to_parameters, parse_formula};
use super::{at, expect, expect_id, expect_var, parse_typed_list, trace_rule, Scope};

/// Parses a `(:parameters (?x - t ...))` clause if present, otherwise
/// returns an empty parameter list.
fn parse_parameters_clause<'a>(
    i: TokenStream<'a>,
    scope: &mut Scope,
    offset: usize,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, SymbolList<Parameter>), ParserError> {
    if !at(&i, &Token::Parameters) {
        return Ok((i, SymbolList::new()));
    }
    let mut i = expect(i, Token::Parameters)?;
    i = expect(i, Token::OpenParen)?;
    let (mut i, groups) = parse_typed_list(i, expect_var, requirements)?;
    i = expect(i, Token::CloseParen)?;
    let params = groups_to_parameters(groups);
    for p in params.iter() {
        scope.bind(p.name(), p.type_name(), offset)?;
    }
    Ok((i, params))
}

pub fn parse_action<'a>(i: TokenStream<'a>, requirements: &Requirements) -> Result<(TokenStream<'a>, Action), ParserError> {
    trace_rule("action", &i);
    let offset = i.offset();
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Action)?;
    let (mut i, name) = expect_id(i)?;
    let mut scope = Scope::new();
    let (next, parameters) = parse_parameters_clause(i, &mut scope, offset, requirements)?;
    i = next;
    let mut precondition = Formula::True;
    let mut effect = crate::domain::Effect::True;
    while !at(&i, &Token::CloseParen) {
        match i.peek() {
            Some(Token::Precondition) => {
                i = expect(i, Token::Precondition)?;
                let (next, f) = parse_formula(i, &mut scope, requirements)?;
                precondition = f;
                i = next;
            },
            Some(Token::Effect) => {
                i = expect(i, Token::Effect)?;
                let (next, e) = parse_effect(i, &mut scope, requirements)?;
                effect = e;
                i = next;
            },
            _ => return Err(ParserError::expected(":precondition or :effect", &i)),
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok((i, Action::new(&name, parameters, precondition, effect)))
}

pub fn parse_event<'a>(i: TokenStream<'a>, requirements: &Requirements) -> Result<(TokenStream<'a>, Event), ParserError> {
    trace_rule("event", &i);
    let offset = i.offset();
    requirements.require(Requirement::DurativeActions, ":event", offset)?;
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Event)?;
    let (mut i, name) = expect_id(i)?;
    let mut scope = Scope::new();
    let (next, parameters) = parse_parameters_clause(i, &mut scope, offset, requirements)?;
    i = next;
    let mut precondition = Formula::True;
    let mut effect = crate::domain::Effect::True;
    while !at(&i, &Token::CloseParen) {
        match i.peek() {
            Some(Token::Precondition) => {
                i = expect(i, Token::Precondition)?;
                let (next, f) = parse_formula(i, &mut scope, requirements)?;
                precondition = f;
                i = next;
            },
            Some(Token::Effect) => {
                i = expect(i, Token::Effect)?;
                let (next, e) = parse_effect(i, &mut scope, requirements)?;
                effect = e;
                i = next;
            },
            _ => return Err(ParserError::expected(":precondition or :effect", &i)),
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok((i, Event::new(&name, parameters, precondition, effect)))
}

pub fn parse_process<'a>(i: TokenStream<'a>, requirements: &Requirements) -> Result<(TokenStream<'a>, Process), ParserError> {
    trace_rule("process", &i);
    let offset = i.offset();
    requirements.require(Requirement::DurativeActions, ":process", offset)?;
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Process)?;
    let (mut i, name) = expect_id(i)?;
    let mut scope = Scope::new();
    let (next, parameters) = parse_parameters_clause(i, &mut scope, offset, requirements)?;
    i = next;
    let mut precondition = Formula::True;
    let mut effect = crate::domain::Effect::True;
    while !at(&i, &Token::CloseParen) {
        match i.peek() {
            Some(Token::Precondition) => {
                i = expect(i, Token::Precondition)?;
                let (next, f) = parse_formula(i, &mut scope, requirements)?;
                precondition = f;
                i = next;
            },
            Some(Token::Effect) => {
                i = expect(i, Token::Effect)?;
                let (next, e) = parse_effect(i, &mut scope, requirements)?;
                effect = e;
                i = next;
            },
            _ => return Err(ParserError::expected(":precondition or :effect", &i)),
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok((i, Process::new(&name, parameters, precondition, effect)))
}

pub fn parse_durative_action<'a>(
    i: TokenStream<'a>,
    requirements: &Requirements,
) -> Result<(TokenStream<'a>, DurativeAction), ParserError> {
    trace_rule("durative-action", &i);
    let offset = i.offset();
    requirements.require(crate::domain::Requirement::DurativeActions, ":durative-action", offset)?;
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::DurativeAction)?;
    let (mut i, name) = expect_id(i)?;
    let mut scope = Scope::new();
    let (next, parameters) = parse_parameters_clause(i, &mut scope, offset, requirements)?;
    i = next;
    let mut duration = Formula::True;
    let mut condition = Formula::True;
    let mut effect = crate::domain::Effect::True;
    while !at(&i, &Token::CloseParen) {
        match i.peek() {
            Some(Token::Duration) => {
                i = expect(i, Token::Duration)?;
                let (next, f) = parse_formula(i, &mut scope, requirements)?;
                check_duration_inequalities(&f, requirements, offset)?;
                duration = f;
                i = next;
            },
            Some(Token::Condition) => {
                i = expect(i, Token::Condition)?;
                let (next, f) = parse_formula(i, &mut scope, requirements)?;
                condition = f;
                i = next;
            },
            Some(Token::Effect) => {
                i = expect(i, Token::Effect)?;
                let (next, e) = parse_effect(i, &mut scope, requirements)?;
                effect = e;
                i = next;
            },
            _ => return Err(ParserError::expected(":duration, :condition, or :effect", &i)),
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok((i, DurativeAction::new(&name, parameters, duration, condition, effect)))
}

/// `:duration (<= ?duration 10)` and `(>= ?duration 5)` need
/// `:duration-inequalities`; `(= ?duration 5)` and conjunctions thereof
/// don't.
fn check_duration_inequalities(f: &Formula, requirements: &Requirements, offset: usize) -> Result<(), ParserError> {
    match f {
        Formula::Comparison { op: ComparisonOp::Le | ComparisonOp::Ge, .. } => {
            requirements.require(Requirement::DurationInequalities, ":duration with <= or >=", offset)
        },
        Formula::And(parts) => {
            for part in parts {
                check_duration_inequalities(part, requirements, offset)?;
            }
            Ok(())
        },
        _ => Ok(()),
    }
}

/// Dispatches on the operator keyword following the opening `(`.
pub fn parse_operator<'a>(i: TokenStream<'a>, requirements: &Requirements) -> Result<(TokenStream<'a>, Operator), ParserError> {
    let peeked = i.peek_n(2);
    match peeked.get(1) {
        Some(Token::Action) => parse_action(i, requirements).map(|(i, a)| (i, Operator::Action(a))),
        Some(Token::DurativeAction) => parse_durative_action(i, requirements).map(|(i, a)| (i, Operator::Durative(a))),
        Some(Token::Event) => parse_event(i, requirements).map(|(i, a)| (i, Operator::Event(a))),
        Some(Token::Process) => parse_process(i, requirements).map(|(i, a)| (i, Operator::Process(a))),
        _ => Err(ParserError::expected(":action, :durative-action, :event, or :process", &i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_action() {
        let src = "(:action noop :parameters () :precondition () :effect ())";
        let (_, a) = parse_action(TokenStream::new(src), &Requirements::new()).unwrap();
        assert_eq!(a.name(), "noop");
    }

    #[test]
    fn action_without_precondition_defaults_to_true() {
        let src = "(:action fill :parameters () :effect (and))";
        let (_, a) = parse_action(TokenStream::new(src), &Requirements::new()).unwrap();
        assert_eq!(*a.precondition(), Formula::True);
    }

    #[test]
    fn durative_action_needs_requirement() {
        let src = "(:durative-action go :parameters () :duration (= ?duration 5) :condition () :effect ())";
        let err = parse_durative_action(TokenStream::new(src), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn duration_equality_against_the_placeholder_needs_no_numeric_fluents() {
        let src = "(:durative-action go :parameters () :duration (= ?duration 5) :condition () :effect ())";
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::DurativeActions);
        let (_, a) = parse_durative_action(TokenStream::new(src), &reqs).unwrap();
        assert_eq!(a.name(), "go");
    }

    #[test]
    fn duration_inequality_needs_its_own_requirement() {
        let src = "(:durative-action go :parameters () :duration (<= ?duration 10) :condition () :effect ())";
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::DurativeActions);
        let err = parse_durative_action(TokenStream::new(src), &reqs).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);

        reqs.insert(crate::domain::Requirement::DurationInequalities);
        let (_, a) = parse_durative_action(TokenStream::new(src), &reqs).unwrap();
        assert_eq!(a.name(), "go");
    }

    #[test]
    fn event_and_process_need_durative_actions_requirement() {
        let event_src = "(:event spill :parameters () :precondition () :effect ())";
        let err = parse_event(TokenStream::new(event_src), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);

        let process_src = "(:process drain :parameters () :precondition () :effect ())";
        let err = parse_process(TokenStream::new(process_src), &Requirements::new()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);

        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::DurativeActions);
        let (_, e) = parse_event(TokenStream::new(event_src), &reqs).unwrap();
        assert_eq!(e.name(), "spill");
        let (_, p) = parse_process(TokenStream::new(process_src), &reqs).unwrap();
        assert_eq!(p.name(), "drain");
    }
}
