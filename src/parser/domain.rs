//! `(define (domain ...) ...)` (spec C11, C13).

use crate::containers::SymbolList;
use crate::domain::{Class, DerivedPredicate, Domain, Function, Operator, Parameter, Predicate, Requirement, TypingGraph};
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

use super::formula::{groups_to_parameters, parse_formula};
use super::operator::parse_operator;
use super::requirements::parse_requirements;
use super::types::parse_types;
use super::{at, expect, expect_id, expect_var, parse_typed_list, trace_rule, Scope};

pub fn parse_domain(source: &str) -> Result<Domain, ParserError> {
    let i = TokenStream::new(source);
    trace_rule("domain", &i);
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Define)?;
    i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::DomainHead)?;
    let (i, name) = expect_id(i)?;
    let mut i = expect(i, Token::CloseParen)?;

    let mut domain = Domain::new(&name, crate::domain::Requirements::new(), TypingGraph::new());

    while !at(&i, &Token::CloseParen) {
        let offset = i.offset();
        let peeked = i.peek_n(2);
        i = match peeked.get(1) {
            Some(Token::Requirements) => {
                let (next, reqs) = parse_requirements(i)?;
                *domain.requirements_mut() = reqs;
                next
            },
            Some(Token::Types) => {
                domain.requirements().require(Requirement::Typing, ":types", offset)?;
                let reqs = domain.requirements().clone();
                parse_types(i, domain.types_mut(), &reqs)?
            },
            Some(Token::Constants) => parse_constants(i, &mut domain)?,
            Some(Token::Predicates) => parse_predicates(i, &mut domain)?,
            Some(Token::Functions) => {
                let reqs = domain.requirements();
                if !reqs.contains(Requirement::NumericFluents) && !reqs.contains(Requirement::ObjectFluents) {
                    reqs.require(Requirement::NumericFluents, ":functions", offset)?;
                }
                parse_functions(i, &mut domain)?
            },
            Some(Token::Constraints) => {
                domain.requirements().require(Requirement::Constraints, ":constraints", offset)?;
                let oi = expect(i, Token::OpenParen)?;
                let oi = expect(oi, Token::Constraints)?;
                let mut scope = Scope::new();
                let (next, formula) = parse_formula(oi, &mut scope, domain.requirements())?;
                let next = expect(next, Token::CloseParen)?;
                let mut found = Vec::new();
                formula.collect_preferences(&mut found);
                domain.set_constraints(formula);
                for pref in found {
                    domain.push_preference(pref);
                }
                next
            },
            Some(Token::Derived) => {
                domain.requirements().require(Requirement::DerivedPredicates, ":derived", offset)?;
                parse_derived(i, &mut domain)?
            },
            Some(Token::Classes) => {
                domain.requirements().require(Requirement::Modules, ":classes", offset)?;
                parse_classes(i, &mut domain)?
            },
            Some(Token::Action) | Some(Token::DurativeAction) | Some(Token::Event) | Some(Token::Process) => {
                let (next, op) = parse_operator(i, domain.requirements())?;
                let mut found = Vec::new();
                match op {
                    Operator::Action(a) => {
                        a.precondition().collect_preferences(&mut found);
                        domain.actions_mut().add(a)?;
                    },
                    Operator::Durative(a) => {
                        a.condition().collect_preferences(&mut found);
                        domain.durative_actions_mut().add(a)?;
                    },
                    Operator::Event(a) => {
                        a.precondition().collect_preferences(&mut found);
                        domain.events_mut().add(a)?;
                    },
                    Operator::Process(a) => {
                        a.precondition().collect_preferences(&mut found);
                        domain.processes_mut().add(a)?;
                    },
                }
                for pref in found {
                    domain.push_preference(pref);
                }
                next
            },
            _ => return Err(ParserError::expected("a domain section", &i)),
        };
    }
    i = expect(i, Token::CloseParen)?;
    debug_assert!(i.is_empty(), "trailing tokens after a well-formed domain are a caller bug, not a parse error");

    for reserved in domain.requirements().reserved_functions() {
        domain.types_mut().ensure_number();
        domain
            .functions_mut()
            .add_or_replace(Function::new(reserved, SymbolList::new(), "number"));
    }

    Ok(domain)
}

fn parse_constants<'a>(i: TokenStream<'a>, domain: &mut Domain) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Constants)?;
    let reqs = domain.requirements().clone();
    let (mut i, groups) = parse_typed_list(i, expect_id, &reqs)?;
    for group in groups {
        let type_name = group.types.first().cloned().unwrap_or_else(|| "object".to_string());
        domain.types_mut().declare_default_object(&type_name);
        for name in &group.names {
            domain.constants_mut().add(crate::domain::Object::new(name, &type_name))?;
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

fn parse_predicate_signature<'a>(
    i: TokenStream<'a>,
    requirements: &crate::domain::Requirements,
) -> Result<(TokenStream<'a>, Predicate), ParserError> {
    let i = expect(i, Token::OpenParen)?;
    let (i, name) = expect_id(i)?;
    let (i, groups) = parse_typed_list(i, expect_var, requirements)?;
    let i = expect(i, Token::CloseParen)?;
    Ok((i, Predicate::new(&name, groups_to_parameters(groups))))
}

fn parse_predicates<'a>(i: TokenStream<'a>, domain: &mut Domain) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Predicates)?;
    let reqs = domain.requirements().clone();
    while !at(&i, &Token::CloseParen) {
        let (next, pred) = parse_predicate_signature(i, &reqs)?;
        domain.predicates_mut().add(pred)?;
        i = next;
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

fn parse_function_head<'a>(
    i: TokenStream<'a>,
    requirements: &crate::domain::Requirements,
) -> Result<(TokenStream<'a>, (String, SymbolList<Parameter>)), ParserError> {
    let i = expect(i, Token::OpenParen)?;
    let (i, name) = expect_id(i)?;
    let (i, groups) = parse_typed_list(i, expect_var, requirements)?;
    let i = expect(i, Token::CloseParen)?;
    Ok((i, (name, groups_to_parameters(groups))))
}

fn parse_functions<'a>(i: TokenStream<'a>, domain: &mut Domain) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Functions)?;
    let reqs = domain.requirements().clone();
    while !at(&i, &Token::CloseParen) {
        let (next, (name, params)) = parse_function_head(i, &reqs)?;
        let (next, value_type) = if at(&next, &Token::Dash) {
            let next = expect(next, Token::Dash)?;
            expect_id(next)?
        } else {
            (next, "number".to_string())
        };
        domain.types_mut().declare_default_object(&value_type);
        domain.functions_mut().add(Function::new(&name, params, &value_type))?;
        i = next;
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

fn parse_derived<'a>(i: TokenStream<'a>, domain: &mut Domain) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Derived)?;
    let reqs = domain.requirements().clone();
    let (i, head) = parse_predicate_signature(i, &reqs)?;
    let mut scope = Scope::new();
    let offset = i.offset();
    for p in head.parameters().iter() {
        use crate::ident::Named;
        scope.bind(p.name(), p.type_name(), offset)?;
    }
    let (i, body) = parse_formula(i, &mut scope, domain.requirements())?;
    let i = expect(i, Token::CloseParen)?;
    domain.derived_predicates_mut().add(DerivedPredicate::new(head, body))?;
    Ok(i)
}

fn parse_classes<'a>(i: TokenStream<'a>, domain: &mut Domain) -> Result<TokenStream<'a>, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Classes)?;
    while !at(&i, &Token::CloseParen) {
        let (next, cls) = parse_class_def(i)?;
        domain.classes_mut().add(cls)?;
        i = next;
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

/// `(<class-name> <member-function-name>*)` — a class is just an
/// identifier plus the function names it groups (spec: "Identifier + a
/// name-keyed set of member functions").
fn parse_class_def(i: TokenStream) -> Result<(TokenStream, Class), ParserError> {
    let i = expect(i, Token::OpenParen)?;
    let (mut i, name) = expect_id(i)?;
    let mut members = Vec::new();
    while !at(&i, &Token::CloseParen) {
        let (next, member) = expect_id(i)?;
        members.push(member);
        i = next;
    }
    i = expect(i, Token::CloseParen)?;
    Ok((i, Class::new(&name, members)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_domain() {
        let src = "(define (domain d) (:requirements :strips) (:predicates (p)) (:action a :parameters () :precondition (p) :effect (not (p))))";
        let d = parse_domain(src).unwrap();
        assert_eq!(crate::ident::Named::name(&d), "d");
        assert_eq!(d.actions().len(), 1);
        assert_eq!(d.predicates().len(), 1);
    }

    #[test]
    fn typed_section_without_requirement_fails() {
        let src = "(define (domain d) (:types loc))";
        let err = parse_domain(src).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn functions_accepts_numeric_fluents_without_the_broader_fluents_flag() {
        let src = "(define (domain d) (:requirements :numeric-fluents) (:functions (f) - number))";
        let d = parse_domain(src).unwrap();
        assert!(d.functions().contains("f"));
    }

    #[test]
    fn functions_without_any_fluents_requirement_fails() {
        let src = "(define (domain d) (:functions (f) - number))";
        let err = parse_domain(src).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }

    #[test]
    fn action_costs_seeds_total_cost_function() {
        let src = "(define (domain d) (:requirements :action-costs))";
        let d = parse_domain(src).unwrap();
        assert!(d.functions().contains("total-cost"));
    }

    #[test]
    fn classes_group_their_member_function_names() {
        let src = "(define (domain d) (:requirements :modules) (:classes (vehicle battery-level fuel-level) (robot battery-level)))";
        let d = parse_domain(src).unwrap();
        assert_eq!(d.classes().len(), 2);
        let vehicle = d.classes().get("vehicle").unwrap();
        assert!(vehicle.has_member("battery-level"));
        assert!(vehicle.has_member("fuel-level"));
        let robot = d.classes().get("robot").unwrap();
        assert!(robot.has_member("battery-level"));
        assert!(!robot.has_member("fuel-level"));
    }

    #[test]
    fn named_preference_in_a_precondition_registers_on_the_domain() {
        let src = "(define (domain d)\n  (:requirements :strips :preferences :negative-preconditions)\n  (:predicates (p))\n  (:action a :parameters ()\n    :precondition (preference no-p (not (p)))\n    :effect ()))";
        let d = parse_domain(src).unwrap();
        assert_eq!(d.preferences().len(), 1);
        assert_eq!(d.preferences()[0].name(), Some("no-p"));

        let printed = d.to_string();
        assert_eq!(printed.matches("preference no-p").count(), 1);
        let reparsed = parse_domain(&printed).unwrap();
        assert_eq!(reparsed.preferences().len(), 1);
    }

    #[test]
    fn classes_without_modules_requirement_fails() {
        let src = "(define (domain d) (:classes (vehicle battery-level)))";
        let err = parse_domain(src).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
    }
}
