//! End-to-end coverage of the driver and grammar against literal PDDL+
//! fragments.

use std::io::Write;
use std::path::PathBuf;

use pddl_parser::domain::{ComparisonOp, Expression, Formula, Requirement};
use pddl_parser::error::ErrorKind;
use pddl_parser::ident::Named;
use pddl_parser::parser::domain::parse_domain;
use pddl_parser::parser::problem::parse_problem;

fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

// Property 1: round-trip structural equivalence.
#[test]
fn round_trip_reparses_to_a_structurally_equal_domain() {
    init_logging();
    let src = "(define (domain d) (:requirements :strips :typing) (:types loc - object) (:predicates (at ?x - loc)) (:action move :parameters (?a ?b - loc) :precondition (at ?a) :effect (and (not (at ?a)) (at ?b))))";
    let first = parse_domain(src).unwrap();
    let printed = first.to_string();
    let second = parse_domain(&printed).unwrap();
    assert_eq!(first.actions().len(), second.actions().len());
    assert_eq!(first.predicates().len(), second.predicates().len());
    let a1 = first.actions().get("move").unwrap();
    let a2 = second.actions().get("move").unwrap();
    assert_eq!(a1.precondition(), a2.precondition());
    assert_eq!(a1.effect(), a2.effect());
}

// Property 1: an untyped domain round-trips without acquiring a
// spurious `:typing` requirement on reparse.
#[test]
fn untyped_domain_round_trips_without_requiring_typing() {
    init_logging();
    let src = "(define (domain d) (:predicates (p ?x)))";
    let first = parse_domain(src).unwrap();
    let printed = first.to_string();
    assert!(!printed.contains(" - object"), "printed domain should not leak the implicit object type: {printed}");
    let second = parse_domain(&printed).unwrap();
    assert_eq!(first.predicates().len(), second.predicates().len());
}

// Property 2: name normalization.
#[test]
fn declared_names_resolve_case_insensitively() {
    let src = "(define (domain D) (:predicates (At)))";
    let d = parse_domain(src).unwrap();
    assert!(d.predicates().get("at").is_ok());
    assert!(d.predicates().get("AT").is_ok());
    assert!(d.predicates().get("At").is_ok());
}

// Property 3: requirement gating, spot-checked against the table's
// disjunctive-preconditions and typing rows.
#[test]
fn requirement_gating_round_trips_with_and_without_the_flag() {
    let without = "(define (domain d) (:requirements :strips) (:predicates (p)) (:action a :parameters () :precondition (or (p) (p)) :effect ()))";
    let err = parse_domain(without).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingRequirement);

    let with = "(define (domain d) (:requirements :strips :disjunctive-preconditions) (:predicates (p)) (:action a :parameters () :precondition (or (p) (p)) :effect ()))";
    parse_domain(with).unwrap();
}

// Property 4: scoped variable resolution.
#[test]
fn quantifier_variable_is_unresolvable_outside_its_scope() {
    use pddl_parser::parser::{formula::parse_formula, Scope};
    use pddl_parser::lexer::TokenStream;

    let mut reqs = pddl_parser::domain::Requirements::new();
    reqs.insert(Requirement::UniversalPreconditions);
    reqs.insert(Requirement::Typing);
    let mut scope = Scope::new();
    let (rest, f) = parse_formula(TokenStream::new("(forall (?x - t) (p ?x))"), &mut scope, &reqs).unwrap();
    assert!(matches!(f, Formula::Forall { .. }));
    assert!(rest.is_empty());
    assert!(scope.resolve("x", 0).is_err());
}

// Property 5: duplicate detection.
#[test]
fn duplicate_predicate_names_fail_but_predicate_function_overlap_is_fine() {
    let dup = "(define (domain d) (:predicates (p) (p)))";
    let err = parse_domain(dup).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateSymbol);

    let shared = "(define (domain d) (:requirements :fluents) (:predicates (p)) (:functions (p) - number))";
    parse_domain(shared).unwrap();
}

// Property 6 / S6: typing graph.
#[test]
fn typing_graph_tracks_supertypes_and_rejects_self_parenting() {
    let src = "(define (domain d) (:requirements :typing) (:types a b - object c - a))";
    let d = parse_domain(src).unwrap();
    assert!(d.types().is_subtype("a", "object"));
    assert!(d.types().is_subtype("b", "object"));
    assert!(d.types().is_subtype("c", "a"));
    assert!(d.types().is_subtype("c", "object"));

    let cyclic = "(define (domain d) (:requirements :typing) (:types a - a))";
    let err = parse_domain(cyclic).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSubtype);
}

// Property 7 / S2 / S5: init restriction.
#[test]
fn init_rejects_disjunction_and_gates_timed_literals() {
    let domain = empty_domain_rc("d");

    let or_in_init = "(define (problem p) (:domain d) (:init (or (p) (q))))";
    let err = parse_problem(or_in_init, std::rc::Rc::clone(&domain)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadInitialState);

    let timed_without_req = "(define (problem p) (:domain d) (:init (at 5 (p))))";
    let err = parse_problem(timed_without_req, std::rc::Rc::clone(&domain)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingRequirement);
}

fn empty_domain_rc(name: &str) -> std::rc::Rc<pddl_parser::domain::Domain> {
    std::rc::Rc::new(pddl_parser::domain::Domain::new(
        name,
        pddl_parser::domain::Requirements::new(),
        pddl_parser::domain::TypingGraph::new(),
    ))
}

// Property 8 / forward reference: a problem file listed before its
// domain file still resolves.
#[test]
fn driver_resolves_a_problem_listed_before_its_domain() {
    init_logging();
    let domain_src = "(define (domain letseat) (:requirements :strips) (:predicates (hungry)))";
    let problem_src = "(define (problem breakfast) (:domain letseat) (:init (hungry)) (:goal (hungry)))";
    let problem_path = write_temp("integration_problem_first.pddl", problem_src);
    let domain_path = write_temp("integration_domain_second.pddl", domain_src);

    let model = pddl_parser::parse(&[problem_path, domain_path], false).unwrap();
    let problem = model.problems().get("breakfast").unwrap();
    assert_eq!(problem.domain().name(), "letseat");
}

// S1: a minimal typed domain with one action.
#[test]
fn s1_minimal_typed_domain_with_one_move_action() {
    let src = "(define (domain d)\n  (:requirements :strips :typing)\n  (:types loc - object)\n  (:predicates (at ?x - loc))\n  (:action move :parameters (?a ?b - loc)\n    :precondition (at ?a)\n    :effect (and (not (at ?a)) (at ?b))))";
    let d = parse_domain(src).unwrap();
    assert_eq!(d.name(), "d");
    assert!(d.types().is_subtype("loc", "object"));
    let at = d.predicates().get("at").unwrap();
    assert_eq!(at.arity(), 1);
    assert_eq!(at.parameters().at(0).unwrap().type_name(), "loc");
    let move_action = d.actions().get("move").unwrap();
    assert_eq!(move_action.parameters().len(), 2);
    for p in move_action.parameters().iter() {
        assert_eq!(p.type_name(), "loc");
    }
    match move_action.precondition() {
        Formula::Predicate { name, args, .. } => {
            assert_eq!(name, "at");
            assert_eq!(args.len(), 1);
        },
        other => panic!("unexpected precondition shape: {other:?}"),
    }
}

// S2: negated precondition without negative-preconditions fails.
#[test]
fn s2_negated_precondition_needs_negative_preconditions() {
    let src = "(define (domain d) (:requirements :strips :typing) (:predicates (clear ?x - object)) (:action a :parameters (?x - object) :precondition (not (clear ?x)) :effect ()))";
    let err = parse_domain(src).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingRequirement);
}

// S3: equality disambiguation between term-equality and numeric
// fluent comparison.
#[test]
fn s3_equality_disambiguates_term_equality_from_fluent_comparison() {
    use pddl_parser::parser::{formula::parse_formula, Scope};
    use pddl_parser::lexer::TokenStream;

    let mut reqs = pddl_parser::domain::Requirements::new();
    reqs.insert(Requirement::Equality);
    let mut scope = Scope::new();
    scope.bind("x", "object", 0).unwrap();
    scope.bind("y", "object", 0).unwrap();
    let (_, f) = parse_formula(TokenStream::new("(= ?x ?y)"), &mut scope, &reqs).unwrap();
    assert!(matches!(f, Formula::TermEquals(..)));

    let mut reqs = pddl_parser::domain::Requirements::new();
    reqs.insert(Requirement::NumericFluents);
    let (_, f) = parse_formula(TokenStream::new("(= (f) (g))"), &mut Scope::new(), &reqs).unwrap();
    match f {
        Formula::Comparison { op: ComparisonOp::Eq, lhs, rhs } => {
            assert!(matches!(lhs, Expression::FunctionApplication { .. }));
            assert!(matches!(rhs, Expression::FunctionApplication { .. }));
        },
        other => panic!("unexpected formula shape: {other:?}"),
    }
}

// S4: durative action needing both durative-actions and action-costs.
#[test]
fn s4_durative_action_with_action_costs_effect() {
    let src = "(define (domain d)\n  (:requirements :durative-actions :action-costs)\n  (:durative-action a :parameters ()\n    :duration (= ?duration 5)\n    :condition (at start (p))\n    :effect (at end (increase (total-cost) 1))))";
    let d = parse_domain(src).unwrap();
    let a = d.durative_actions().get("a").unwrap();
    match a.duration() {
        Formula::Comparison { op: ComparisonOp::Eq, lhs, rhs } => {
            assert!(matches!(lhs, Expression::DurationPlaceholder));
            assert_eq!(*rhs, Expression::NumberLiteral(pddl_parser::domain::Number::Int(5)));
        },
        other => panic!("unexpected duration shape: {other:?}"),
    }
    assert!(d.functions().contains("total-cost"));
}

// S5: a run of timed/typed/negative/numeric init literals in order.
#[test]
fn s5_init_parses_four_literals_in_declaration_order() {
    let domain_src = "(define (domain d)\n  (:requirements :strips :typing :negative-preconditions :numeric-fluents :timed-initial-literals)\n  (:predicates (p ?x - object) (q ?x - object) (r ?x - object))\n  (:functions (f ?x - object) - number))";
    let domain = std::rc::Rc::new(parse_domain(domain_src).unwrap());
    let problem_src = "(define (problem p) (:domain d) (:objects a - object) (:init (p a) (not (q a)) (= (f a) 3) (at 2.5 (r a))))";
    let problem = parse_problem(problem_src, domain).unwrap();
    match problem.init() {
        pddl_parser::domain::Effect::And(items) => {
            assert_eq!(items.len(), 4);
            assert!(matches!(items[0], pddl_parser::domain::Effect::Predicate { .. }));
            assert!(matches!(items[1], pddl_parser::domain::Effect::Not(_)));
            assert!(matches!(items[2], pddl_parser::domain::Effect::Assign { .. }));
            assert!(matches!(items[3], pddl_parser::domain::Effect::At { .. }));
        },
        other => panic!("unexpected init shape: {other:?}"),
    }
}
