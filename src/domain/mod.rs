//! The PDDL+ abstract syntax model (spec §3, components C3-C12).
//!
//! Laid out one concept per file, the way the teacher lays out
//! `domain/action.rs`, `domain/predicate.rs`, ... one type per concern
//! rather than one monolithic `ast.rs`.

pub mod classes;
pub mod domain;
pub mod effect;
pub mod expr;
pub mod formula;
pub mod operator;
pub mod requirements;
pub mod symbols;
pub mod terms;
pub mod typing;

pub use classes::{Class, DerivedPredicate, Preference};
pub use domain::Domain;
pub use effect::Effect;
pub use expr::{ArithOp, ComparisonOp, Expression, Number};
pub use formula::{Constraint, Formula, TimeSpecifier};
pub use operator::{Action, DurativeAction, Event, Operator, Process};
pub use requirements::{Requirement, Requirements};
pub use symbols::{Function, Parameter, Predicate};
pub use terms::{Object, Term, Variable};
pub use typing::{Type, TypingGraph};
