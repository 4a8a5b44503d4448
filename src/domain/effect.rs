//! Effects: operator bodies and the initial state (spec C8).

use crate::containers::SymbolList;

use super::expr::Expression;
use super::formula::{fmt_vars, Formula, TimeSpecifier};
use super::symbols::Parameter;
use super::terms::Term;

fn fmt_literal(name: &str, class: Option<&str>, args: &[Term]) -> String {
    let head = match class {
        Some(c) => format!("{c}.{name}"),
        None => name.to_string(),
    };
    let mut parts = vec![head];
    parts.extend(args.iter().map(ToString::to_string));
    format!("({})", parts.join(" "))
}

/// How a numeric fluent effect combines with its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Increase,
    Decrease,
    ScaleUp,
    ScaleDown,
}

impl std::fmt::Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssignOp::Assign => "assign",
            AssignOp::Increase => "increase",
            AssignOp::Decrease => "decrease",
            AssignOp::ScaleUp => "scale-up",
            AssignOp::ScaleDown => "scale-down",
        };
        write!(f, "{s}")
    }
}

/// An effect node, used both for operator bodies and for a problem's
/// `:init` block (spec C8 treats the initial state as an `Effect` tree
/// restricted to a subset of these variants; see `Effect::is_init_legal`).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A positive literal: adds `(pred arg...)`.
    Predicate { name: String, class: Option<String>, args: Vec<Term> },
    /// A negative literal: deletes the wrapped positive literal.
    Not(Box<Effect>),
    And(Vec<Effect>),
    /// A nondeterministic choice among alternative effects. Parses
    /// unconditionally, the same as `and` — nothing gates it.
    Oneof(Vec<Effect>),
    Forall { vars: SymbolList<Parameter>, body: Box<Effect> },
    When { condition: Formula, effect: Box<Effect> },
    Assign { op: AssignOp, fhead: Expression, value: Expression },
    /// A durative action effect anchored to `at start`/`at end`.
    Timed { when: TimeSpecifier, body: Box<Effect> },
    /// `(at <number> <literal>)` in `:init`, naming a timed initial
    /// literal (spec's timed-initial-literals supplement).
    At { time: f64, literal: Box<Effect> },
    True,
}

impl Effect {
    pub fn and(parts: Vec<Effect>) -> Self {
        match parts.len() {
            1 => parts.into_iter().next().expect("len checked"),
            _ => Effect::And(parts),
        }
    }

    /// Whether this node is one of the restricted shapes spec §4.5
    /// allows inside `:init`: positive/negative literals, numeric
    /// `assign`, timed literals, and conjunctions of the above — no
    /// `forall`, `when`, `oneof`, or non-`assign` fluent update.
    pub fn is_init_legal(&self) -> bool {
        match self {
            Effect::Predicate { .. } | Effect::True => true,
            Effect::Not(inner) => matches!(inner.as_ref(), Effect::Predicate { .. }),
            Effect::And(items) => items.iter().all(Effect::is_init_legal),
            Effect::Assign { op, .. } => *op == AssignOp::Assign,
            Effect::At { literal, .. } => literal.is_init_legal(),
            Effect::Oneof(_) | Effect::Forall { .. } | Effect::When { .. } | Effect::Timed { .. } => false,
        }
    }
}

/// Flattens a top-level conjunction into its conjuncts for `:init`'s
/// special-cased printer (spec: "`:init` printed as flat list"); a
/// non-conjunction effect renders as a single-element list, and the
/// empty conjunction renders as no elements at all.
pub(crate) fn init_conjuncts(effect: &Effect) -> Vec<&Effect> {
    match effect {
        Effect::And(items) => items.iter().collect(),
        Effect::True => Vec::new(),
        other => vec![other],
    }
}

/// Renders one `:init` literal, special-casing a plain `assign` as
/// `(= fhead value)` rather than the generic assign-effect form (spec:
/// "`(= fhead value)` emitted for assignment effects", not `(assign
/// fhead value)`).
pub(crate) fn fmt_init_literal(effect: &Effect, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match effect {
        Effect::Assign { op: AssignOp::Assign, fhead, value } => write!(f, "(= {fhead} {value})"),
        other => write!(f, "{other}"),
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Predicate { name, class, args } => write!(f, "{}", fmt_literal(name, class.as_deref(), args)),
            Effect::Not(inner) => write!(f, "(not {inner})"),
            Effect::And(items) => {
                write!(f, "(and")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            },
            Effect::Oneof(items) => {
                write!(f, "(oneof")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            },
            Effect::Forall { vars, body } => write!(f, "(forall ({}) {body})", fmt_vars(vars)),
            Effect::When { condition, effect } => write!(f, "(when {condition} {effect})"),
            Effect::Assign { op, fhead, value } => write!(f, "({op} {fhead} {value})"),
            Effect::Timed { when, body } => write!(f, "({when} {body})"),
            Effect::At { time, literal } => write!(f, "(at {time} {literal})"),
            Effect::True => write!(f, "()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_predicate_is_init_legal() {
        let e = Effect::Not(Box::new(Effect::Predicate { name: "p".into(), class: None, args: vec![] }));
        assert!(e.is_init_legal());
    }

    #[test]
    fn forall_effect_is_not_init_legal() {
        let e = Effect::Forall { vars: SymbolList::new(), body: Box::new(Effect::True) };
        assert!(!e.is_init_legal());
    }

    #[test]
    fn increase_assign_is_not_init_legal() {
        let e = Effect::Assign {
            op: AssignOp::Increase,
            fhead: Expression::TermRef(Term::object("x")),
            value: Expression::NumberLiteral(super::super::expr::Number::Int(1)),
        };
        assert!(!e.is_init_legal());
    }
}
