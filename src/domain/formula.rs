//! Logical formulas: preconditions, goals, derived predicate bodies,
//! and durative action conditions (spec C7).

use crate::containers::SymbolList;
use crate::ident::Named;

use super::expr::{ComparisonOp, Expression, Number};
use super::symbols::Parameter;
use super::terms::Term;

/// Renders a `SymbolList<Parameter>` the way every `?x - t` binder list
/// is written: space-joined, each entry typed. A parameter whose type
/// is the implicit default `object` prints untyped, so a domain with no
/// `:typing` requirement round-trips without reparsing into one that
/// needs it (`- object` would otherwise force `parse_typed_list` to
/// require `:typing` on reparse).
pub(crate) fn fmt_vars(vars: &SymbolList<Parameter>) -> String {
    vars.iter().map(|p| fmt_typed_name(&format!("?{}", p.name()), p.type_name())).collect::<Vec<_>>().join(" ")
}

/// Renders `name - type`, omitting the suffix when `type` is the
/// implicit default `object`.
pub(crate) fn fmt_typed_name(name: &str, type_name: &str) -> String {
    if type_name == super::typing::OBJECT {
        name.to_string()
    } else {
        format!("{name} - {type_name}")
    }
}

fn fmt_args(name: &str, class: Option<&str>, args: &[Term]) -> String {
    let head = match class {
        Some(c) => format!("{c}.{name}"),
        None => name.to_string(),
    };
    let mut parts = vec![head];
    parts.extend(args.iter().map(ToString::to_string));
    format!("({})", parts.join(" "))
}

/// The moment within a durative action's duration a condition or
/// effect is anchored to (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpecifier {
    Start,
    End,
    /// `(over all ...)`.
    OverAll,
}

impl std::fmt::Display for TimeSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeSpecifier::Start => "at start",
            TimeSpecifier::End => "at end",
            TimeSpecifier::OverAll => "over all",
        };
        write!(f, "{s}")
    }
}

/// A PDDL3 preference/trajectory constraint (spec's `:constraints`
/// grammar). Kept as its own enum rather than folded into `Formula`
/// directly so its always-numeric-first-argument shape doesn't leak
/// into the rest of the formula match arms.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Always(Box<Formula>),
    Sometime(Box<Formula>),
    AtMostOnce(Box<Formula>),
    Within(Number, Box<Formula>),
    HoldAfter(Number, Box<Formula>),
    HoldDuring(Number, Number, Box<Formula>),
    SometimeAfter(Box<Formula>, Box<Formula>),
    SometimeBefore(Box<Formula>, Box<Formula>),
    AlwaysWithin(Number, Box<Formula>, Box<Formula>),
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Always(body) => write!(f, "(always {body})"),
            Constraint::Sometime(body) => write!(f, "(sometime {body})"),
            Constraint::AtMostOnce(body) => write!(f, "(at-most-once {body})"),
            Constraint::Within(n, body) => write!(f, "(within {n} {body})"),
            Constraint::HoldAfter(n, body) => write!(f, "(hold-after {n} {body})"),
            Constraint::HoldDuring(n1, n2, body) => write!(f, "(hold-during {n1} {n2} {body})"),
            Constraint::SometimeAfter(a, b) => write!(f, "(sometime-after {a} {b})"),
            Constraint::SometimeBefore(a, b) => write!(f, "(sometime-before {a} {b})"),
            Constraint::AlwaysWithin(n, a, b) => write!(f, "(always-within {n} {a} {b})"),
        }
    }
}

/// A formula node. Owned, recursively boxed (spec's Open Question
/// decision: an owned-enum AST over an arena, matching how the
/// teacher's own recursive types are shaped).
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// `(pred arg...)`, optionally class-qualified (`(class.pred ?x)`).
    Predicate { name: String, class: Option<String>, args: Vec<Term> },
    /// `(= t1 t2 ...)` between two or more terms (object/variable
    /// equality, not to be confused with `Comparison`'s numeric `=`;
    /// spec: a term-equality list has length at least 2).
    TermEquals(Vec<Term>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Imply(Box<Formula>, Box<Formula>),
    Forall { vars: SymbolList<Parameter>, body: Box<Formula> },
    Exists { vars: SymbolList<Parameter>, body: Box<Formula> },
    /// A numeric comparison, e.g. `(>= (battery-level ?r) 10)`.
    Comparison { op: ComparisonOp, lhs: Expression, rhs: Expression },
    /// A durative action condition anchored to a point or interval of
    /// its duration.
    Timed { when: TimeSpecifier, body: Box<Formula> },
    /// A named (or anonymous) soft goal (spec's `:preferences`
    /// requirement).
    Preference { name: Option<String>, body: Box<Formula> },
    /// A PDDL3 trajectory constraint (spec's `:constraints` requirement).
    Constraint(Constraint),
    /// The empty conjunction; parses from `()` and an absent optional
    /// precondition/goal.
    True,
}

impl Formula {
    pub fn and(parts: Vec<Formula>) -> Self {
        match parts.len() {
            1 => parts.into_iter().next().expect("len checked"),
            _ => Formula::And(parts),
        }
    }

    pub fn or(parts: Vec<Formula>) -> Self {
        match parts.len() {
            1 => parts.into_iter().next().expect("len checked"),
            _ => Formula::Or(parts),
        }
    }

    pub fn not(inner: Formula) -> Self {
        Formula::Not(Box::new(inner))
    }

    /// Walks this formula and every nested one, recording every
    /// `preference` node found (spec: Domain keeps its own
    /// name-keyed preferences collection, populated by scanning
    /// wherever a `(preference ...)` form turns up in a precondition,
    /// condition, or `:constraints` body).
    pub fn collect_preferences(&self, out: &mut Vec<super::classes::Preference>) {
        match self {
            Formula::Preference { name, body } => {
                body.collect_preferences(out);
                out.push(super::classes::Preference::new(name.clone(), (**body).clone()));
            },
            Formula::Not(body) | Formula::Timed { body, .. } => body.collect_preferences(out),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.collect_preferences(out);
                }
            },
            Formula::Imply(a, b) => {
                a.collect_preferences(out);
                b.collect_preferences(out);
            },
            Formula::Forall { body, .. } | Formula::Exists { body, .. } => body.collect_preferences(out),
            Formula::Constraint(c) => c.collect_preferences(out),
            Formula::Predicate { .. } | Formula::TermEquals(..) | Formula::Comparison { .. } | Formula::True => {},
        }
    }
}

impl Constraint {
    fn collect_preferences(&self, out: &mut Vec<super::classes::Preference>) {
        match self {
            Constraint::Always(b) | Constraint::Sometime(b) | Constraint::AtMostOnce(b) => b.collect_preferences(out),
            Constraint::Within(_, b) | Constraint::HoldAfter(_, b) => b.collect_preferences(out),
            Constraint::HoldDuring(_, _, b) => b.collect_preferences(out),
            Constraint::SometimeAfter(a, b) | Constraint::SometimeBefore(a, b) => {
                a.collect_preferences(out);
                b.collect_preferences(out);
            },
            Constraint::AlwaysWithin(_, a, b) => {
                a.collect_preferences(out);
                b.collect_preferences(out);
            },
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Predicate { name, class, args } => write!(f, "{}", fmt_args(name, class.as_deref(), args)),
            Formula::TermEquals(terms) => {
                write!(f, "(=")?;
                for t in terms {
                    write!(f, " {t}")?;
                }
                write!(f, ")")
            },
            Formula::Not(inner) => write!(f, "(not {inner})"),
            Formula::And(items) => {
                write!(f, "(and")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            },
            Formula::Or(items) => {
                write!(f, "(or")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            },
            Formula::Imply(a, b) => write!(f, "(imply {a} {b})"),
            Formula::Forall { vars, body } => write!(f, "(forall ({}) {body})", fmt_vars(vars)),
            Formula::Exists { vars, body } => write!(f, "(exists ({}) {body})", fmt_vars(vars)),
            Formula::Comparison { op, lhs, rhs } => write!(f, "({op} {lhs} {rhs})"),
            Formula::Timed { when, body } => write!(f, "({when} {body})"),
            Formula::Preference { name, body } => match name {
                Some(n) => write!(f, "(preference {n} {body})"),
                None => write!(f, "(preference {body})"),
            },
            Formula::Constraint(c) => write!(f, "{c}"),
            Formula::True => write!(f, "()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_of_one_collapses_to_its_operand() {
        let f = Formula::and(vec![Formula::True]);
        assert_eq!(f, Formula::True);
    }

    #[test]
    fn and_of_many_keeps_the_list() {
        let f = Formula::and(vec![Formula::True, Formula::True]);
        assert!(matches!(f, Formula::And(items) if items.len() == 2));
    }
}
