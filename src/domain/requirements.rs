//! Requirement flags and their implication closure (spec C12, §4.6).

use std::collections::HashSet;

use crate::error::ParserError;

/// Every requirement flag the grammar can gate on. Kept as a closed
/// enum rather than an interned string set so an unrecognized
/// `:foo` in a `:requirements` block is a lexical error, not a silent
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Fluents,
    NumericFluents,
    ObjectFluents,
    Adl,
    DurativeActions,
    DurationInequalities,
    ContinuousEffects,
    DerivedPredicates,
    TimedInitialLiterals,
    Preferences,
    Constraints,
    ActionCosts,
    Modules,
}

impl Requirement {
    pub fn keyword(&self) -> &'static str {
        match self {
            Requirement::Strips => ":strips",
            Requirement::Typing => ":typing",
            Requirement::NegativePreconditions => ":negative-preconditions",
            Requirement::DisjunctivePreconditions => ":disjunctive-preconditions",
            Requirement::Equality => ":equality",
            Requirement::ExistentialPreconditions => ":existential-preconditions",
            Requirement::UniversalPreconditions => ":universal-preconditions",
            Requirement::QuantifiedPreconditions => ":quantified-preconditions",
            Requirement::ConditionalEffects => ":conditional-effects",
            Requirement::Fluents => ":fluents",
            Requirement::NumericFluents => ":numeric-fluents",
            Requirement::ObjectFluents => ":object-fluents",
            Requirement::Adl => ":adl",
            Requirement::DurativeActions => ":durative-actions",
            Requirement::DurationInequalities => ":duration-inequalities",
            Requirement::ContinuousEffects => ":continuous-effects",
            Requirement::DerivedPredicates => ":derived-predicates",
            Requirement::TimedInitialLiterals => ":timed-initial-literals",
            Requirement::Preferences => ":preferences",
            Requirement::Constraints => ":constraints",
            Requirement::ActionCosts => ":action-costs",
            Requirement::Modules => ":modules",
        }
    }

    /// Requirements a flag pulls in automatically, per the standard
    /// PDDL implication table (spec §4.6: "`:adl` implies `:strips`,
    /// `:typing`, ... `:quantified-preconditions` implies both
    /// `:existential-preconditions` and `:universal-preconditions`").
    fn implies(&self) -> &'static [Requirement] {
        use Requirement::*;
        match self {
            QuantifiedPreconditions => &[ExistentialPreconditions, UniversalPreconditions],
            Adl => &[
                Strips,
                Typing,
                NegativePreconditions,
                DisjunctivePreconditions,
                Equality,
                QuantifiedPreconditions,
                ConditionalEffects,
            ],
            Fluents => &[NumericFluents, ObjectFluents],
            _ => &[],
        }
    }
}

/// A domain or problem's accumulated `:requirements` set, closed under
/// implication. Spec's Open Question decision: `:requirements` itself
/// is optional (an absent block behaves as `(:requirements :strips)`,
/// matching how permissive real-world PDDL files are).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    set: HashSet<Requirement>,
}

impl Default for Requirements {
    fn default() -> Self {
        let mut r = Self { set: HashSet::new() };
        r.insert(Requirement::Strips);
        r
    }
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self { set: HashSet::new() }
    }

    pub fn insert(&mut self, req: Requirement) {
        if self.set.insert(req) {
            for implied in req.implies() {
                self.insert(*implied);
            }
        }
    }

    pub fn contains(&self, req: Requirement) -> bool {
        self.set.contains(&req)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.set.iter()
    }

    /// Fails with `MissingRequirement` naming `construct` when `req`
    /// was never declared (directly or via implication).
    pub fn require(&self, req: Requirement, construct: &str, offset: usize) -> Result<(), ParserError> {
        if self.contains(req) {
            Ok(())
        } else {
            Err(ParserError::missing_requirement(construct, &req.keyword()[1..], offset))
        }
    }

    /// Reserved function names this requirement set auto-declares
    /// (spec §4.5: "`:durative-actions`/`:time`/`:action-costs`
    /// auto-insert the reserved functions `total-time`/`total-cost`").
    pub fn reserved_functions(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Requirement::DurativeActions) {
            names.push("total-time");
        }
        if self.contains(Requirement::ActionCosts) {
            names.push("total-cost");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adl_implies_its_full_closure() {
        let mut r = Requirements::empty();
        r.insert(Requirement::Adl);
        assert!(r.contains(Requirement::Strips));
        assert!(r.contains(Requirement::ExistentialPreconditions));
        assert!(r.contains(Requirement::UniversalPreconditions));
        assert!(r.contains(Requirement::ConditionalEffects));
    }

    #[test]
    fn fluents_implies_numeric_and_object_fluents() {
        let mut r = Requirements::empty();
        r.insert(Requirement::Fluents);
        assert!(r.contains(Requirement::NumericFluents));
        assert!(r.contains(Requirement::ObjectFluents));
    }

    #[test]
    fn missing_requirement_names_the_construct() {
        let r = Requirements::empty();
        let err = r.require(Requirement::Typing, "typed parameter", 0).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::MissingRequirement);
        assert!(err.message.contains("typed parameter"));
    }

    #[test]
    fn default_requirements_carries_implicit_strips() {
        assert!(Requirements::new().contains(Requirement::Strips));
    }

    #[test]
    fn durative_actions_reserves_total_time() {
        let mut r = Requirements::empty();
        r.insert(Requirement::DurativeActions);
        assert_eq!(r.reserved_functions(), vec!["total-time"]);
    }
}
