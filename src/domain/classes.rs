//! Classes, derived predicates, and named preferences (spec C10).

use crate::ident::{normalize, Named};

use super::formula::Formula;
use super::symbols::Predicate;

/// A class declared for class-qualified function/predicate application
/// (`(class.fn ?x)`), grouping a named set of objects that share
/// functions or predicates scoped to the class rather than the whole
/// domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    name: String,
    members: Vec<String>,
}

impl Class {
    pub fn new(name: &str, members: Vec<String>) -> Self {
        Self { name: normalize(name), members: members.iter().map(|m| normalize(m)).collect() }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == &normalize(name))
    }
}

impl Named for Class {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A `:derived` predicate: a signature plus the formula that defines
/// when it holds, re-evaluated from the rest of the state rather than
/// asserted directly by any effect.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPredicate {
    head: Predicate,
    body: Formula,
}

impl DerivedPredicate {
    pub fn new(head: Predicate, body: Formula) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &Predicate {
        &self.head
    }

    pub fn body(&self) -> &Formula {
        &self.body
    }
}

impl Named for DerivedPredicate {
    fn name(&self) -> &str {
        self.head.name()
    }
}

/// A named (or anonymous) soft goal declared with `:preferences`. The
/// optional name lets a `:metric` refer back to it via
/// `is-violated`-style function application.
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    name: Option<String>,
    body: Formula,
}

impl Preference {
    pub fn new(name: Option<String>, body: Formula) -> Self {
        Self { name: name.map(|n| normalize(&n)), body }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn body(&self) -> &Formula {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_membership_is_case_insensitive() {
        let c = Class::new("vehicles", vec!["Truck1".into()]);
        assert!(c.has_member("truck1"));
        assert!(c.has_member("TRUCK1"));
    }
}
