//! Types and the typing graph (spec C3).

use std::collections::HashSet;

use crate::containers::SymbolTable;
use crate::error::ParserError;
use crate::ident::{normalize, Named};

pub const OBJECT: &str = "object";
pub const NUMBER: &str = "number";

/// A named node in the (acyclic) type DAG: a list of zero or more
/// direct supertypes. `object` and `number` are the two built-in
/// roots and always have an empty supertype list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    name: String,
    supertypes: Vec<String>,
}

impl Type {
    pub fn root(name: &str) -> Self {
        Self { name: normalize(name), supertypes: Vec::new() }
    }

    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }
}

impl Named for Type {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The type DAG for one domain. `object` always exists; `number` is
/// seeded lazily (spec §4.1: "`number` is seeded when any function is
/// declared or numeric/fluent requirements are set").
#[derive(Debug, Clone)]
pub struct TypingGraph {
    table: SymbolTable<Type>,
}

impl Default for TypingGraph {
    fn default() -> Self {
        let mut table = SymbolTable::new();
        table.add(Type::root(OBJECT)).expect("fresh table");
        Self { table }
    }
}

impl TypingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_number(&mut self) {
        if !self.table.contains(NUMBER) {
            self.table.add(Type::root(NUMBER)).expect("checked absent");
        }
    }

    /// Ensures `name` exists with no declared supertype, without
    /// disturbing an existing declaration. Used when a type is first
    /// seen only as someone else's supertype.
    pub fn declare(&mut self, name: &str) {
        if !self.table.contains(name) {
            self.table.add(Type::root(name)).expect("checked absent");
        }
    }

    /// Ensures `name` exists, defaulting its supertype to `object` if
    /// it has none yet (spec §4.6: "Untyped X at end-of-group remain
    /// untyped (or implicitly typed as object)").
    pub fn declare_default_object(&mut self, name: &str) {
        let key = normalize(name);
        if key == OBJECT || key == NUMBER {
            self.declare(name);
            return;
        }
        self.declare(name);
        let ty = self.table.get_mut(name).expect("just declared");
        if ty.supertypes.is_empty() {
            ty.supertypes.push(OBJECT.to_string());
        }
    }

    /// Records `child - parent`, auto-declaring either side if unseen.
    /// Idempotent: re-declaring the same edge is a no-op (spec §4.1:
    /// "Adding a supertype edge is idempotent").
    pub fn add_supertype(&mut self, child: &str, parent: &str, offset: usize) -> Result<(), ParserError> {
        let child_key = normalize(child);
        let parent_key = normalize(parent);
        if child_key == OBJECT {
            return Err(ParserError::invalid_subtype(format!("`{OBJECT}` cannot have a supertype"), offset));
        }
        self.declare(&child_key);
        self.declare(&parent_key);
        if self.would_cycle(&child_key, &parent_key) {
            return Err(ParserError::invalid_subtype(
                format!("declaring `{child}` a subtype of `{parent}` would introduce a cycle"),
                offset,
            ));
        }
        let ty = self.table.get_mut(&child_key).expect("just declared");
        if !ty.supertypes.iter().any(|p| normalize(p) == parent_key) {
            ty.supertypes.push(parent_key);
        }
        Ok(())
    }

    fn would_cycle(&self, child: &str, parent: &str) -> bool {
        child == parent || self.ancestors(parent).contains(child)
    }

    /// All transitive supertypes of `name`, including itself's direct
    /// chain but not `name` itself.
    pub fn ancestors(&self, name: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut frontier = vec![normalize(name)];
        while let Some(cur) = frontier.pop() {
            if let Ok(ty) = self.table.get(&cur) {
                for parent in ty.supertypes() {
                    let parent = normalize(parent);
                    if seen.insert(parent.clone()) {
                        frontier.push(parent);
                    }
                }
            }
        }
        seen
    }

    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        normalize(sub) == normalize(sup) || self.ancestors(sub).contains(&normalize(sup))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    pub fn get(&self, name: &str) -> Result<&Type, ParserError> {
        self.table.get(name)
    }

    /// User-declared types only (excludes the `object`/`number` roots).
    pub fn iter_user(&self) -> impl Iterator<Item = &Type> {
        self.table.iter().filter(|t| t.name() != OBJECT && t.name() != NUMBER)
    }

    /// Groups types by depth, supertypes before subtypes, for the
    /// printer (spec §4.1: "compute depth by iterated frontier
    /// propagation starting from leaves"). `object`/`number` are
    /// included (callers filter them out when printing).
    pub fn depth_groups(&self) -> Vec<Vec<String>> {
        let mut frontier: HashSet<String> = self.table.iter().map(|t| t.name().to_string()).collect();
        let mut pushes: Vec<Vec<String>> = Vec::new();
        while !frontier.is_empty() {
            let mut new_frontier: HashSet<String> = HashSet::new();
            for name in &frontier {
                if let Ok(ty) = self.table.get(name) {
                    for parent in ty.supertypes() {
                        new_frontier.insert(normalize(parent));
                    }
                }
            }
            let level: Vec<String> = frontier.iter().filter(|t| !new_frontier.contains(*t)).cloned().collect();
            pushes.push(level);
            frontier = new_frontier;
        }
        pushes.reverse();
        pushes
    }
}
