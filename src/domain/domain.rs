//! The domain root and its pretty-printer (spec C11).

use std::fmt;

use crate::containers::SymbolTable;
use crate::ident::{normalize, Named};

use super::classes::{Class, DerivedPredicate, Preference};
use super::formula::Formula;
use super::operator::{Action, DurativeAction, Event, Process};
use super::requirements::Requirements;
use super::symbols::{Function, Predicate};
use super::terms::Object;
use super::typing::{TypingGraph, NUMBER, OBJECT};

/// A fully parsed `(define (domain ...) ...)` form.
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    requirements: Requirements,
    types: TypingGraph,
    constants: SymbolTable<Object>,
    predicates: SymbolTable<Predicate>,
    functions: SymbolTable<Function>,
    classes: SymbolTable<Class>,
    derived_predicates: SymbolTable<DerivedPredicate>,
    actions: SymbolTable<Action>,
    durative_actions: SymbolTable<DurativeAction>,
    events: SymbolTable<Event>,
    processes: SymbolTable<Process>,
    preferences: Vec<Preference>,
    constraints: Option<Formula>,
}

impl Domain {
    pub fn new(name: &str, requirements: Requirements, types: TypingGraph) -> Self {
        Self {
            name: normalize(name),
            requirements,
            types,
            constants: SymbolTable::new(),
            predicates: SymbolTable::new(),
            functions: SymbolTable::new(),
            classes: SymbolTable::new(),
            derived_predicates: SymbolTable::new(),
            actions: SymbolTable::new(),
            durative_actions: SymbolTable::new(),
            events: SymbolTable::new(),
            processes: SymbolTable::new(),
            preferences: Vec::new(),
            constraints: None,
        }
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn requirements_mut(&mut self) -> &mut Requirements {
        &mut self.requirements
    }

    pub fn types(&self) -> &TypingGraph {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypingGraph {
        &mut self.types
    }

    pub fn constants(&self) -> &SymbolTable<Object> {
        &self.constants
    }

    pub fn constants_mut(&mut self) -> &mut SymbolTable<Object> {
        &mut self.constants
    }

    pub fn predicates(&self) -> &SymbolTable<Predicate> {
        &self.predicates
    }

    pub fn predicates_mut(&mut self) -> &mut SymbolTable<Predicate> {
        &mut self.predicates
    }

    pub fn functions(&self) -> &SymbolTable<Function> {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut SymbolTable<Function> {
        &mut self.functions
    }

    pub fn classes(&self) -> &SymbolTable<Class> {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut SymbolTable<Class> {
        &mut self.classes
    }

    pub fn derived_predicates(&self) -> &SymbolTable<DerivedPredicate> {
        &self.derived_predicates
    }

    pub fn derived_predicates_mut(&mut self) -> &mut SymbolTable<DerivedPredicate> {
        &mut self.derived_predicates
    }

    pub fn actions(&self) -> &SymbolTable<Action> {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut SymbolTable<Action> {
        &mut self.actions
    }

    pub fn durative_actions(&self) -> &SymbolTable<DurativeAction> {
        &self.durative_actions
    }

    pub fn durative_actions_mut(&mut self) -> &mut SymbolTable<DurativeAction> {
        &mut self.durative_actions
    }

    pub fn events(&self) -> &SymbolTable<Event> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut SymbolTable<Event> {
        &mut self.events
    }

    pub fn processes(&self) -> &SymbolTable<Process> {
        &self.processes
    }

    pub fn processes_mut(&mut self) -> &mut SymbolTable<Process> {
        &mut self.processes
    }

    pub fn preferences(&self) -> &[Preference] {
        &self.preferences
    }

    pub fn push_preference(&mut self, p: Preference) {
        self.preferences.push(p);
    }

    pub fn constraints(&self) -> Option<&Formula> {
        self.constraints.as_ref()
    }

    pub fn set_constraints(&mut self, c: Formula) {
        self.constraints = Some(c);
    }
}

impl Named for Domain {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(define (domain {})", self.name)?;

        if self.requirements.iter().next().is_some() {
            let mut reqs: Vec<&str> = self.requirements.iter().map(|r| r.keyword()).collect();
            reqs.sort_unstable();
            writeln!(f, "  (:requirements {})", reqs.join(" "))?;
        }

        // Print supertypes before subtypes (depth_groups' order), but
        // one `name - supertype...` line per type: a flat name list
        // would silently drop every non-`object` supertype on reparse.
        let names: Vec<String> =
            self.types.depth_groups().into_iter().flatten().filter(|t| t != OBJECT && t != NUMBER).collect();
        if !names.is_empty() {
            writeln!(f, "  (:types")?;
            for name in &names {
                let ty = self.types.get(name).expect("depth_groups only returns declared types");
                match ty.supertypes() {
                    [] => writeln!(f, "    {name}")?,
                    [single] => writeln!(f, "    {name} - {single}")?,
                    many => writeln!(f, "    {name} - (either {})", many.join(" "))?,
                }
            }
            writeln!(f, "  )")?;
        }

        if !self.constants.is_empty() {
            writeln!(f, "  (:constants")?;
            for c in self.constants.iter() {
                writeln!(f, "    {}", super::formula::fmt_typed_name(c.name(), c.type_name()))?;
            }
            writeln!(f, "  )")?;
        }

        if !self.predicates.is_empty() {
            writeln!(f, "  (:predicates")?;
            for p in self.predicates.iter() {
                write!(f, "    ({}", p.name())?;
                for param in p.parameters().iter() {
                    write!(f, " {}", super::formula::fmt_typed_name(&format!("?{}", param.name()), param.type_name()))?;
                }
                writeln!(f, ")")?;
            }
            writeln!(f, "  )")?;
        }

        if !self.functions.is_empty() {
            writeln!(f, "  (:functions")?;
            for fun in self.functions.iter() {
                write!(f, "    ({}", fun.name())?;
                for param in fun.parameters().iter() {
                    write!(f, " {}", super::formula::fmt_typed_name(&format!("?{}", param.name()), param.type_name()))?;
                }
                writeln!(f, ") - {}", fun.value_type())?;
            }
            writeln!(f, "  )")?;
        }

        if !self.classes.is_empty() {
            writeln!(f, "  (:classes")?;
            for cls in self.classes.iter() {
                writeln!(f, "    ({} {})", cls.name(), cls.members().join(" "))?;
            }
            writeln!(f, "  )")?;
        }

        if let Some(c) = &self.constraints {
            writeln!(f, "  (:constraints {c})")?;
        }

        for dp in self.derived_predicates.iter() {
            let head = dp.head();
            write!(f, "  (:derived ({}", head.name())?;
            for param in head.parameters().iter() {
                write!(f, " {}", super::formula::fmt_typed_name(&format!("?{}", param.name()), param.type_name()))?;
            }
            writeln!(f, ") {})", dp.body())?;
        }

        // Each operator category is emitted exactly once, in
        // declaration order within its own table.
        for action in self.actions.iter() {
            writeln!(
                f,
                "  (:action {}\n    :parameters ({})\n    :precondition {}\n    :effect {}\n  )",
                action.name(),
                super::formula::fmt_vars(action.parameters()),
                action.precondition(),
                action.effect(),
            )?;
        }
        for durative in self.durative_actions.iter() {
            writeln!(
                f,
                "  (:durative-action {}\n    :parameters ({})\n    :duration {}\n    :condition {}\n    :effect {}\n  )",
                durative.name(),
                super::formula::fmt_vars(durative.parameters()),
                durative.duration(),
                durative.condition(),
                durative.effect(),
            )?;
        }
        for event in self.events.iter() {
            writeln!(
                f,
                "  (:event {}\n    :parameters ({})\n    :precondition {}\n    :effect {}\n  )",
                event.name(),
                super::formula::fmt_vars(event.parameters()),
                event.precondition(),
                event.effect(),
            )?;
        }
        for process in self.processes.iter() {
            writeln!(
                f,
                "  (:process {}\n    :parameters ({})\n    :precondition {}\n    :effect {}\n  )",
                process.name(),
                super::formula::fmt_vars(process.parameters()),
                process.precondition(),
                process.effect(),
            )?;
        }

        // `self.preferences` is a lookup registry of every `(preference
        // ...)` node discovered while parsing operators and
        // `:constraints` (spec: preference names are referenceable
        // symbols, e.g. from `is-violated`). Each one is already printed
        // inline by the formula that owns it, so it isn't reprinted here.

        writeln!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_each_action_exactly_once() {
        let mut d = Domain::new("d", Requirements::new(), TypingGraph::new());
        d.actions_mut()
            .add(Action::new(
                "noop",
                crate::containers::SymbolList::new(),
                Formula::True,
                super::super::effect::Effect::True,
            ))
            .unwrap();
        let printed = d.to_string();
        assert_eq!(printed.matches("noop").count(), 1);
    }
}
