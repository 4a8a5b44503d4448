//! Operators: actions, durative actions, events, and processes (spec C9).

use crate::containers::SymbolList;
use crate::ident::{normalize, Named};

use super::effect::Effect;
use super::formula::Formula;
use super::symbols::Parameter;

/// An instantaneous `:action`.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    parameters: SymbolList<Parameter>,
    precondition: Formula,
    effect: Effect,
}

impl Action {
    pub fn new(name: &str, parameters: SymbolList<Parameter>, precondition: Formula, effect: Effect) -> Self {
        Self { name: normalize(name), parameters, precondition, effect }
    }

    pub fn parameters(&self) -> &SymbolList<Parameter> {
        &self.parameters
    }

    pub fn precondition(&self) -> &Formula {
        &self.precondition
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

impl Named for Action {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A `:durative-action`, whose duration is itself a formula (typically
/// a `Comparison` against `DurationPlaceholder`) and whose condition
/// and effect are anchored with `at start`/`at end`/`over all`.
#[derive(Debug, Clone, PartialEq)]
pub struct DurativeAction {
    name: String,
    parameters: SymbolList<Parameter>,
    duration: Formula,
    condition: Formula,
    effect: Effect,
}

impl DurativeAction {
    pub fn new(
        name: &str,
        parameters: SymbolList<Parameter>,
        duration: Formula,
        condition: Formula,
        effect: Effect,
    ) -> Self {
        Self { name: normalize(name), parameters, duration, condition, effect }
    }

    pub fn parameters(&self) -> &SymbolList<Parameter> {
        &self.parameters
    }

    pub fn duration(&self) -> &Formula {
        &self.duration
    }

    pub fn condition(&self) -> &Formula {
        &self.condition
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

impl Named for DurativeAction {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A PDDL+ `:event`: fires instantaneously the instant its precondition
/// becomes true, unlike an `:action` which fires only by deliberate
/// choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    parameters: SymbolList<Parameter>,
    precondition: Formula,
    effect: Effect,
}

impl Event {
    pub fn new(name: &str, parameters: SymbolList<Parameter>, precondition: Formula, effect: Effect) -> Self {
        Self { name: normalize(name), parameters, precondition, effect }
    }

    pub fn parameters(&self) -> &SymbolList<Parameter> {
        &self.parameters
    }

    pub fn precondition(&self) -> &Formula {
        &self.precondition
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

impl Named for Event {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A PDDL+ `:process`: applies its effect continuously while its
/// precondition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    name: String,
    parameters: SymbolList<Parameter>,
    precondition: Formula,
    effect: Effect,
}

impl Process {
    pub fn new(name: &str, parameters: SymbolList<Parameter>, precondition: Formula, effect: Effect) -> Self {
        Self { name: normalize(name), parameters, precondition, effect }
    }

    pub fn parameters(&self) -> &SymbolList<Parameter> {
        &self.parameters
    }

    pub fn precondition(&self) -> &Formula {
        &self.precondition
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

impl Named for Process {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The four operator flavors a domain's body can declare, unified so
/// callers iterating "every operator" don't need four separate loops.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Action(Action),
    Durative(DurativeAction),
    Event(Event),
    Process(Process),
}

impl Operator {
    pub fn name(&self) -> &str {
        match self {
            Operator::Action(a) => a.name(),
            Operator::Durative(d) => d.name(),
            Operator::Event(e) => e.name(),
            Operator::Process(p) => p.name(),
        }
    }
}
