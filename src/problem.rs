//! The problem root (spec C11).

use std::fmt;
use std::rc::Rc;

use crate::containers::SymbolTable;
use crate::domain::{Domain, Effect, Expression, Formula};
use crate::ident::{normalize, Named};

/// A fully parsed `(define (problem ...) ...)` form. Holds a shared
/// reference to the domain it was resolved against rather than a bare
/// name, since by the time parsing finishes the domain is guaranteed
/// to exist (forward references are resolved by
/// [`crate::driver::parse`] before any problem body is walked).
#[derive(Debug, Clone)]
pub struct Problem {
    name: String,
    domain: Rc<Domain>,
    requirements: crate::domain::Requirements,
    objects: SymbolTable<crate::domain::Object>,
    init: Effect,
    goal: Formula,
    constraints: Option<Formula>,
    metric: Option<(MetricDirection, Expression)>,
}

/// Whether `:metric` asks the planner to minimize or maximize its
/// expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    Minimize,
    Maximize,
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricDirection::Minimize => "minimize",
            MetricDirection::Maximize => "maximize",
        };
        write!(f, "{s}")
    }
}

impl Problem {
    pub fn new(name: &str, domain: Rc<Domain>, requirements: crate::domain::Requirements) -> Self {
        Self {
            name: normalize(name),
            domain,
            requirements,
            objects: SymbolTable::new(),
            init: Effect::True,
            goal: Formula::True,
            constraints: None,
            metric: None,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_rc(&self) -> Rc<Domain> {
        Rc::clone(&self.domain)
    }

    pub fn requirements(&self) -> &crate::domain::Requirements {
        &self.requirements
    }

    pub fn requirements_mut(&mut self) -> &mut crate::domain::Requirements {
        &mut self.requirements
    }

    pub fn objects(&self) -> &SymbolTable<crate::domain::Object> {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut SymbolTable<crate::domain::Object> {
        &mut self.objects
    }

    pub fn init(&self) -> &Effect {
        &self.init
    }

    pub fn set_init(&mut self, init: Effect) {
        self.init = init;
    }

    pub fn goal(&self) -> &Formula {
        &self.goal
    }

    pub fn set_goal(&mut self, goal: Formula) {
        self.goal = goal;
    }

    pub fn constraints(&self) -> Option<&Formula> {
        self.constraints.as_ref()
    }

    pub fn set_constraints(&mut self, c: Formula) {
        self.constraints = Some(c);
    }

    pub fn metric(&self) -> Option<&(MetricDirection, Expression)> {
        self.metric.as_ref()
    }

    pub fn set_metric(&mut self, direction: MetricDirection, expr: Expression) {
        self.metric = Some((direction, expr));
    }
}

impl Named for Problem {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(define (problem {})", self.name)?;
        writeln!(f, "  (:domain {})", self.domain.name())?;
        if !self.objects.is_empty() {
            writeln!(f, "  (:objects")?;
            for o in self.objects.iter() {
                writeln!(f, "    {}", crate::domain::formula::fmt_typed_name(o.name(), o.type_name()))?;
            }
            writeln!(f, "  )")?;
        }
        if self.requirements.iter().next().is_some() {
            let mut reqs: Vec<&str> = self.requirements.iter().map(|r| r.keyword()).collect();
            reqs.sort_unstable();
            writeln!(f, "  (:requirements {})", reqs.join(" "))?;
        }
        write!(f, "  (:init")?;
        for literal in crate::domain::effect::init_conjuncts(&self.init) {
            write!(f, " ")?;
            crate::domain::effect::fmt_init_literal(literal, f)?;
        }
        writeln!(f, ")")?;
        writeln!(f, "  (:goal {})", self.goal)?;
        if let Some(c) = &self.constraints {
            writeln!(f, "  (:constraints {c})")?;
        }
        if let Some((direction, expr)) = &self.metric {
            writeln!(f, "  (:metric {direction} {expr})")?;
        }
        writeln!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::effect::AssignOp;
    use crate::domain::expr::Number;
    use crate::domain::{Requirements, TypingGraph};

    #[test]
    fn init_prints_as_a_flat_list_with_equals_for_assign() {
        let domain = Rc::new(Domain::new("d", Requirements::new(), TypingGraph::new()));
        let mut problem = Problem::new("p", domain, Requirements::new());
        problem.set_init(Effect::and(vec![
            Effect::Predicate { name: "p".into(), class: None, args: vec![] },
            Effect::Not(Box::new(Effect::Predicate { name: "q".into(), class: None, args: vec![] })),
            Effect::Assign {
                op: AssignOp::Assign,
                fhead: Expression::FunctionApplication { name: "f".into(), class: None, args: vec![] },
                value: Expression::NumberLiteral(Number::Int(3)),
            },
        ]));
        let printed = problem.to_string();
        assert!(printed.contains("(:init (p) (not (q)) (= (f) 3))"));
        assert!(!printed.contains("(and"));
        assert!(!printed.contains("(assign"));
    }
}
