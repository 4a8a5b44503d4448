//! Numeric expressions (spec C6).

use super::terms::Term;

/// A numeric literal, tagged by whether it was written with a decimal
/// point. Spec §4.6: "Integer and float share a single Number type
/// with a tag distinguishing integral from floating" — kept distinct
/// rather than collapsed to `f64` so the printer can round-trip `5`
/// vs `5.0` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Real(f) => *f,
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Real(x) => write!(f, "{x}"),
        }
    }
}

/// The four arithmetic operators `+ - * /` can build as a binary
/// expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        };
        write!(f, "{s}")
    }
}

/// The five comparison operators a numeric `Formula::Comparison` can
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Eq => "=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Gt => ">",
        };
        write!(f, "{s}")
    }
}

/// A numeric expression tree. Unary minus is the only unary arithmetic
/// operator PDDL+ grants (spec Open Question decision: "no unary
/// plus"); everything else is a binary `ArithOp` node or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    NumberLiteral(Number),
    /// A term used directly where a number is expected, e.g. inside an
    /// either-typed numeric/object fluent comparison.
    TermRef(Term),
    /// `(name arg...)` applied to a declared function, optionally
    /// qualified by a class name (spec's class-qualified function
    /// application supplement: `(class.fn ?x)`).
    FunctionApplication { name: String, class: Option<String>, args: Vec<Term> },
    BinaryOp { op: ArithOp, lhs: Box<Expression>, rhs: Box<Expression> },
    Negate(Box<Expression>),
    /// The `#t` placeholder usable only inside a durative action's
    /// duration constraint or condition (spec §4.4).
    DurationPlaceholder,
}

impl Expression {
    pub fn binary(op: ArithOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::BinaryOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn negate(inner: Expression) -> Self {
        Expression::Negate(Box::new(inner))
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::NumberLiteral(n) => write!(f, "{n}"),
            Expression::TermRef(t) => write!(f, "{t}"),
            Expression::FunctionApplication { name, class, args } => {
                write!(f, "(")?;
                match class {
                    Some(c) => write!(f, "{c}.{name}")?,
                    None => write!(f, "{name}")?,
                }
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            },
            Expression::BinaryOp { op, lhs, rhs } => write!(f, "({op} {lhs} {rhs})"),
            Expression::Negate(inner) => write!(f, "(- {inner})"),
            Expression::DurationPlaceholder => write!(f, "#t"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_preserves_int_vs_real_tag() {
        assert_eq!(Number::Int(5).to_string(), "5");
        assert_eq!(Number::Real(5.0).to_string(), "5");
        assert_ne!(Number::Int(5), Number::Real(5.0));
    }

    #[test]
    fn negate_wraps_in_box() {
        let e = Expression::negate(Expression::NumberLiteral(Number::Int(3)));
        assert!(matches!(e, Expression::Negate(_)));
    }
}
