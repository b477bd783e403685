use serde::{Deserialize, Serialize};

/// Denominators and log arguments closer to zero than this take the guarded branch.
pub const GUARD_EPSILON: f64 = 1e-10;

/// Largest argument `exp` is evaluated for before the overflow guard kicks in.
pub const EXP_LIMIT: f64 = 50.0;

/// Built-in function catalog. The order of `Operator::ALL` is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Square,
    Sqrt,
    Exp,
    Ln,
    Sin,
    Cos,
    Neg,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Square,
        Operator::Sqrt,
        Operator::Exp,
        Operator::Ln,
        Operator::Sin,
        Operator::Cos,
        Operator::Neg,
    ];

    /// Largest arity in the catalog; drives the tail length.
    pub const MAX_ARITY: usize = 2;

    pub fn arity(self) -> usize {
        match self {
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => 2,
            Operator::Square
            | Operator::Sqrt
            | Operator::Exp
            | Operator::Ln
            | Operator::Sin
            | Operator::Cos
            | Operator::Neg => 1,
        }
    }

    /// Short name used in configs and persisted models.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Square => "sqr",
            Operator::Sqrt => "sqrt",
            Operator::Exp => "exp",
            Operator::Ln => "ln",
            Operator::Sin => "sin",
            Operator::Cos => "cos",
            Operator::Neg => "neg",
        }
    }

    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Apply with guarded semantics. `b` is ignored by unary operators.
    /// The result is always finite when both arguments are.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        let value = match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => {
                if b.abs() < GUARD_EPSILON {
                    1.0
                } else {
                    a / b
                }
            }
            Operator::Square => a * a,
            Operator::Sqrt => {
                if a < 0.0 {
                    0.0
                } else {
                    a.sqrt()
                }
            }
            Operator::Exp => {
                if a > EXP_LIMIT {
                    0.0
                } else {
                    a.exp()
                }
            }
            Operator::Ln => {
                if a <= GUARD_EPSILON {
                    0.0
                } else {
                    a.ln()
                }
            }
            Operator::Sin => a.sin(),
            Operator::Cos => a.cos(),
            Operator::Neg => -a,
        };

        guard(value)
    }

    /// Infix or call-style rendering of an application.
    pub fn render(self, args: &[String]) -> String {
        match self.arity() {
            2 => format!("({} {} {})", args[0], self.name(), args[1]),
            _ => format!("{}({})", self.name(), args[0]),
        }
    }
}

/// Collapse overflow and NaN to the zero sentinel.
pub fn guard(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
