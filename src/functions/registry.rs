use crate::error::{GepError, Result};
use crate::functions::primitives::Operator;
use rand::Rng;
use std::collections::HashSet;

/// Version of the symbol coding scheme recorded in persisted models.
pub const SYMBOL_TABLE_VERSION: u32 = 1;

/// One position of a gene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Symbol {
    Function(Operator),
    /// Input column index.
    Variable(usize),
    /// Index into the table's constant pool.
    Constant(usize),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Symbol::Function(_))
    }

    pub fn arity(&self) -> usize {
        match self {
            Symbol::Function(op) => op.arity(),
            Symbol::Variable(_) | Symbol::Constant(_) => 0,
        }
    }
}

/// Closed catalog of functions and terminals for one run.
///
/// Terminals are one kind per input column plus a single constant kind; a drawn
/// constant is picked uniformly from the pool fixed at construction. Every symbol
/// also has a stable integer code: operators first (in table order), then input
/// variables, then pool constants.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    operators: Vec<Operator>,
    n_vars: usize,
    constants: Vec<f64>,
}

impl SymbolTable {
    pub fn new(operators: Vec<Operator>, n_vars: usize, constants: Vec<f64>) -> Result<Self> {
        if operators.is_empty() {
            return Err(GepError::Validation(
                "Function set must contain at least one operator".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for op in &operators {
            if !seen.insert(*op) {
                return Err(GepError::Validation(format!(
                    "Operator '{}' listed twice in function set",
                    op.name()
                )));
            }
        }
        if n_vars == 0 {
            return Err(GepError::Validation(
                "Symbol table needs at least one input variable".to_string(),
            ));
        }
        if let Some(c) = constants.iter().find(|c| !c.is_finite()) {
            return Err(GepError::Validation(format!("Constant {} is not finite", c)));
        }
        let size = operators.len() + n_vars + constants.len();
        if size > u16::MAX as usize {
            return Err(GepError::Validation(format!(
                "Symbol table of {} entries exceeds the {} code limit",
                size,
                u16::MAX
            )));
        }

        Ok(Self {
            operators,
            n_vars,
            constants,
        })
    }

    /// Draw `count` constants uniformly from `[lo, hi)`.
    pub fn with_random_constants<R: Rng>(
        operators: Vec<Operator>,
        n_vars: usize,
        count: usize,
        (lo, hi): (f64, f64),
        rng: &mut R,
    ) -> Result<Self> {
        if !(lo < hi) || !(hi - lo).is_finite() {
            return Err(GepError::Validation(format!(
                "Constant range [{}, {}] is empty or too wide to sample",
                lo, hi
            )));
        }
        let constants = (0..count).map(|_| rng.gen_range(lo..hi)).collect();
        Self::new(operators, n_vars, constants)
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    pub fn constant(&self, index: usize) -> f64 {
        self.constants[index]
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.operators.len() + self.n_vars + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_arity(&self) -> usize {
        self.operators.iter().map(|op| op.arity()).max().unwrap_or(0)
    }

    /// Tail length that guarantees every head decodes: t = h * (n - 1) + 1.
    pub fn tail_length(&self, head_length: usize) -> usize {
        head_length * (self.max_arity().saturating_sub(1)) + 1
    }

    fn terminal_kinds(&self) -> usize {
        self.n_vars + usize::from(!self.constants.is_empty())
    }

    /// Uniform over operators and terminal kinds.
    pub fn random_head_symbol<R: Rng>(&self, rng: &mut R) -> Symbol {
        let choice = rng.gen_range(0..self.operators.len() + self.terminal_kinds());
        if choice < self.operators.len() {
            Symbol::Function(self.operators[choice])
        } else {
            self.terminal_kind(choice - self.operators.len(), rng)
        }
    }

    /// Uniform over terminal kinds.
    pub fn random_tail_symbol<R: Rng>(&self, rng: &mut R) -> Symbol {
        let choice = rng.gen_range(0..self.terminal_kinds());
        self.terminal_kind(choice, rng)
    }

    fn terminal_kind<R: Rng>(&self, kind: usize, rng: &mut R) -> Symbol {
        if kind < self.n_vars {
            Symbol::Variable(kind)
        } else {
            Symbol::Constant(rng.gen_range(0..self.constants.len()))
        }
    }

    /// Code of `symbol`, or `None` when the symbol does not belong to this table.
    pub fn code(&self, symbol: Symbol) -> Option<u16> {
        let code = match symbol {
            Symbol::Function(op) => self.operators.iter().position(|o| *o == op)?,
            Symbol::Variable(i) if i < self.n_vars => self.operators.len() + i,
            Symbol::Constant(i) if i < self.constants.len() => {
                self.operators.len() + self.n_vars + i
            }
            _ => return None,
        };
        u16::try_from(code).ok()
    }

    pub fn symbol(&self, code: u16) -> Option<Symbol> {
        let code = code as usize;
        let n_ops = self.operators.len();
        if code < n_ops {
            Some(Symbol::Function(self.operators[code]))
        } else if code < n_ops + self.n_vars {
            Some(Symbol::Variable(code - n_ops))
        } else if code < self.len() {
            Some(Symbol::Constant(code - n_ops - self.n_vars))
        } else {
            None
        }
    }

    /// Human-readable label of a terminal or function name.
    pub fn label(&self, symbol: Symbol) -> String {
        match symbol {
            Symbol::Function(op) => op.name().to_string(),
            Symbol::Variable(i) => format!("x{}", i + 1),
            Symbol::Constant(i) => format!("{:.6}", self.constants[i]),
        }
    }
}

/// Resolve operator names from configuration against the built-in catalog.
pub fn resolve_operators(names: &[String]) -> Result<Vec<Operator>> {
    names
        .iter()
        .map(|name| {
            Operator::from_name(name).ok_or_else(|| {
                GepError::Validation(format!("Unknown operator '{}' in function set", name))
            })
        })
        .collect()
}
