use super::traits::{check_range, ConfigSection};
use crate::error::GepError;
use crate::functions::primitives::Operator;
use crate::functions::registry::resolve_operators;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::PathBuf;

/// Largest head length accepted.
pub const MAX_HEAD_LENGTH: usize = 100;

/// Largest number of genes per chromosome.
pub const MAX_GENES: usize = 16;

/// Largest random-constant pool.
pub const MAX_CONSTANTS: usize = 1000;

/// Immutable snapshot of every tunable of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// One-point crossover probability.
    pub px1: f64,
    /// Two-point crossover probability.
    pub px2: f64,
    /// Point mutation probability.
    pub pm: f64,
    /// Generations per round.
    pub maxiter: usize,
    pub headlen: usize,
    pub popsize: usize,
    /// Fraction of the population carried over unchanged.
    pub eliterate: f64,
    /// R² at which a round stops early.
    pub goal: f64,
    pub rseed: u64,
    pub nthreads: usize,
    /// 0 = silent, 1 = per round, 2 = per generation.
    pub verbose: u8,
    pub fit_method: FitMethod,
    /// Independent restarts.
    pub maxpass: usize,
    pub output: PathBuf,
    pub ngenes: usize,
    /// Function set, by operator name.
    pub operators: Vec<String>,
    /// Size of the random constant pool.
    pub constants: usize,
    pub constant_range: (f64, f64),
    pub hall_of_fame_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FitMethod {
    Regression,
    /// Reserved; rejected by validation.
    Classification,
}

impl TryFrom<u8> for FitMethod {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FitMethod::Regression),
            1 => Ok(FitMethod::Classification),
            other => Err(format!("unknown fit_method {}", other)),
        }
    }
}

impl From<FitMethod> for u8 {
    fn from(method: FitMethod) -> u8 {
        match method {
            FitMethod::Regression => 0,
            FitMethod::Classification => 1,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            px1: 0.4,
            px2: 0.2,
            pm: 0.2,
            maxiter: 100,
            headlen: 6,
            popsize: 100,
            eliterate: 0.05,
            goal: 0.99,
            rseed: 1,
            nthreads: 1,
            verbose: 0,
            fit_method: FitMethod::Regression,
            maxpass: 1,
            output: PathBuf::from("model.json"),
            ngenes: 3,
            operators: Operator::ALL.iter().map(|op| op.name().to_string()).collect(),
            constants: 10,
            constant_range: (-10.0, 10.0),
            hall_of_fame_size: 5,
        }
    }
}

impl RunConfig {
    /// Number of individuals carried over unchanged each generation.
    pub fn elite_count(&self) -> usize {
        // snap products like 0.7 * 10 = 7.000000000000001 down, never below one elite
        let product = self.eliterate * self.popsize as f64;
        let nearest = product.round();
        let count = if nearest >= 1.0 && (product - nearest).abs() < 1e-9 {
            nearest
        } else {
            product.ceil()
        };
        (count.max(0.0) as usize).min(self.popsize)
    }
}

impl ConfigSection for RunConfig {
    fn section_name() -> &'static str {
        "training"
    }

    fn validate(&self) -> Result<(), GepError> {
        check_range("px1", self.px1, 0.0, 1.0)?;
        check_range("px2", self.px2, 0.0, 1.0)?;
        check_range("pm", self.pm, 0.0, 1.0)?;
        check_range("eliterate", self.eliterate, 0.0, 1.0)?;
        check_range("goal", self.goal, 0.0, 1.0)?;

        if self.maxiter <= 1 {
            return Err(GepError::Validation(format!(
                "maxiter must be greater than 1, got {}",
                self.maxiter
            )));
        }
        if self.headlen == 0 || self.headlen > MAX_HEAD_LENGTH {
            return Err(GepError::Validation(format!(
                "headlen must be in 1..={}, got {}",
                MAX_HEAD_LENGTH, self.headlen
            )));
        }
        if self.popsize == 0 {
            return Err(GepError::Validation(
                "popsize must be positive".to_string(),
            ));
        }
        if self.rseed == 0 {
            return Err(GepError::Validation("rseed must be positive".to_string()));
        }
        if self.nthreads == 0 {
            return Err(GepError::Validation(
                "nthreads must be at least 1".to_string(),
            ));
        }
        if self.verbose > 2 {
            return Err(GepError::Validation(format!(
                "verbose must be 0, 1 or 2, got {}",
                self.verbose
            )));
        }
        if self.fit_method == FitMethod::Classification {
            return Err(GepError::Validation(
                "fit_method 1 (classification) is not implemented".to_string(),
            ));
        }
        if self.maxpass == 0 {
            return Err(GepError::Validation(
                "maxpass must be at least 1".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(GepError::Validation(
                "output path must not be empty".to_string(),
            ));
        }
        if self.ngenes == 0 || self.ngenes > MAX_GENES {
            return Err(GepError::Validation(format!(
                "ngenes must be in 1..={}, got {}",
                MAX_GENES, self.ngenes
            )));
        }
        if self.operators.is_empty() {
            return Err(GepError::Validation(
                "operators must name at least one function".to_string(),
            ));
        }
        let resolved = resolve_operators(&self.operators)?;
        for (i, op) in resolved.iter().enumerate() {
            if resolved[..i].contains(op) {
                return Err(GepError::Validation(format!(
                    "operator '{}' listed twice",
                    op.name()
                )));
            }
        }
        if self.constants > MAX_CONSTANTS {
            return Err(GepError::Validation(format!(
                "constants must be at most {}, got {}",
                MAX_CONSTANTS, self.constants
            )));
        }
        let (lo, hi) = self.constant_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi || !(hi - lo).is_finite() {
            return Err(GepError::Validation(format!(
                "constant_range must be finite with lo < hi and a finite width, got [{}, {}]",
                lo, hi
            )));
        }
        if self.hall_of_fame_size == 0 {
            return Err(GepError::Validation(
                "hall_of_fame_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
