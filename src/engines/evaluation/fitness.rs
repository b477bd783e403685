use crate::engines::evaluation::linear::{fit_least_squares, LinearFit};
use crate::engines::generation::ast::ExpressionTree;
use crate::engines::generation::genome::Chromosome;
use crate::engines::metrics::RegressionMetrics;
use crate::functions::registry::SymbolTable;
use crate::types::{Table, TrainingSet};

/// Fitness of one chromosome on the training set, with the linking fit it was scored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    pub fit: LinearFit,
}

impl Evaluation {
    pub fn worst(gene_count: usize) -> Self {
        Self {
            fitness: 0.0,
            fit: LinearFit {
                coefficients: vec![0.0; gene_count],
                intercept: 0.0,
            },
        }
    }
}

/// Scores chromosomes against a training set.
///
/// Holds only shared references, so one evaluator can be used from many worker
/// threads at once.
pub struct FitnessEvaluator<'a> {
    data: &'a TrainingSet,
    table: &'a SymbolTable,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(data: &'a TrainingSet, table: &'a SymbolTable) -> Self {
        Self { data, table }
    }

    pub fn data(&self) -> &TrainingSet {
        self.data
    }

    /// Decode every gene and evaluate it on every row; one column per gene.
    pub fn gene_outputs(&self, chromosome: &Chromosome, inputs: &Table) -> Vec<Vec<f64>> {
        chromosome
            .genes()
            .iter()
            .map(|gene| ExpressionTree::decode(gene, self.table).evaluate_table(inputs))
            .collect()
    }

    /// Fit the linking coefficients and compute R².
    pub fn evaluate(&self, chromosome: &Chromosome) -> Evaluation {
        let columns = self.gene_outputs(chromosome, self.data.inputs());
        let fit = fit_least_squares(&columns, self.data.response());
        let predicted = link_columns(&columns, &fit);

        if predicted.iter().any(|p| !p.is_finite()) {
            return Evaluation::worst(chromosome.gene_count());
        }

        let fitness = RegressionMetrics::r_squared(&predicted, self.data.response());
        Evaluation { fitness, fit }
    }

    /// Predictions for the training inputs under a given fit.
    pub fn predict(&self, chromosome: &Chromosome, fit: &LinearFit) -> Vec<f64> {
        let columns = self.gene_outputs(chromosome, self.data.inputs());
        link_columns(&columns, fit)
    }
}

/// Row-wise linear combination of gene output columns.
pub fn link_columns(columns: &[Vec<f64>], fit: &LinearFit) -> Vec<f64> {
    let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
    (0..nrows)
        .map(|i| {
            fit.intercept
                + columns
                    .iter()
                    .zip(&fit.coefficients)
                    .map(|(column, b)| b * column[i])
                    .sum::<f64>()
        })
        .collect()
}
