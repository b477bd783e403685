use super::store::PersistedModel;
use crate::engines::evaluation::fitness::link_columns;
use crate::engines::generation::ast::ExpressionTree;
use crate::error::{GepError, Result};
use crate::functions::primitives::guard;
use crate::types::Table;

/// Replays a persisted model on new rows. Genes are decoded once up front.
pub struct Scorer<'a> {
    model: &'a PersistedModel,
    trees: Vec<ExpressionTree>,
}

impl<'a> Scorer<'a> {
    pub fn new(model: &'a PersistedModel) -> Self {
        let trees = model
            .chromosome()
            .genes()
            .iter()
            .map(|gene| ExpressionTree::decode(gene, model.table()))
            .collect();
        Self { model, trees }
    }

    pub fn model(&self) -> &PersistedModel {
        self.model
    }

    pub fn predict(&self, inputs: &Table) -> Result<Vec<f64>> {
        if inputs.nvars() != self.model.n_vars() {
            return Err(GepError::Validation(format!(
                "Model expects {} input variables, got {}",
                self.model.n_vars(),
                inputs.nvars()
            )));
        }
        let columns: Vec<Vec<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.evaluate_table(inputs))
            .collect();
        Ok(link_columns(&columns, self.model.fit())
            .into_iter()
            .map(guard)
            .collect())
    }

    /// Prediction for a single row; `row` must hold `n_vars` values.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let outputs: Vec<f64> = self.trees.iter().map(|tree| tree.evaluate(row)).collect();
        guard(self.model.fit().link(&outputs))
    }
}

pub fn predict(model: &PersistedModel, inputs: &Table) -> Result<Vec<f64>> {
    Scorer::new(model).predict(inputs)
}
