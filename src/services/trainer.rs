use crate::config::{ConfigSection, RunConfig};
use crate::data::DataValidator;
use crate::engines::generation::{
    EliteModel, EvolutionEngine, LogProgressCallback, ProgressCallback, RoundSummary,
};
use crate::engines::metrics::RegressionMetrics;
use crate::engines::model::{ModelStore, PersistedModel, Scorer};
use crate::error::Result;
use crate::functions::registry::SymbolTable;
use crate::types::{Table, TrainingSet};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One hall-of-fame entry, ready for display.
#[derive(Clone, Debug)]
pub struct ModelSummary {
    pub rank: usize,
    pub fitness: f64,
    pub formula: String,
    pub round: usize,
    pub generation: usize,
}

/// What a finished training call hands back.
#[derive(Clone, Debug)]
pub struct TrainReport {
    pub model_path: PathBuf,
    pub best_fitness: f64,
    /// `r2`, `rmse`, `mae` of the saved model on the training rows.
    pub metrics: HashMap<String, f64>,
    pub formula: String,
    pub rounds: Vec<RoundSummary>,
    pub hall_of_fame: Vec<ModelSummary>,
}

/// Train with progress reported through `log` at `config.verbose` granularity.
pub fn train(response: &[f64], inputs: &Table, config: &RunConfig) -> Result<TrainReport> {
    let mut callback = LogProgressCallback::new(config.verbose);
    train_with_callback(response, inputs, config, &mut callback)
}

/// Validate everything, evolve, and persist the best model to `config.output`.
pub fn train_with_callback<C: ProgressCallback + ?Sized>(
    response: &[f64],
    inputs: &Table,
    config: &RunConfig,
    callback: &mut C,
) -> Result<TrainReport> {
    config.validate()?;
    DataValidator::validate_training(response, inputs)?;

    let data = TrainingSet::new(inputs.clone(), response.to_vec())?;
    info!(
        "Training on {} rows x {} variables (popsize {}, maxiter {}, rounds {})",
        data.nrows(),
        data.nvars(),
        config.popsize,
        config.maxiter,
        config.maxpass
    );

    let mut engine = EvolutionEngine::new(config.clone(), data.nvars())?;
    let outcome = engine.run(&data, callback)?;

    let best = &outcome.best;
    let model = PersistedModel::new(
        outcome.table.clone(),
        best.chromosome.clone(),
        best.evaluation.fit.clone(),
        best.fitness(),
    );

    let predictions = Scorer::new(&model).predict(data.inputs())?;
    let metrics = RegressionMetrics::calculate(&predictions, data.response());

    ModelStore::save(&model, &config.output)?;
    info!(
        "Best model R² {:.6} saved to {}: y = {}",
        model.fitness(),
        config.output.display(),
        model.formula()
    );

    let hall_of_fame = outcome
        .hall_of_fame
        .iter()
        .enumerate()
        .map(|(i, elite)| elite_to_summary(elite, &outcome.table, i + 1))
        .collect();

    Ok(TrainReport {
        model_path: config.output.clone(),
        best_fitness: model.fitness(),
        metrics,
        formula: model.formula().to_string(),
        rounds: outcome.rounds,
        hall_of_fame,
    })
}

/// Predict with a saved model.
pub fn score<P: AsRef<Path>>(model_path: P, inputs: &Table) -> Result<Vec<f64>> {
    let model = ModelStore::load(model_path)?;
    DataValidator::validate_scoring(inputs, model.n_vars())?;
    Scorer::new(&model).predict(inputs)
}

pub fn elite_to_summary(elite: &EliteModel, table: &SymbolTable, rank: usize) -> ModelSummary {
    let model = PersistedModel::new(
        table.clone(),
        elite.chromosome.clone(),
        elite.evaluation.fit.clone(),
        elite.fitness(),
    );
    ModelSummary {
        rank,
        fitness: elite.fitness(),
        formula: model.formula().to_string(),
        round: elite.round,
        generation: elite.generation,
    }
}
