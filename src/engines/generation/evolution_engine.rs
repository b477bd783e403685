use crate::config::{ConfigSection, RunConfig};
use crate::engines::evaluation::{FitnessEvaluator, WorkerPool};
use crate::engines::generation::{
    hall_of_fame::{EliteModel, HallOfFame},
    operators::{one_point_crossover, point_mutation, roulette_selection, two_point_crossover},
    population::Population,
};
use crate::error::{GepError, Result};
use crate::functions::registry::{resolve_operators, SymbolTable};
use crate::types::TrainingSet;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    GoalReached,
    MaxIterations,
}

/// Summary of one independent round.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub round: usize,
    /// Generations bred after the initial population.
    pub generations: usize,
    pub best_fitness: f64,
    pub stop_reason: StopReason,
    /// Best fitness per generation; entry 0 is the initial population.
    pub history: Vec<f64>,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub best: EliteModel,
    pub table: SymbolTable,
    pub rounds: Vec<RoundSummary>,
    pub hall_of_fame: Vec<EliteModel>,
}

pub trait ProgressCallback: Send {
    fn on_round_start(&mut self, round: usize);
    fn on_generation_complete(
        &mut self,
        round: usize,
        generation: usize,
        best_fitness: f64,
        mean_fitness: f64,
    );
    fn on_round_complete(&mut self, summary: &RoundSummary);
}

pub struct EvolutionEngine {
    config: RunConfig,
    table: SymbolTable,
    workers: WorkerPool,
    hall_of_fame: HallOfFame,
    rng: StdRng,
}

/// Read-only state shared by every generation of a run.
struct RoundContext<'a> {
    config: &'a RunConfig,
    table: &'a SymbolTable,
    workers: &'a WorkerPool,
    evaluator: FitnessEvaluator<'a>,
}

impl EvolutionEngine {
    /// Validate the configuration and build the symbol table for `n_vars` inputs.
    ///
    /// The random constant pool is the first thing drawn from the seeded stream,
    /// so it is shared by every round of the run.
    pub fn new(config: RunConfig, n_vars: usize) -> Result<Self> {
        config.validate()?;
        let workers = WorkerPool::new(config.nthreads);
        Self::with_workers(config, n_vars, workers)
    }

    /// Like [`EvolutionEngine::new`], evaluating on `workers` instead of a pool
    /// sized from `config.nthreads`.
    pub fn with_workers(config: RunConfig, n_vars: usize, workers: WorkerPool) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.rseed);
        let operators = resolve_operators(&config.operators)?;
        let table = SymbolTable::with_random_constants(
            operators,
            n_vars,
            config.constants,
            config.constant_range,
            &mut rng,
        )?;
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);

        debug!(
            "Engine ready: {} symbols, tail length {}, {} worker(s), {} elite(s)",
            table.len(),
            table.tail_length(config.headlen),
            workers.workers(),
            config.elite_count()
        );

        Ok(Self {
            config,
            table,
            workers,
            hall_of_fame,
            rng,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    /// Run up to `maxpass` independent rounds and return the best model seen.
    pub fn run<C: ProgressCallback + ?Sized>(
        &mut self,
        data: &TrainingSet,
        callback: &mut C,
    ) -> Result<RunOutcome> {
        if data.nvars() != self.table.n_vars() {
            return Err(GepError::Validation(format!(
                "Training set has {} variables, engine was built for {}",
                data.nvars(),
                self.table.n_vars()
            )));
        }

        let ctx = RoundContext {
            config: &self.config,
            table: &self.table,
            workers: &self.workers,
            evaluator: FitnessEvaluator::new(data, &self.table),
        };

        let mut rounds = Vec::with_capacity(self.config.maxpass);
        for round in 0..self.config.maxpass {
            callback.on_round_start(round);
            let summary = run_round(&ctx, round, &mut self.rng, &mut self.hall_of_fame, callback);
            callback.on_round_complete(&summary);

            let reached = summary.stop_reason == StopReason::GoalReached;
            rounds.push(summary);
            if reached {
                debug!("Goal reached in round {}, skipping remaining rounds", round);
                break;
            }
        }

        let best = self
            .hall_of_fame
            .best()
            .cloned()
            .ok_or_else(|| GepError::Configuration("Run produced no model".to_string()))?;

        Ok(RunOutcome {
            best,
            table: self.table.clone(),
            rounds,
            hall_of_fame: self.hall_of_fame.get_all().to_vec(),
        })
    }
}

fn run_round<C: ProgressCallback + ?Sized>(
    ctx: &RoundContext,
    round: usize,
    rng: &mut StdRng,
    hall_of_fame: &mut HallOfFame,
    callback: &mut C,
) -> RoundSummary {
    let config = ctx.config;

    let mut population = Population::random(
        config.popsize,
        ctx.table,
        config.ngenes,
        config.headlen,
        rng,
    );
    population.evaluate(&ctx.evaluator, ctx.workers);

    let mut generation = 0;
    let mut history = Vec::with_capacity(config.maxiter + 1);
    let mut best_fitness = record_generation(ctx, &population, round, generation, hall_of_fame);
    history.push(best_fitness);
    callback.on_generation_complete(round, generation, best_fitness, population.mean_fitness());

    let stop_reason = loop {
        if best_fitness >= config.goal {
            break StopReason::GoalReached;
        }
        if generation == config.maxiter {
            break StopReason::MaxIterations;
        }

        next_generation(ctx, &mut population, rng);
        let scored = population.evaluate(&ctx.evaluator, ctx.workers);
        generation += 1;

        best_fitness = record_generation(ctx, &population, round, generation, hall_of_fame);
        history.push(best_fitness);
        debug!(
            "Round {} generation {}: {} re-evaluated, best {:.6}",
            round, generation, scored, best_fitness
        );
        callback.on_generation_complete(round, generation, best_fitness, population.mean_fitness());
    };

    RoundSummary {
        round,
        generations: generation,
        best_fitness,
        stop_reason,
        history,
    }
}

/// Offer the generation's best to the hall of fame and return its fitness.
fn record_generation(
    ctx: &RoundContext,
    population: &Population,
    round: usize,
    generation: usize,
    hall_of_fame: &mut HallOfFame,
) -> f64 {
    let Some(best) = population.best() else {
        return 0.0;
    };
    if let Some(evaluation) = best.evaluation() {
        let elite = EliteModel::new(
            best.chromosome.clone(),
            evaluation.clone(),
            ctx.table,
            round,
            generation,
        );
        if hall_of_fame.try_add(elite) {
            debug!("Hall of fame updated ({} entries)", hall_of_fame.len());
        }
    }
    best.fitness()
}

/// Breed the next generation in place. Elites keep their slots untouched; every
/// other slot receives an offspring of two roulette-selected parents.
fn next_generation(ctx: &RoundContext, population: &mut Population, rng: &mut StdRng) {
    let config = ctx.config;
    let size = population.len();
    let elite_count = config.elite_count().min(size);

    let mut is_elite = vec![false; size];
    for &slot in population.ranking().iter().take(elite_count) {
        is_elite[slot] = true;
    }

    let fitnesses = population.fitnesses();
    let needed = size - elite_count;
    let mut offspring = Vec::with_capacity(needed + 1);

    while offspring.len() < needed {
        let mut first = population.get(roulette_selection(&fitnesses, rng)).clone();
        let mut second = population.get(roulette_selection(&fitnesses, rng)).clone();

        if rng.gen::<f64>() < config.px1 {
            one_point_crossover(&mut first.chromosome, &mut second.chromosome, rng);
            first.invalidate();
            second.invalidate();
        }
        if rng.gen::<f64>() < config.px2 {
            two_point_crossover(&mut first.chromosome, &mut second.chromosome, rng);
            first.invalidate();
            second.invalidate();
        }
        for child in [&mut first, &mut second] {
            if rng.gen::<f64>() < config.pm {
                point_mutation(&mut child.chromosome, ctx.table, rng);
                child.invalidate();
            }
        }

        offspring.push(first);
        if offspring.len() < needed {
            offspring.push(second);
        }
    }

    let free_slots = (0..size).filter(|&slot| !is_elite[slot]);
    for (slot, child) in free_slots.zip(offspring) {
        population.replace(slot, child);
    }
}
