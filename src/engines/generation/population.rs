use crate::engines::evaluation::{Evaluation, FitnessEvaluator, WorkerPool};
use crate::engines::generation::genome::Chromosome;
use crate::functions::registry::SymbolTable;
use rand::Rng;

/// A chromosome with its cached evaluation. `evaluation` is `None` while the
/// genes have changed since the last scoring.
#[derive(Debug, Clone)]
pub struct Individual {
    pub chromosome: Chromosome,
    evaluation: Option<Evaluation>,
}

impl Individual {
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            evaluation: None,
        }
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    /// Cached fitness, 0 when not yet evaluated.
    pub fn fitness(&self) -> f64 {
        self.evaluation.as_ref().map(|e| e.fitness).unwrap_or(0.0)
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Drop the cached evaluation after the genes were modified.
    pub fn invalidate(&mut self) {
        self.evaluation = None;
    }

    pub fn evaluate(&mut self, evaluator: &FitnessEvaluator) {
        if self.evaluation.is_none() {
            self.evaluation = Some(evaluator.evaluate(&self.chromosome));
        }
    }
}

/// Fixed-capacity arena of individuals.
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn random<R: Rng>(
        size: usize,
        table: &SymbolTable,
        gene_count: usize,
        head_length: usize,
        rng: &mut R,
    ) -> Self {
        let individuals = (0..size)
            .map(|_| Individual::new(Chromosome::random(table, gene_count, head_length, rng)))
            .collect();
        Self { individuals }
    }

    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn get(&self, index: usize) -> &Individual {
        &self.individuals[index]
    }

    /// Overwrite one slot in place.
    pub fn replace(&mut self, index: usize, individual: Individual) {
        self.individuals[index] = individual;
    }

    /// Score every individual whose genes changed since its last evaluation.
    /// Returns how many were scored.
    pub fn evaluate(&mut self, evaluator: &FitnessEvaluator, pool: &WorkerPool) -> usize {
        let pending = self.individuals.iter().filter(|i| !i.is_evaluated()).count();
        pool.for_each_mut(&mut self.individuals, |individual| {
            individual.evaluate(evaluator)
        });
        pending
    }

    /// Fitness per slot, in slot order.
    pub fn fitnesses(&self) -> Vec<f64> {
        self.individuals.iter().map(Individual::fitness).collect()
    }

    /// Slot indices ordered best first; ties keep slot order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.individuals.len()).collect();
        order.sort_by(|&a, &b| {
            self.individuals[b]
                .fitness()
                .partial_cmp(&self.individuals[a].fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }

    pub fn best(&self) -> Option<&Individual> {
        self.ranking().first().map(|&i| &self.individuals[i])
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals.iter().map(Individual::fitness).sum::<f64>() / self.individuals.len() as f64
    }
}
