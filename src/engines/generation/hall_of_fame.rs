use crate::engines::evaluation::Evaluation;
use crate::engines::generation::ast::ExpressionTree;
use crate::engines::generation::genome::Chromosome;
use crate::functions::registry::SymbolTable;

use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct EliteModel {
    pub chromosome: Chromosome,
    pub evaluation: Evaluation,
    pub canonical_string: String, // For deduplication
    pub round: usize,
    pub generation: usize,
}

impl EliteModel {
    pub fn new(
        chromosome: Chromosome,
        evaluation: Evaluation,
        table: &SymbolTable,
        round: usize,
        generation: usize,
    ) -> Self {
        let canonical_string = canonical_string(&chromosome, table);
        Self {
            chromosome,
            evaluation,
            canonical_string,
            round,
            generation,
        }
    }

    pub fn fitness(&self) -> f64 {
        self.evaluation.fitness
    }
}

/// Best structurally distinct chromosomes seen across all rounds, best first.
pub struct HallOfFame {
    models: Vec<EliteModel>,
    max_size: usize,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            models: Vec::new(),
            max_size: max_size.max(1),
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add a model. Returns false for duplicates and for models that
    /// would not make the cut.
    pub fn try_add(&mut self, model: EliteModel) -> bool {
        // Deduplication check
        if self.seen_signatures.contains(&model.canonical_string) {
            return false;
        }

        if self.models.len() >= self.max_size {
            let worst = self.models.last().map(|m| m.fitness()).unwrap_or(0.0);
            if model.fitness() <= worst {
                return false;
            }
        }

        self.seen_signatures.insert(model.canonical_string.clone());
        self.models.push(model);
        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        // Stable sort: among equal fitness the earliest discovery stays ahead
        self.models.sort_by(|a, b| {
            b.fitness()
                .partial_cmp(&a.fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.models.len() > self.max_size {
            if let Some(removed) = self.models.pop() {
                self.seen_signatures.remove(&removed.canonical_string);
            }
        }
    }

    pub fn best(&self) -> Option<&EliteModel> {
        self.models.first()
    }

    pub fn best_fitness(&self) -> f64 {
        self.best().map(|m| m.fitness()).unwrap_or(0.0)
    }

    pub fn get_all(&self) -> &[EliteModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Signature of the expressions a chromosome actually encodes; unused tail
/// symbols do not affect it.
pub fn canonical_string(chromosome: &Chromosome, table: &SymbolTable) -> String {
    chromosome
        .genes()
        .iter()
        .map(|gene| ExpressionTree::decode(gene, table).to_formula())
        .collect::<Vec<_>>()
        .join(" | ")
}
