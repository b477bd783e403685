use crate::engines::generation::genome::Chromosome;
use crate::functions::registry::SymbolTable;
use rand::Rng;

/// Roulette wheel selection: probability proportional to fitness. Returns a slot index.
pub fn roulette_selection<R: Rng>(fitnesses: &[f64], rng: &mut R) -> usize {
    let total_fitness: f64 = fitnesses.iter().map(|f| f.max(0.0)).sum();

    if total_fitness <= 0.0 || !total_fitness.is_finite() {
        // Nothing to weight by, pick uniformly
        return rng.gen_range(0..fitnesses.len());
    }

    let mut spin = rng.gen::<f64>() * total_fitness;

    for (i, fitness) in fitnesses.iter().enumerate() {
        let weight = fitness.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        spin -= weight;
        if spin <= 0.0 {
            return i;
        }
    }

    // Rounding left a sliver of the wheel; give it to the last viable slot
    fitnesses
        .iter()
        .rposition(|f| *f > 0.0)
        .unwrap_or(fitnesses.len() - 1)
}

/// Swap the flat symbol range `start..end` between two aligned chromosomes.
fn swap_range(a: &mut Chromosome, b: &mut Chromosome, start: usize, end: usize) {
    for position in start..end {
        let sa = a.symbol_at(position);
        let sb = b.symbol_at(position);
        a.set_symbol_at(position, sb);
        b.set_symbol_at(position, sa);
    }
}

/// One-point recombination: everything after a random cut is exchanged.
///
/// Parents share gene layout, so head and tail positions line up and both
/// children stay well formed.
pub fn one_point_crossover<R: Rng>(a: &mut Chromosome, b: &mut Chromosome, rng: &mut R) {
    let len = a.len().min(b.len());
    if len <= 1 {
        return;
    }
    let point = rng.gen_range(1..len);
    swap_range(a, b, point, len);
}

/// Two-point recombination: the segment between two random cuts is exchanged.
pub fn two_point_crossover<R: Rng>(a: &mut Chromosome, b: &mut Chromosome, rng: &mut R) {
    let len = a.len().min(b.len());
    if len <= 1 {
        return;
    }
    let start = rng.gen_range(0..len);
    let end = rng.gen_range(start + 1..=len);
    swap_range(a, b, start, end);
}

/// Point mutation: one position redrawn from the symbols legal there.
pub fn point_mutation<R: Rng>(chromosome: &mut Chromosome, table: &SymbolTable, rng: &mut R) {
    if chromosome.is_empty() {
        return;
    }
    let position = rng.gen_range(0..chromosome.len());
    let symbol = if chromosome.is_head_position(position) {
        table.random_head_symbol(rng)
    } else {
        table.random_tail_symbol(rng)
    };
    chromosome.set_symbol_at(position, symbol);
}
