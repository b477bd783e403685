//! Head-tail (Karva) genome representation.
//!
//! A gene is a fixed-length symbol string: a head of `head_length` positions that
//! may hold functions or terminals, followed by a tail of terminals only. The tail
//! is long enough that any head decodes to a complete expression, so genetic
//! operators can work on flat symbol positions without ever producing an invalid
//! tree:
//! - **Crossover**: swapping aligned segments keeps head and tail positions apart
//! - **Mutation**: a position is redrawn from the symbols legal for its region
//!
//! A chromosome is a fixed number of genes whose decoded outputs are linked by a
//! least-squares linear combination.

use crate::functions::registry::{Symbol, SymbolTable};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    symbols: Vec<Symbol>,
    head_length: usize,
}

impl Gene {
    pub fn new(symbols: Vec<Symbol>, head_length: usize) -> Self {
        Self {
            symbols,
            head_length,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut [Symbol] {
        &mut self.symbols
    }

    pub fn head_length(&self) -> usize {
        self.head_length
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_head_position(&self, position: usize) -> bool {
        position < self.head_length
    }
}

/// Random gene: head uniform over all symbol kinds, tail uniform over terminals.
pub fn random_gene<R: Rng>(table: &SymbolTable, head_length: usize, rng: &mut R) -> Gene {
    let tail_length = table.tail_length(head_length);
    let mut symbols = Vec::with_capacity(head_length + tail_length);
    for _ in 0..head_length {
        symbols.push(table.random_head_symbol(rng));
    }
    for _ in 0..tail_length {
        symbols.push(table.random_tail_symbol(rng));
    }
    Gene::new(symbols, head_length)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    pub fn random<R: Rng>(
        table: &SymbolTable,
        gene_count: usize,
        head_length: usize,
        rng: &mut R,
    ) -> Self {
        let genes = (0..gene_count)
            .map(|_| random_gene(table, head_length, rng))
            .collect();
        Self { genes }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Total number of symbol positions across all genes.
    pub fn len(&self) -> usize {
        self.genes.iter().map(Gene::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map a flat position to (gene index, position within gene).
    pub fn locate(&self, position: usize) -> (usize, usize) {
        let mut offset = position;
        for (g, gene) in self.genes.iter().enumerate() {
            if offset < gene.len() {
                return (g, offset);
            }
            offset -= gene.len();
        }
        let last = self.genes.len().saturating_sub(1);
        (last, self.genes[last].len().saturating_sub(1))
    }

    pub fn symbol_at(&self, position: usize) -> Symbol {
        let (g, i) = self.locate(position);
        self.genes[g].symbols[i]
    }

    pub fn set_symbol_at(&mut self, position: usize, symbol: Symbol) {
        let (g, i) = self.locate(position);
        self.genes[g].symbols[i] = symbol;
    }

    pub fn is_head_position(&self, position: usize) -> bool {
        let (g, i) = self.locate(position);
        self.genes[g].is_head_position(i)
    }
}
