//! Persisted model artifact.
//!
//! A model is written as a pretty-printed JSON document holding everything the
//! scorer needs: the symbol table (operator names, variable count, constant
//! pool), each gene as a list of symbol codes, and the linking coefficients.
//! Loading checks the document against the built-in operator catalog and the
//! head/tail layout before anything is decoded.

use crate::engines::evaluation::LinearFit;
use crate::engines::generation::ast::{render_model, ExpressionTree};
use crate::engines::generation::genome::{Chromosome, Gene};
use crate::error::{GepError, Result};
use crate::functions::primitives::Operator;
use crate::functions::registry::{SymbolTable, SYMBOL_TABLE_VERSION};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymbolTableDocument {
    version: u32,
    operators: Vec<String>,
    n_vars: usize,
    constants: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelDocument {
    format_version: u32,
    symbol_table: SymbolTableDocument,
    gene_count: usize,
    head_length: usize,
    tail_length: usize,
    genes: Vec<Vec<u16>>,
    coefficients: Vec<f64>,
    intercept: f64,
    fitness: f64,
    /// Informational only; rebuilt on load.
    formula: String,
}

/// A trained model: one chromosome, its linking fit and the symbol table that
/// decodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedModel {
    table: SymbolTable,
    chromosome: Chromosome,
    fit: LinearFit,
    fitness: f64,
    formula: String,
}

impl PersistedModel {
    pub fn new(table: SymbolTable, chromosome: Chromosome, fit: LinearFit, fitness: f64) -> Self {
        let formulas: Vec<String> = chromosome
            .genes()
            .iter()
            .map(|gene| ExpressionTree::decode(gene, &table).to_formula())
            .collect();
        let formula = render_model(&formulas, &fit.coefficients, fit.intercept);
        Self {
            table,
            chromosome,
            fit,
            fitness,
            formula,
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    pub fn fit(&self) -> &LinearFit {
        &self.fit
    }

    /// Training R².
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn n_vars(&self) -> usize {
        self.table.n_vars()
    }

    pub fn head_length(&self) -> usize {
        self.chromosome
            .genes()
            .first()
            .map(|g| g.head_length())
            .unwrap_or(0)
    }
}

pub struct ModelStore;

impl ModelStore {
    pub fn save<P: AsRef<Path>>(model: &PersistedModel, path: P) -> Result<()> {
        let json = Self::to_json(model)?;
        std::fs::write(path.as_ref(), json)?;
        log::debug!("Model written to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<PersistedModel> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn to_json(model: &PersistedModel) -> Result<String> {
        let table = &model.table;
        let head_length = model.head_length();
        let document = ModelDocument {
            format_version: FORMAT_VERSION,
            symbol_table: SymbolTableDocument {
                version: SYMBOL_TABLE_VERSION,
                operators: table.operators().iter().map(|op| op.name().to_string()).collect(),
                n_vars: table.n_vars(),
                constants: table.constants().to_vec(),
            },
            gene_count: model.chromosome.gene_count(),
            head_length,
            tail_length: table.tail_length(head_length),
            genes: model
                .chromosome
                .genes()
                .iter()
                .map(|gene| {
                    gene.symbols()
                        .iter()
                        .map(|s| {
                            table.code(*s).ok_or_else(|| {
                                GepError::Format(format!(
                                    "Symbol {:?} is not in the model's symbol table",
                                    s
                                ))
                            })
                        })
                        .collect::<Result<Vec<u16>>>()
                })
                .collect::<Result<Vec<_>>>()?,
            coefficients: model.fit.coefficients.clone(),
            intercept: model.fit.intercept,
            fitness: model.fitness,
            formula: model.formula.clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn from_json(json: &str) -> Result<PersistedModel> {
        let document: ModelDocument = serde_json::from_str(json)
            .map_err(|e| GepError::Format(format!("Unreadable model document: {}", e)))?;

        if document.format_version != FORMAT_VERSION {
            return Err(GepError::Format(format!(
                "Unsupported model format version {} (expected {})",
                document.format_version, FORMAT_VERSION
            )));
        }

        let table = decode_table(&document.symbol_table)?;
        let chromosome = decode_genes(&document, &table)?;

        if document.coefficients.len() != document.gene_count {
            return Err(GepError::Format(format!(
                "{} coefficients recorded for {} genes",
                document.coefficients.len(),
                document.gene_count
            )));
        }
        if document
            .coefficients
            .iter()
            .chain(std::iter::once(&document.intercept))
            .any(|c| !c.is_finite())
        {
            return Err(GepError::Format(
                "Linking coefficients must be finite".to_string(),
            ));
        }

        let fit = LinearFit {
            coefficients: document.coefficients,
            intercept: document.intercept,
        };
        Ok(PersistedModel::new(table, chromosome, fit, document.fitness))
    }
}

fn decode_table(doc: &SymbolTableDocument) -> Result<SymbolTable> {
    if doc.version != SYMBOL_TABLE_VERSION {
        return Err(GepError::Format(format!(
            "Unsupported symbol table version {} (expected {})",
            doc.version, SYMBOL_TABLE_VERSION
        )));
    }
    if doc.operators.len() > Operator::ALL.len() {
        return Err(GepError::Format(format!(
            "Model references {} operators, the built-in catalog has {}",
            doc.operators.len(),
            Operator::ALL.len()
        )));
    }

    let operators = doc
        .operators
        .iter()
        .map(|name| {
            Operator::from_name(name)
                .ok_or_else(|| GepError::Format(format!("Unknown operator '{}' in model", name)))
        })
        .collect::<Result<Vec<_>>>()?;

    SymbolTable::new(operators, doc.n_vars, doc.constants.clone())
        .map_err(|e| GepError::Format(format!("Invalid symbol table: {}", e)))
}

fn decode_genes(doc: &ModelDocument, table: &SymbolTable) -> Result<Chromosome> {
    if doc.gene_count == 0 || doc.genes.len() != doc.gene_count {
        return Err(GepError::Format(format!(
            "Header announces {} genes, document holds {}",
            doc.gene_count,
            doc.genes.len()
        )));
    }
    if doc.head_length == 0 || doc.tail_length != table.tail_length(doc.head_length) {
        return Err(GepError::Format(format!(
            "Head length {} and tail length {} do not match the symbol table",
            doc.head_length, doc.tail_length
        )));
    }

    let gene_length = doc.head_length + doc.tail_length;
    let mut genes = Vec::with_capacity(doc.gene_count);
    for (g, codes) in doc.genes.iter().enumerate() {
        if codes.len() != gene_length {
            return Err(GepError::Format(format!(
                "Gene {} has {} symbols, expected {}",
                g,
                codes.len(),
                gene_length
            )));
        }
        let mut symbols = Vec::with_capacity(gene_length);
        for (i, &code) in codes.iter().enumerate() {
            let symbol = table.symbol(code).ok_or_else(|| {
                GepError::Format(format!(
                    "Gene {} position {}: code {} outside symbol table of {}",
                    g,
                    i,
                    code,
                    table.len()
                ))
            })?;
            if i >= doc.head_length && !symbol.is_terminal() {
                return Err(GepError::Format(format!(
                    "Gene {} position {}: function symbol in tail",
                    g, i
                )));
            }
            symbols.push(symbol);
        }
        genes.push(Gene::new(symbols, doc.head_length));
    }
    Ok(Chromosome::new(genes))
}
