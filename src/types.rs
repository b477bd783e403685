use crate::error::{GepError, Result};
use serde::{Deserialize, Serialize};

/// Row-major numeric table of input variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    nrows: usize,
    nvars: usize,
    values: Vec<f64>,
}

impl Table {
    /// Build a table from a flat row-major buffer.
    pub fn new(nrows: usize, nvars: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != nrows * nvars {
            return Err(GepError::Validation(format!(
                "Table of {} x {} needs {} values, got {}",
                nrows,
                nvars,
                nrows * nvars,
                values.len()
            )));
        }
        Ok(Self { nrows, nvars, values })
    }

    /// Build a table from individual rows, which must all have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let nvars = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * nvars);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != nvars {
                return Err(GepError::Validation(format!(
                    "Row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    nvars
                )));
            }
            values.extend_from_slice(row);
        }
        Self::new(rows.len(), nvars, values)
    }

    /// Build a table from column vectors of equal length.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().position(|c| c.len() != nrows) {
            return Err(GepError::Validation(format!(
                "Column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                nrows
            )));
        }
        let nvars = columns.len();
        let mut values = vec![0.0; nrows * nvars];
        for (j, column) in columns.iter().enumerate() {
            for (i, v) in column.iter().enumerate() {
                values[i * nvars + j] = *v;
            }
        }
        Self::new(nrows, nvars, values)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.nvars..(i + 1) * self.nvars]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.nrows).map(move |i| self.row(i))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Input table plus response vector. Shared read-only during a training run.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    inputs: Table,
    response: Vec<f64>,
}

impl TrainingSet {
    pub fn new(inputs: Table, response: Vec<f64>) -> Result<Self> {
        if inputs.nrows() != response.len() {
            return Err(GepError::Validation(format!(
                "Response has {} rows but input table has {}",
                response.len(),
                inputs.nrows()
            )));
        }
        Ok(Self { inputs, response })
    }

    pub fn inputs(&self) -> &Table {
        &self.inputs
    }

    pub fn response(&self) -> &[f64] {
        &self.response
    }

    pub fn nrows(&self) -> usize {
        self.response.len()
    }

    pub fn nvars(&self) -> usize {
        self.inputs.nvars()
    }
}
