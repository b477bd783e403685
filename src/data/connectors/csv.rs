use super::validator::DataValidator;
use crate::error::{GepError, Result};
use crate::types::{Table, TrainingSet};
use polars::prelude::*;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P, has_header: bool, separator: u8) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(has_header)
            .with_parse_options(CsvParseOptions::default().with_separator(separator))
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| GepError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.as_ref().display()
        );
        Ok(df)
    }

    /// Split a frame into the response column and an input table of every other
    /// column, in file order.
    pub fn to_training(df: &DataFrame, response_column: &str) -> Result<TrainingSet> {
        Self::check_frame(df)?;
        if !Self::has_column(df, response_column) {
            return Err(GepError::DataLoading(format!(
                "Response column '{}' not found (columns: {:?})",
                response_column,
                df.get_column_names()
            )));
        }

        let response = Self::column_values(df, response_column)?;
        let inputs = Self::to_table(df, Some(response_column))?;
        TrainingSet::new(inputs, response)
    }

    /// Every column except `exclude` as a row-major table.
    pub fn to_table(df: &DataFrame, exclude: Option<&str>) -> Result<Table> {
        Self::check_frame(df)?;
        let columns = df
            .get_column_names()
            .into_iter()
            .filter(|name| Some(name.as_str()) != exclude)
            .map(|name| Self::column_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Table::new(df.height(), 0, Vec::new());
        }
        Table::from_columns(&columns)
    }

    /// Write one `prediction` column.
    pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[f64]) -> Result<()> {
        let mut df = df!("prediction" => predictions)?;
        let mut file = std::fs::File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }

    fn check_frame(df: &DataFrame) -> Result<()> {
        DataValidator::validate_numeric(df)?;
        let null_report = DataValidator::check_nulls(df)?;
        if !null_report.is_empty() {
            return Err(GepError::Validation(format!(
                "Missing values detected: {:?}",
                null_report
            )));
        }
        Ok(())
    }

    fn has_column(df: &DataFrame, name: &str) -> bool {
        df.get_column_names().iter().any(|col| col.as_str() == name)
    }

    fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        Ok(column
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}
