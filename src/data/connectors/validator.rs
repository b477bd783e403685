use crate::error::{GepError, Result};
use crate::types::Table;
use polars::prelude::*;

pub struct DataValidator;

impl DataValidator {
    /// Shape and value checks run before any training state is created.
    pub fn validate_training(response: &[f64], inputs: &Table) -> Result<()> {
        if inputs.nvars() == 0 {
            return Err(GepError::Validation(
                "Input table must have at least one variable".to_string(),
            ));
        }
        if inputs.nrows() < 2 {
            return Err(GepError::Validation(format!(
                "Training needs at least 2 rows, got {}",
                inputs.nrows()
            )));
        }
        if response.len() != inputs.nrows() {
            return Err(GepError::Validation(format!(
                "Response has {} values but input table has {} rows",
                response.len(),
                inputs.nrows()
            )));
        }
        if let Some(i) = response.iter().position(|v| !v.is_finite()) {
            return Err(GepError::Validation(format!(
                "Response value at row {} is missing or not finite",
                i
            )));
        }
        Self::validate_finite(inputs)
    }

    pub fn validate_scoring(inputs: &Table, expected_nvars: usize) -> Result<()> {
        if inputs.nvars() != expected_nvars {
            return Err(GepError::Validation(format!(
                "Model expects {} input variables, got {}",
                expected_nvars,
                inputs.nvars()
            )));
        }
        Self::validate_finite(inputs)
    }

    fn validate_finite(inputs: &Table) -> Result<()> {
        if let Some(k) = inputs.values().iter().position(|v| !v.is_finite()) {
            return Err(GepError::Validation(format!(
                "Input value at row {}, variable {} is missing or not finite",
                k / inputs.nvars(),
                k % inputs.nvars() + 1
            )));
        }
        Ok(())
    }

    /// Every column must hold numbers.
    pub fn validate_numeric(df: &DataFrame) -> Result<()> {
        for column in df.get_columns() {
            if !matches!(
                column.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::Int16
                    | DataType::Int8
                    | DataType::UInt64
                    | DataType::UInt32
                    | DataType::UInt16
                    | DataType::UInt8
            ) {
                return Err(GepError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    column.name(),
                    column.dtype()
                )));
            }
        }
        Ok(())
    }

    /// Check for null values in every column
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let series = df.column(col_name)?;
            let null_count = series.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_training_shapes() {
        let inputs = Table::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        assert!(DataValidator::validate_training(&[1.0, 2.0, 3.0], &inputs).is_ok());
        assert!(DataValidator::validate_training(&[1.0, 2.0], &inputs).is_err());
        assert!(DataValidator::validate_training(&[1.0, f64::NAN, 3.0], &inputs).is_err());

        let single = Table::from_rows(&[vec![1.0]]).unwrap();
        assert!(DataValidator::validate_training(&[1.0], &single).is_err());

        let empty = Table::new(3, 0, vec![]).unwrap();
        assert!(DataValidator::validate_training(&[1.0, 2.0, 3.0], &empty).is_err());
    }

    #[test]
    fn test_scoring_checks_width_and_values() {
        let inputs = Table::from_rows(&[vec![1.0, 2.0], vec![3.0, f64::INFINITY]]).unwrap();
        assert!(matches!(
            DataValidator::validate_scoring(&inputs, 3),
            Err(GepError::Validation(_))
        ));
        assert!(matches!(
            DataValidator::validate_scoring(&inputs, 2),
            Err(GepError::Validation(_))
        ));
    }

    #[test]
    fn test_non_numeric_column() {
        let df = df! {
            "x" => &[1.0, 2.0],
            "label" => &["a", "b"],
        }
        .unwrap();
        assert!(DataValidator::validate_numeric(&df).is_err());
    }

    #[test]
    fn test_null_report() {
        let df = df! {
            "x" => &[Some(1.0), None, Some(3.0)],
            "y" => &[1.0, 2.0, 3.0],
        }
        .unwrap();
        let report = DataValidator::check_nulls(&df).unwrap();
        assert_eq!(report, vec![("x".to_string(), 1)]);
    }
}
