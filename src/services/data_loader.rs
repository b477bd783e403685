use crate::config::DataConfig;
use crate::data::CsvConnector;
use crate::error::Result;
use crate::types::{Table, TrainingSet};
use std::path::Path;

pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and split off the configured response column.
    pub fn load_training(path: &Path, config: &DataConfig) -> Result<TrainingSet> {
        let df = CsvConnector::load(path, config.has_header, config.separator_byte())?;
        CsvConnector::to_training(&df, &config.response_column)
    }

    /// Load a CSV file of inputs for scoring. A response column, if present, is dropped.
    pub fn load_inputs(path: &Path, config: &DataConfig) -> Result<Table> {
        let df = CsvConnector::load(path, config.has_header, config.separator_byte())?;
        CsvConnector::to_table(&df, Some(&config.response_column))
    }
}
