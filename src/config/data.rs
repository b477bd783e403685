use super::traits::ConfigSection;
use crate::error::GepError;
use serde::{Deserialize, Serialize};

/// How tabular input files are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Column holding the response when training.
    pub response_column: String,
    pub has_header: bool,
    /// Single-byte field separator.
    pub separator: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            response_column: "y".to_string(),
            has_header: true,
            separator: ",".to_string(),
        }
    }
}

impl DataConfig {
    pub fn separator_byte(&self) -> u8 {
        self.separator.as_bytes().first().copied().unwrap_or(b',')
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), GepError> {
        if self.response_column.trim().is_empty() {
            return Err(GepError::Configuration(
                "response_column must not be empty".to_string(),
            ));
        }
        if self.separator.len() != 1 {
            return Err(GepError::Configuration(format!(
                "separator must be a single byte, got '{}'",
                self.separator
            )));
        }
        Ok(())
    }
}
