use crate::error::GepError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), GepError>;
}

/// Reject `value` unless it lies in `[lo, hi]`. NaN is always rejected.
pub(crate) fn check_range(name: &str, value: f64, lo: f64, hi: f64) -> Result<(), GepError> {
    if !(lo..=hi).contains(&value) {
        return Err(GepError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, lo, hi, value
        )));
    }
    Ok(())
}
