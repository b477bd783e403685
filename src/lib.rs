pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod services;
pub mod types;

pub use error::{GepError, Result};
pub use services::{score, train, train_with_callback, TrainReport};
pub use types::{Table, TrainingSet};
