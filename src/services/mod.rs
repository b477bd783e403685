pub mod data_loader;
pub mod trainer;

pub use data_loader::DataLoader;
pub use trainer::{score, train, train_with_callback, ModelSummary, TrainReport};
