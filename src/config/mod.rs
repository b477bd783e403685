pub mod data;
pub mod manager;
pub mod traits;
pub mod training;

pub use data::DataConfig;
pub use manager::{AppConfig, ConfigManager};
pub use traits::ConfigSection;
pub use training::{FitMethod, RunConfig};
