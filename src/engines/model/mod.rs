pub mod scorer;
pub mod store;

pub use scorer::{predict, Scorer};
pub use store::{ModelStore, PersistedModel, FORMAT_VERSION};
