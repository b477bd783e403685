pub mod fitness;
pub mod linear;
pub mod workers;

pub use fitness::{Evaluation, FitnessEvaluator};
pub use linear::{fit_least_squares, LinearFit};
pub use workers::WorkerPool;
