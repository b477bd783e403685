pub mod ast;
pub mod operators;
pub mod hall_of_fame;
pub mod evolution_engine;
pub mod progress;
pub mod gene_consumer;
pub mod genome;
pub mod population;

pub use genome::{random_gene, Chromosome, Gene};
pub use ast::{render_model, ExpressionTree, Node};
pub use hall_of_fame::{EliteModel, HallOfFame};
pub use evolution_engine::{EvolutionEngine, ProgressCallback, RoundSummary, RunOutcome, StopReason};
pub use population::{Individual, Population};
pub use progress::{LogProgressCallback, SilentProgressCallback};
