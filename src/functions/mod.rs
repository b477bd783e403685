pub mod primitives;
pub mod registry;

pub use primitives::Operator;
pub use registry::{Symbol, SymbolTable};
