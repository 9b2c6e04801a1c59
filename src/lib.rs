#[macro_use]
pub mod common;
pub mod error;
pub mod inference;
pub mod io;
pub mod network;
pub mod search;

pub use colored;

pub use error::{NetworkError, Result};
pub use inference::{CptEstimator, LikelihoodScorer, Penalty};
pub use network::{DataTable, Edge, Network, Variable, VariableId, VariableRegistry};
pub use search::{HillClimber, SearchConfig, SearchOutcome};
