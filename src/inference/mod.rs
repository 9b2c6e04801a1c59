pub mod cpt;
pub mod likelihood;

pub use cpt::{ConditionalTable, CptEstimator};
pub use likelihood::{Evaluation, LikelihoodScorer, Penalty};
