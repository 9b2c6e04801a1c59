//! Hill-climbing structure search.
pub mod config;
pub mod hill_climb;
pub mod initial;

pub use config::{InitialStructure, SearchConfig};
pub use hill_climb::{Candidate, HillClimber, Move, SCORE_TOLERANCE, SearchOutcome, StopReason};
pub use initial::{initial_network, mutual_information, spanning_tree};
