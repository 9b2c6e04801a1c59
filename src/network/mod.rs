//! Variables, observations, and the directed structure over them.
pub mod data;
pub mod graph;
pub mod variable;

pub use data::DataTable;
pub use graph::{Edge, Network};
pub use variable::{Variable, VariableId, VariableRegistry};
