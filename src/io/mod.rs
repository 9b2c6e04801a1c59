//! Text file input and output.
pub mod reader;
pub mod writer;

pub use reader::{LoadedNetwork, parse_network, read_network};
pub use writer::{NetworkReport, Trailer, format_value, render_cpts, write_cpt_file};
