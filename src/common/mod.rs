#[macro_use]
pub mod logging;
pub mod run;
pub mod setup;

pub use run::{RunSummary, run_mode};
pub use setup::{CommandLineOptions, Mode, init_logging, parse_configuration_options};
