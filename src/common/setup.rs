use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, ValueEnum, builder::EnumValueParser};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use crate::search::{InitialStructure, SearchConfig};
use crate::inference::Penalty;

/// Which pipeline the binary runs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Mode {
    /// Conditional probability tables for the declared structure
    Cpt,
    /// Tables plus log-likelihood and score of the declared structure
    Likelihood,
    /// Learn a structure by hill climbing
    Search,
}

impl Mode {
    pub fn output_file_name(&self, dataset: &str) -> String {
        match self {
            Mode::Cpt => format!("cpt-{}.txt", dataset),
            Mode::Likelihood => format!("likelihood-{}.txt", dataset),
            Mode::Search => format!("bn-{}.txt", dataset),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PenaltyKind {
    Constant,
    Bic,
}

/// These options define the inputs from the user.
#[derive(Clone, Debug)]
pub struct CommandLineOptions {
    pub dataset: String,
    pub mode: Mode,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub search: SearchConfig,
    pub json_report: bool,
    pub log_level: LevelFilter,
}

impl CommandLineOptions {
    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.txt", self.dataset))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.mode.output_file_name(&self.dataset))
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_path().with_extension("json")
    }
}

/// Installs env_logger with `LEVEL [file:line] message` lines. `RUST_LOG`
/// takes precedence over `level`.
pub fn init_logging(level: LevelFilter) {
    let _ = Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .try_init();
}

fn command() -> Command {
    Command::new("bayesnet-learn")
        .version("0.1.0")
        .about("Learns Bayesian network structure from boolean samples.")
        .arg(
            Arg::new("dataset")
                .value_name("DATASET")
                .help("Dataset name; reads <data-dir>/<DATASET>.txt")
                .required(true),
        )
        .arg(
            Arg::new("mode")
                .value_name("MODE")
                .value_parser(EnumValueParser::<Mode>::new())
                .help("What to compute: cpt, likelihood, or search")
                .required(true),
        )
        .arg(
            Arg::new("data_dir")
                .long("data-dir")
                .value_name("DIR")
                .default_value("data"),
        )
        .arg(
            Arg::new("output_dir")
                .long("output-dir")
                .value_name("DIR")
                .default_value("solutions"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON search configuration; flags below override it"),
        )
        .arg(
            Arg::new("max_rounds")
                .long("max-rounds")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("time_limit")
                .long("time-limit")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("penalty")
                .long("penalty")
                .value_parser(EnumValueParser::<PenaltyKind>::new()),
        )
        .arg(
            Arg::new("penalty_per_row")
                .long("penalty-per-row")
                .value_name("C")
                .value_parser(clap::value_parser!(f64))
                .help("Constant penalty per sample row"),
        )
        .arg(
            Arg::new("initial")
                .long("initial")
                .value_parser(EnumValueParser::<InitialStructure>::new()),
        )
        .arg(
            Arg::new("max_parents")
                .long("max-parents")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("restarts")
                .long("restarts")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Also write a JSON report next to the output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More logging; repeat for trace output")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parses `args` (program name first). Usage errors come back as a
/// `clap::Error` inside the `anyhow::Error`.
pub fn parse_configuration_options<I, T>(args: I) -> Result<CommandLineOptions>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;

    let mut search = match matches.get_one::<String>("config") {
        Some(path) => SearchConfig::load_from_file(path)
            .with_context(|| format!("loading search configuration from {}", path))?,
        None => SearchConfig::default(),
    };

    if let Some(rounds) = matches.get_one::<usize>("max_rounds") {
        search.max_rounds = Some(*rounds);
    }
    if let Some(secs) = matches.get_one::<f64>("time_limit") {
        search.time_limit_secs = Some(*secs);
    }
    match matches.get_one::<PenaltyKind>("penalty") {
        Some(PenaltyKind::Bic) => search.penalty = Penalty::Bic,
        Some(PenaltyKind::Constant) => search.penalty = Penalty::default(),
        None => {}
    }
    if let Some(per_row) = matches.get_one::<f64>("penalty_per_row") {
        search.penalty = Penalty::Constant { per_row: *per_row };
    }
    if let Some(initial) = matches.get_one::<InitialStructure>("initial") {
        search.initial = *initial;
    }
    if let Some(max) = matches.get_one::<usize>("max_parents") {
        search.max_parents = Some(*max);
    }
    if let Some(restarts) = matches.get_one::<usize>("restarts") {
        search.restarts = *restarts;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        search.seed = *seed;
    }
    search.validate()?;

    let log_level = if matches.get_flag("quiet") {
        LevelFilter::Error
    } else {
        match matches.get_count("verbose") {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Ok(CommandLineOptions {
        dataset: matches
            .get_one::<String>("dataset")
            .cloned()
            .unwrap_or_default(),
        mode: matches.get_one::<Mode>("mode").copied().unwrap_or(Mode::Cpt),
        data_dir: matches
            .get_one::<String>("data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
        output_dir: matches
            .get_one::<String>("output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("solutions")),
        search,
        json_report: matches.get_flag("json"),
        log_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_minimal_arguments() {
        let options = parse_configuration_options(["bayesnet-learn", "alarm", "search"]).unwrap();
        assert_eq!(options.dataset, "alarm");
        assert_eq!(options.mode, Mode::Search);
        assert_eq!(options.input_path(), PathBuf::from("data/alarm.txt"));
        assert_eq!(options.output_path(), PathBuf::from("solutions/bn-alarm.txt"));
        assert_eq!(options.report_path(), PathBuf::from("solutions/bn-alarm.json"));
        assert_eq!(options.search, SearchConfig::default());
        assert_eq!(options.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_overrides() {
        let options = parse_configuration_options([
            "bayesnet-learn",
            "small",
            "cpt",
            "--max-rounds",
            "7",
            "--penalty",
            "bic",
            "--initial",
            "spanning-tree",
            "--restarts",
            "2",
            "-vv",
        ])
        .unwrap();
        assert_eq!(options.mode, Mode::Cpt);
        assert_eq!(options.search.max_rounds, Some(7));
        assert_eq!(options.search.penalty, Penalty::Bic);
        assert_eq!(options.search.initial, InitialStructure::SpanningTree);
        assert_eq!(options.search.restarts, 2);
        assert_eq!(options.log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_usage_errors() {
        let err = parse_configuration_options(["bayesnet-learn", "only-dataset"]).unwrap_err();
        assert!(err.downcast_ref::<clap::Error>().is_some());

        let err = parse_configuration_options(["bayesnet-learn", "d", "task9"]).unwrap_err();
        assert!(err.downcast_ref::<clap::Error>().is_some());
    }

    #[test]
    fn test_invalid_time_limit() {
        let err = parse_configuration_options(["bayesnet-learn", "d", "search", "--time-limit", "-1"]);
        assert!(err.is_err());

        let err = parse_configuration_options(["bayesnet-learn", "d", "search", "--time-limit", "inf"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NetworkError>(),
            Some(NetworkError::InvalidConfig(_))
        ));
    }
}
