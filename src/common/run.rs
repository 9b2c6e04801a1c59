use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use super::setup::{CommandLineOptions, Mode};
use crate::inference::{Evaluation, LikelihoodScorer};
use crate::io::{NetworkReport, Trailer, read_network, write_cpt_file};
use crate::network::Network;
use crate::search::{HillClimber, SearchOutcome};

/// What a run produced, for the caller to report.
#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub network: Network,
    pub evaluation: Option<Evaluation>,
    pub outcome: Option<SearchOutcome>,
}

/// Reads the dataset, runs the selected mode, and writes its output file.
pub fn run_mode(options: &CommandLineOptions) -> Result<RunSummary> {
    let input = options.input_path();
    let loaded = read_network(&input).with_context(|| format!("reading dataset '{}'", options.dataset))?;
    let output_path = options.output_path();

    let (network, evaluation, outcome) = match options.mode {
        Mode::Cpt => (loaded.network, None, None),
        Mode::Likelihood => {
            let scorer = LikelihoodScorer::new(&loaded.data, options.search.penalty);
            let evaluation = scorer
                .evaluate(&loaded.network)
                .context("scoring the declared structure")?;
            info!(
                "Declared structure: log-likelihood {:.6}, score {:.6}",
                evaluation.log_likelihood, evaluation.score
            );
            (loaded.network, Some(evaluation), None)
        }
        Mode::Search => {
            let climber = HillClimber::new(&loaded.data, options.search.clone())?;
            let outcome = climber
                .search(&loaded.network)
                .context("searching for a structure")?;
            (outcome.network.clone(), Some(outcome.evaluation), Some(outcome))
        }
    };

    let trailer = evaluation.map(Trailer::from).unwrap_or_default();
    write_cpt_file(&output_path, &network, &loaded.data, &trailer)
        .with_context(|| format!("writing {}", output_path.display()))?;

    if options.json_report {
        let scorer = LikelihoodScorer::new(&loaded.data, options.search.penalty);
        let evaluation = match evaluation {
            Some(evaluation) => evaluation,
            None => scorer.evaluate(&network)?,
        };
        NetworkReport::build(&options.dataset, &network, &loaded.data, evaluation, outcome.as_ref())?
            .save_to_file(options.report_path())?;
    }

    Ok(RunSummary {
        output_path,
        network,
        evaluation,
        outcome,
    })
}
