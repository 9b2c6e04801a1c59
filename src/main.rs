use bayesnet_learn::common::{init_logging, parse_configuration_options, run_mode};
use bayesnet_learn::search::StopReason;
use bayesnet_learn::{print_blue, print_green, print_red, print_yellow};
use clap::error::ErrorKind;
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let options = match parse_configuration_options(std::env::args_os()) {
        Ok(options) => options,
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<clap::Error>() {
                let _ = usage.print();
                return match usage.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                    _ => ExitCode::from(1),
                };
            }
            print_red!("error: {:#}", err);
            return ExitCode::from(1);
        }
    };
    init_logging(options.log_level);

    print_blue!("Dataset {} ({:?})", options.dataset, options.mode);
    match run_mode(&options) {
        Ok(summary) => {
            if let Some(evaluation) = summary.evaluation {
                println!("log-likelihood: {}", evaluation.log_likelihood);
                println!("score:          {}", evaluation.score);
            }
            if let Some(outcome) = &summary.outcome {
                println!(
                    "edges: {}, rounds: {}, restarts: {}",
                    outcome.network.edge_count(),
                    outcome.rounds,
                    outcome.restarts_run
                );
                if outcome.stop_reason != StopReason::Converged {
                    print_yellow!("Stopped on budget ({:?}) before converging", outcome.stop_reason);
                }
            }
            print_green!("Wrote {}", summary.output_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            print_red!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
