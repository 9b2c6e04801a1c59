use log::{debug, info};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{NetworkError, Result};
use crate::inference::{ConditionalTable, CptEstimator, Evaluation};
use crate::network::{DataTable, Network};
use crate::search::{SearchOutcome, StopReason};

/// Optional summary lines appended after the tables.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Trailer {
    pub log_likelihood: Option<f64>,
    pub score: Option<f64>,
}

impl From<Evaluation> for Trailer {
    fn from(evaluation: Evaluation) -> Self {
        Trailer {
            log_likelihood: Some(evaluation.log_likelihood),
            score: Some(evaluation.score),
        }
    }
}

/// Formats a value the way the original output files do: whole numbers keep
/// a trailing `.0` (`1.0`, `0.0`), everything else uses the shortest
/// round-trip form.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Renders each variable as a `name parent...` line followed by its
/// probabilities in canonical order, then the trailer values one per line.
pub fn render_cpts(network: &Network, data: &DataTable, trailer: &Trailer) -> Result<String> {
    let estimator = CptEstimator::new(data);
    let mut out = String::new();

    for table in estimator.all_tables(network)? {
        debug!("render_cpts - {} with parents {:?}", table.variable, table.parents);
        let mut header = table.variable.clone();
        for parent in &table.parents {
            header.push(' ');
            header.push_str(parent);
        }
        let probabilities: Vec<String> = table.probabilities.iter().map(|p| format_value(*p)).collect();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", header);
        let _ = writeln!(out, "{}", probabilities.join(" "));
    }

    if let Some(log_likelihood) = trailer.log_likelihood {
        let _ = writeln!(out, "{}", format_value(log_likelihood));
    }
    if let Some(score) = trailer.score {
        let _ = writeln!(out, "{}", format_value(score));
    }
    Ok(out)
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| NetworkError::io(dir, e))?;
        }
    }
    fs::write(path, text).map_err(|e| NetworkError::io(path, e))
}

pub fn write_cpt_file(
    path: impl AsRef<Path>,
    network: &Network,
    data: &DataTable,
    trailer: &Trailer,
) -> Result<()> {
    let path = path.as_ref();
    let text = render_cpts(network, data, trailer)?;
    write_text(path, &text)?;
    info!("Wrote {} variables to {}", network.variable_count(), path.display());
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub rounds: usize,
    pub restarts_run: usize,
    pub stop_reason: StopReason,
}

/// Machine-readable description of a network and its fit to the data.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    pub dataset: String,
    pub variables: Vec<ConditionalTable>,
    pub edges: Vec<(String, String)>,
    pub log_likelihood: f64,
    pub score: f64,
    pub search: Option<SearchSummary>,
}

impl NetworkReport {
    pub fn build(
        dataset: &str,
        network: &Network,
        data: &DataTable,
        evaluation: Evaluation,
        outcome: Option<&SearchOutcome>,
    ) -> Result<Self> {
        let registry = network.variables();
        Ok(NetworkReport {
            dataset: dataset.to_string(),
            variables: CptEstimator::new(data).all_tables(network)?,
            edges: network
                .edges()
                .iter()
                .map(|e| (registry.name(e.parent).to_string(), registry.name(e.child).to_string()))
                .collect(),
            log_likelihood: evaluation.log_likelihood,
            score: evaluation.score,
            search: outcome.map(|o| SearchSummary {
                rounds: o.rounds,
                restarts_run: o.restarts_run,
                stop_reason: o.stop_reason,
            }),
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        write_text(path, &json)?;
        info!("Wrote report to {}", path.display());
        Ok(())
    }
}
