use log::debug;
use serde::{Deserialize, Serialize};

use super::cpt::{CptEstimator, assignment_index};
use crate::error::Result;
use crate::network::{DataTable, Network};

/// Complexity penalty subtracted from the log-likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Penalty {
    /// `per_row * rows`, independent of the structure.
    Constant { per_row: f64 },
    /// `0.5 * ln(rows) * free parameters`.
    Bic,
}

impl Default for Penalty {
    fn default() -> Self {
        Penalty::Constant { per_row: 1.0 }
    }
}

impl Penalty {
    pub fn cost(&self, network: &Network, rows: usize) -> f64 {
        match self {
            Penalty::Constant { per_row } => per_row * rows as f64,
            Penalty::Bic => 0.5 * (rows as f64).ln() * network.parameter_count() as f64,
        }
    }
}

/// Log-likelihood and penalised score of one structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub log_likelihood: f64,
    pub score: f64,
}

/// Scores structures against a fixed data table.
pub struct LikelihoodScorer<'a> {
    data: &'a DataTable,
    estimator: CptEstimator<'a>,
    penalty: Penalty,
}

impl<'a> LikelihoodScorer<'a> {
    pub fn new(data: &'a DataTable, penalty: Penalty) -> Self {
        LikelihoodScorer {
            data,
            estimator: CptEstimator::new(data),
            penalty,
        }
    }

    /// Natural log of the probability of every row under `network`.
    ///
    /// Accumulates ln P(x_v | parents(v)) per row and variable instead of
    /// multiplying raw probabilities, which would underflow. Estimates are
    /// memoised per parent assignment for the duration of this call only.
    pub fn log_likelihood(&self, network: &Network) -> Result<f64> {
        let mut total = 0.0;

        for variable in network.variables().iter() {
            let node = variable.id();
            let parents = variable.parents();
            let mut memo: Vec<Option<f64>> = vec![None; 1 << parents.len()];
            let mut assignment = vec![false; parents.len()];

            for row in self.data.rows() {
                for (slot, parent) in assignment.iter_mut().zip(parents) {
                    *slot = row[parent.index()];
                }
                let index = assignment_index(&assignment);
                let p_true = match memo[index] {
                    Some(p) => p,
                    None => {
                        let p = self.estimator.probability_true_given(network, node, &assignment)?;
                        memo[index] = Some(p);
                        p
                    }
                };
                let p_observed = if row[node.index()] { p_true } else { 1.0 - p_true };
                total += p_observed.ln();
            }
        }

        Ok(total)
    }

    /// `log_likelihood(network)` minus the configured complexity penalty.
    pub fn score(&self, network: &Network) -> Result<f64> {
        Ok(self.evaluate(network)?.score)
    }

    pub fn evaluate(&self, network: &Network) -> Result<Evaluation> {
        // Surface an empty table even for networks with no variables.
        self.data.count_matching(&[], &[])?;
        let log_likelihood = self.log_likelihood(network)?;
        let score = log_likelihood - self.penalty.cost(network, self.data.row_count());
        debug!(
            "evaluate - {} edges, log-likelihood {:.6}, score {:.6}",
            network.edge_count(),
            log_likelihood,
            score
        );
        Ok(Evaluation {
            log_likelihood,
            score,
        })
    }
}
