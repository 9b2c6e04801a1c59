use log::trace;
use serde::Serialize;

use crate::error::Result;
use crate::network::{DataTable, Network, VariableId};

/// Conditional probability table for one variable, materialised in
/// canonical order (first parent is the most significant bit, false before
/// true).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalTable {
    pub variable: String,
    pub parents: Vec<String>,
    pub probabilities: Vec<f64>,
}

/// Position of a parent assignment in the canonical enumeration order.
pub fn assignment_index(assignment: &[bool]) -> usize {
    assignment
        .iter()
        .fold(0, |acc, &value| (acc << 1) | usize::from(value))
}

/// Estimates P(variable = true | parent assignment) from frequency counts.
pub struct CptEstimator<'a> {
    data: &'a DataTable,
}

impl<'a> CptEstimator<'a> {
    pub fn new(data: &'a DataTable) -> Self {
        CptEstimator { data }
    }

    /// P(`node` = true) given that every variable in `trues` is true and
    /// every variable in `falses` is false.
    ///
    /// When no row matches the condition the estimate falls back to
    /// (0 + 1) / (0 + 2) = 0.5, one pseudo-count per outcome. Conditions that
    /// do occur are not smoothed.
    pub fn probability_given(
        &self,
        node: VariableId,
        trues: &[VariableId],
        falses: &[VariableId],
    ) -> Result<f64> {
        let mut denominator = self.data.count_matching(trues, falses)?;

        let mut with_node = Vec::with_capacity(trues.len() + 1);
        with_node.extend_from_slice(trues);
        with_node.push(node);
        let mut numerator = self.data.count_matching(&with_node, falses)?;

        if denominator == 0 {
            numerator += 1;
            denominator += 2;
        }
        Ok(numerator as f64 / denominator as f64)
    }

    /// P(`node` = true | parents = `assignment`), where `assignment[i]` is the
    /// value of the i-th parent of `node` in `network`.
    pub fn probability_true_given(
        &self,
        network: &Network,
        node: VariableId,
        assignment: &[bool],
    ) -> Result<f64> {
        let parents = network.parents_of(node);
        debug_assert_eq!(parents.len(), assignment.len());

        let mut trues = Vec::new();
        let mut falses = Vec::new();
        for (parent, value) in parents.iter().zip(assignment) {
            if *value {
                trues.push(*parent);
            } else {
                falses.push(*parent);
            }
        }
        self.probability_given(node, &trues, &falses)
    }

    /// P(`node` = true) for each of the 2^k assignments of its k parents,
    /// in canonical order.
    pub fn enumerate_all_probabilities(&self, network: &Network, node: VariableId) -> Result<Vec<f64>> {
        let parents = network.parents_of(node);
        let mut probabilities = Vec::with_capacity(1 << parents.len());
        let mut trues = Vec::new();
        let mut falses = Vec::new();
        self.enumerate(node, parents, &mut trues, &mut falses, &mut probabilities)?;
        trace!(
            "enumerate_all_probabilities - {} -> {:?}",
            network.variable(node).name(),
            probabilities
        );
        Ok(probabilities)
    }

    // Splits on the next unassigned parent: false branch first, then true.
    fn enumerate(
        &self,
        node: VariableId,
        remaining: &[VariableId],
        trues: &mut Vec<VariableId>,
        falses: &mut Vec<VariableId>,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        let Some((&next, rest)) = remaining.split_first() else {
            out.push(self.probability_given(node, trues, falses)?);
            return Ok(());
        };

        falses.push(next);
        self.enumerate(node, rest, trues, falses, out)?;
        falses.pop();

        trues.push(next);
        self.enumerate(node, rest, trues, falses, out)?;
        trues.pop();
        Ok(())
    }

    pub fn conditional_table(&self, network: &Network, node: VariableId) -> Result<ConditionalTable> {
        let registry = network.variables();
        Ok(ConditionalTable {
            variable: registry.name(node).to_string(),
            parents: network
                .parents_of(node)
                .iter()
                .map(|p| registry.name(*p).to_string())
                .collect(),
            probabilities: self.enumerate_all_probabilities(network, node)?,
        })
    }

    /// Tables for every variable in column order.
    pub fn all_tables(&self, network: &Network) -> Result<Vec<ConditionalTable>> {
        network
            .variables()
            .ids()
            .map(|id| self.conditional_table(network, id))
            .collect()
    }
}
