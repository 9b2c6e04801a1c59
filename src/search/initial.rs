use log::{debug, info};

use super::config::InitialStructure;
use crate::error::Result;
use crate::network::{DataTable, Edge, Network, VariableId};

/// Builds the network a climb starts from.
///
/// `declared` carries the variables (and, for `Declared`, the edges) read
/// from the input file.
pub fn initial_network(kind: InitialStructure, declared: &Network, data: &DataTable) -> Result<Network> {
    let network = match kind {
        InitialStructure::Empty => declared.without_edges(),
        InitialStructure::Declared => declared.clone(),
        InitialStructure::SpanningTree => spanning_tree(declared, data)?,
    };
    info!(
        "Initial structure {:?} with {} edges",
        kind,
        network.edge_count()
    );
    Ok(network)
}

/// Empirical mutual information (in nats) between two variables.
pub fn mutual_information(data: &DataTable, a: VariableId, b: VariableId) -> Result<f64> {
    let rows = data.row_count() as f64;
    let a_true = data.count_matching(&[a], &[])? as f64;
    let b_true = data.count_matching(&[b], &[])? as f64;

    let mut information = 0.0;
    for a_value in [false, true] {
        for b_value in [false, true] {
            let (trues, falses) = split(&[(a, a_value), (b, b_value)]);
            let joint = data.count_matching(&trues, &falses)? as f64;
            if joint == 0.0 {
                continue;
            }
            let a_marginal = if a_value { a_true } else { rows - a_true };
            let b_marginal = if b_value { b_true } else { rows - b_true };
            information += (joint / rows) * (joint * rows / (a_marginal * b_marginal)).ln();
        }
    }
    Ok(information)
}

fn split(assignment: &[(VariableId, bool)]) -> (Vec<VariableId>, Vec<VariableId>) {
    let mut trues = Vec::new();
    let mut falses = Vec::new();
    for &(id, value) in assignment {
        if value {
            trues.push(id);
        } else {
            falses.push(id);
        }
    }
    (trues, falses)
}

/// Chow-Liu tree: maximum mutual-information spanning tree grown from the
/// first variable with Prim's algorithm, each edge pointing away from it.
/// Ties go to the lowest variable index.
pub fn spanning_tree(declared: &Network, data: &DataTable) -> Result<Network> {
    let mut network = declared.without_edges();
    let n = network.variable_count();
    if n < 2 {
        return Ok(network);
    }

    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = mutual_information(data, VariableId(i), VariableId(j))?;
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }

    let mut in_tree = vec![false; n];
    // Best known link into the tree for every outside vertex: (weight, from).
    let mut link: Vec<(f64, usize)> = (0..n).map(|j| (weights[0][j], 0)).collect();
    in_tree[0] = true;

    for _ in 1..n {
        let mut pick: Option<usize> = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            match pick {
                Some(p) if link[j].0 <= link[p].0 => {}
                _ => pick = Some(j),
            }
        }
        let Some(next) = pick else { break };
        let (weight, from) = link[next];
        in_tree[next] = true;
        let edge = Edge::new(VariableId(from), VariableId(next));
        network.add_edge(edge.parent, edge.child);
        debug!(
            "spanning_tree - {} (mutual information {:.6})",
            network.describe_edge(&edge),
            weight
        );

        for j in 0..n {
            if !in_tree[j] && weights[next][j] > link[j].0 {
                link[j] = (weights[next][j], next);
            }
        }
    }

    Ok(network)
}
