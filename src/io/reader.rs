use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::error::{NetworkError, Result};
use crate::network::{DataTable, Network, VariableRegistry};

/// Variables, declared structure, and observations read from one input file.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    pub network: Network,
    pub data: DataTable,
}

/// How variable names are declared after the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationLayout {
    /// One line per variable: `name parent...`.
    PerVariable,
    /// A single line listing every variable name, no parents.
    SingleLine,
}

pub fn read_network(path: impl AsRef<Path>) -> Result<LoadedNetwork> {
    let path = path.as_ref();
    info!("Loading network from {}", path.display());
    let text = fs::read_to_string(path).map_err(|e| NetworkError::io(path, e))?;
    let loaded = parse_network(&text)?;
    info!(
        "Loaded {} variables, {} declared edges, {} samples",
        loaded.network.variable_count(),
        loaded.network.edge_count(),
        loaded.data.row_count()
    );
    Ok(loaded)
}

fn is_data_row(tokens: &[&str], columns: usize) -> bool {
    tokens.len() == columns && tokens.iter().all(|t| *t == "0" || *t == "1")
}

fn parse_count(token: Option<&str>, line: usize, what: &str) -> Result<usize> {
    let token = token.ok_or_else(|| NetworkError::malformed(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| NetworkError::malformed(line, format!("{} must be a non-negative integer, got '{}'", what, token)))
}

/// Parses the text format: a `numNodes numData` header, the variable
/// declarations, then `numData` rows of `numNodes` 0/1 values. Blank lines
/// are ignored.
pub fn parse_network(text: &str) -> Result<LoadedNetwork> {
    let lines: Vec<(usize, Vec<&str>)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, tokens)| !tokens.is_empty())
        .collect();
    let mut cursor = lines.iter();

    let Some((header_line, header)) = cursor.next() else {
        return Err(NetworkError::malformed(1, "empty input"));
    };
    if header.len() != 2 {
        return Err(NetworkError::malformed(
            *header_line,
            format!("header needs 2 values, found {}", header.len()),
        ));
    }
    let num_nodes = parse_count(header.first().copied(), *header_line, "numNodes")?;
    let num_data = parse_count(header.get(1).copied(), *header_line, "numData")?;

    let rest: Vec<&(usize, Vec<&str>)> = cursor.collect();
    let layout = detect_layout(&rest, num_nodes);
    let declaration_lines = match layout {
        DeclarationLayout::SingleLine => 1,
        DeclarationLayout::PerVariable => num_nodes,
    };
    if rest.len() < declaration_lines {
        let line = rest.last().map(|(l, _)| *l).unwrap_or(*header_line);
        return Err(NetworkError::malformed(
            line,
            format!("expected {} variable declarations", num_nodes),
        ));
    }
    let (declarations, samples) = rest.split_at(declaration_lines);

    let network = match layout {
        DeclarationLayout::SingleLine => {
            let (line, names) = declarations[0];
            if names.len() != num_nodes {
                return Err(NetworkError::malformed(
                    *line,
                    format!("expected {} variable names, found {}", num_nodes, names.len()),
                ));
            }
            Network::new(VariableRegistry::from_names(names.iter().copied())?)
        }
        DeclarationLayout::PerVariable => parse_declarations(declarations)?,
    };

    if samples.len() < num_data {
        let line = samples.last().map(|(l, _)| *l).unwrap_or(0);
        return Err(NetworkError::malformed(
            line,
            format!("expected {} sample rows, found {}", num_data, samples.len()),
        ));
    }
    if samples.len() > num_data {
        warn!("Ignoring {} lines after the declared sample rows", samples.len() - num_data);
    }

    let mut rows = Vec::with_capacity(num_data);
    for (line, tokens) in samples.iter().take(num_data) {
        if tokens.len() != num_nodes {
            return Err(NetworkError::malformed(
                *line,
                format!("sample row has {} values, expected {}", tokens.len(), num_nodes),
            ));
        }
        let row = tokens
            .iter()
            .map(|t| match *t {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(NetworkError::malformed(*line, format!("sample value must be 0 or 1, got '{}'", other))),
            })
            .collect::<Result<Vec<bool>>>()?;
        rows.push(row);
    }

    let data = DataTable::from_rows(rows, num_nodes)?;
    Ok(LoadedNetwork { network, data })
}

fn detect_layout(rest: &[&(usize, Vec<&str>)], num_nodes: usize) -> DeclarationLayout {
    let Some((_, first)) = rest.first() else {
        return DeclarationLayout::PerVariable;
    };
    if num_nodes < 2 || first.len() != num_nodes {
        return DeclarationLayout::PerVariable;
    }
    match rest.get(1) {
        Some((_, next)) if is_data_row(next, num_nodes) => DeclarationLayout::SingleLine,
        Some(_) => DeclarationLayout::PerVariable,
        None => DeclarationLayout::SingleLine,
    }
}

fn parse_declarations(declarations: &[&(usize, Vec<&str>)]) -> Result<Network> {
    // Names first, so parents may refer to variables declared later.
    let registry = VariableRegistry::from_names(declarations.iter().map(|(_, tokens)| tokens[0]))?;
    let mut network = Network::new(registry);

    for (line, tokens) in declarations {
        let child = network.variables().require(tokens[0])?;
        for parent_name in &tokens[1..] {
            let parent = network.variables().require(parent_name)?;
            if !network.add_edge(parent, child) {
                return Err(NetworkError::malformed(
                    *line,
                    format!("parent '{}' of '{}' repeats or closes a two-way edge", parent_name, tokens[0]),
                ));
            }
        }
    }

    if !network.is_acyclic() {
        let line = declarations.last().map(|(l, _)| *l).unwrap_or(0);
        return Err(NetworkError::malformed(line, "declared structure contains a cycle"));
    }
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::VariableId;

    #[test]
    fn test_per_variable_layout() {
        let text = "3 2\nA\nB A\nC A B\n1 0 1\n0 0 0\n";
        let loaded = parse_network(text).unwrap();
        let net = &loaded.network;
        assert_eq!(net.variable_count(), 3);
        assert_eq!(net.parents_of(VariableId(2)), &[VariableId(0), VariableId(1)]);
        assert_eq!(net.edge_count(), 3);
        assert_eq!(loaded.data.row_count(), 2);
        assert!(loaded.data.row(0)[0]);
        assert!(!loaded.data.row(0)[1]);
    }

    #[test]
    fn test_single_line_layout() {
        let text = "3 2\nX Y Z\n1 1 0\n0 1 1\n";
        let loaded = parse_network(text).unwrap();
        assert_eq!(loaded.network.variable_count(), 3);
        assert_eq!(loaded.network.edge_count(), 0);
        assert_eq!(loaded.network.variables().id_of("Z"), Some(VariableId(2)));
        assert_eq!(loaded.data.row_count(), 2);
    }

    #[test]
    fn test_forward_parent_reference() {
        let text = "2 1\nA B\nB\n1 1\n";
        let loaded = parse_network(text).unwrap();
        assert_eq!(loaded.network.parents_of(VariableId(0)), &[VariableId(1)]);
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(
            parse_network("3\nA\n"),
            Err(NetworkError::MalformedInput { line: 1, .. })
        ));
        assert!(matches!(
            parse_network("x 2\n"),
            Err(NetworkError::MalformedInput { line: 1, .. })
        ));
        assert!(parse_network("").is_err());
    }

    #[test]
    fn test_bad_sample_value() {
        let err = parse_network("2 1\nA\nB\n1 2\n").unwrap_err();
        assert!(matches!(err, NetworkError::MalformedInput { line: 4, .. }));
    }

    #[test]
    fn test_short_and_missing_rows() {
        assert!(parse_network("2 1\nA\nB\n1\n").is_err());
        assert!(parse_network("2 2\nA\nB\n1 0\n").is_err());
    }

    #[test]
    fn test_unknown_parent() {
        let err = parse_network("2 1\nA Q\nB\n1 0\n").unwrap_err();
        assert!(matches!(err, NetworkError::UnknownVariable(name) if name == "Q"));
    }

    #[test]
    fn test_declared_cycle_rejected() {
        let err = parse_network("3 1\nA C\nB A\nC B\n1 0 1\n").unwrap_err();
        assert!(matches!(err, NetworkError::MalformedInput { .. }));
    }

    #[test]
    fn test_zero_rows_is_loadable() {
        let loaded = parse_network("2 0\nA\nB\n").unwrap();
        assert_eq!(loaded.data.row_count(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = read_network("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, NetworkError::Io { .. }));
    }
}
