use super::{display_name, read_source, Extractor};
use crate::error::{EngineError, Result};
use crate::graph::VertexId;
use crate::store::GraphInstallation;
use csv::StringRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// A node list file paired with an edge list file.
#[derive(Debug, Clone, Deserialize)]
pub struct DelimitedSource {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    #[serde(default)]
    pub directed: bool,
}

impl Extractor for DelimitedSource {
    fn extract(&self) -> Result<GraphInstallation> {
        let nodes = read_source(&self.nodes)?;
        let index = parse_nodes(&nodes, &display_name(&self.nodes))?;

        let edges = read_source(&self.edges)?;
        let edge_list = parse_edges(&edges, &display_name(&self.edges), &index)?;

        Ok(GraphInstallation::named(
            index.names,
            edge_list.edges,
            edge_list.weights,
            self.directed,
        ))
    }
}

/// Distinct node names in first-seen order.
#[derive(Debug, Default)]
pub struct NodeIndex {
    pub names: Vec<String>,
    ids: HashMap<String, VertexId>,
}

impl NodeIndex {
    /// Returns the existing ID for a repeated name.
    pub fn insert(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len() as VertexId;
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    pub fn get(&self, name: &str) -> Option<VertexId> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug)]
pub struct EdgeList {
    pub edges: Vec<(VertexId, VertexId)>,
    pub weights: Option<Vec<f64>>,
}

/// Lines are split on commas only; quote characters are part of the name.
fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes())
}

/// Fields of one line, with the line itself trimmed at both ends.
fn line_fields(record: &StringRecord) -> Vec<String> {
    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
    if let Some(first) = fields.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(last) = fields.last_mut() {
        *last = last.trim_end().to_string();
    }
    fields
}

fn is_blank(fields: &[String]) -> bool {
    fields.iter().all(|f| f.is_empty())
}

fn read_error(origin: &str, err: csv::Error) -> EngineError {
    EngineError::format(format!("Could not read {origin}: {err}"))
}

/// Node file: a `nodes`/`Nodes` header line, then one name per line taken
/// from the first field.
pub fn parse_nodes(content: &str, origin: &str) -> Result<NodeIndex> {
    let mut rdr = reader(content);
    let mut records = rdr.records();

    let header = loop {
        match records.next() {
            Some(record) => {
                let fields = line_fields(&record.map_err(|e| read_error(origin, e))?);
                if !is_blank(&fields) {
                    break fields;
                }
            }
            None => {
                return Err(EngineError::format(format!(
                    "Could not read the Nodes CSV header in {origin}"
                )))
            }
        }
    };
    if header.len() != 1 || (header[0] != "nodes" && header[0] != "Nodes") {
        return Err(EngineError::format(format!(
            "Incorrect header in nodes file {origin}: expected `nodes`"
        )));
    }

    let mut index = NodeIndex::default();
    for record in records {
        let fields = line_fields(&record.map_err(|e| read_error(origin, e))?);
        let name = fields.first().map(|f| f.trim()).unwrap_or("");
        if name.is_empty() {
            continue;
        }
        index.insert(name);
    }

    if index.is_empty() {
        return Err(EngineError::validation(format!(
            "No nodes found in the file {origin}"
        )));
    }
    Ok(index)
}

/// Edge file: a `source,target[,weight]` header, then one edge per line whose
/// endpoints must name known nodes. A `weight` header column makes the whole
/// graph weighted; a missing cell then defaults to 1.
pub fn parse_edges(content: &str, origin: &str, nodes: &NodeIndex) -> Result<EdgeList> {
    let mut rdr = reader(content);
    let mut records = rdr.records();

    let header = match records.next() {
        Some(record) => line_fields(&record.map_err(|e| read_error(origin, e))?),
        None => {
            return Err(EngineError::format(format!(
                "Could not read the Edges CSV headers in {origin}"
            )))
        }
    };
    if header.len() < 2 || header[0] != "source" || header[1] != "target" {
        return Err(EngineError::format(format!(
            "Incorrect header in edges file {origin}: expected `source,target`"
        )));
    }
    let weighted = header.get(2).is_some_and(|f| f == "weight");

    let mut edges = Vec::new();
    let mut weights = Vec::new();
    for record in records {
        let fields = line_fields(&record.map_err(|e| read_error(origin, e))?);
        if fields.len() < 2 {
            continue;
        }
        let (src, tar) = (fields[0].trim(), fields[1].trim());
        let (Some(from), Some(to)) = (nodes.get(src), nodes.get(tar)) else {
            return Err(EngineError::validation(format!(
                "Invalid node in edge: {src} -> {tar}"
            )));
        };
        edges.push((from, to));

        if weighted {
            let weight = match fields.get(2).map(|f| f.trim()) {
                None | Some("") => 1.0,
                Some(raw) => raw.parse::<f64>().map_err(|_| {
                    EngineError::validation(format!(
                        "Invalid weight in edge: {src} -> {tar} ({raw:?})"
                    ))
                })?,
            };
            weights.push(weight);
        }
    }

    Ok(EdgeList {
        edges,
        weights: weighted.then_some(weights),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abc() -> NodeIndex {
        parse_nodes("nodes\nA\nB\nC\n", "nodes.csv").unwrap()
    }

    #[rstest]
    #[case("nodes\nA\n")]
    #[case("Nodes\nA\n")]
    #[case("  nodes  \nA\n")]
    #[case("\n\nnodes\nA\n")]
    fn accepted_node_headers(#[case] content: &str) {
        assert_eq!(parse_nodes(content, "n.csv").unwrap().len(), 1);
    }

    #[rstest]
    #[case("Node\nA\n")]
    #[case("NODES\nA\n")]
    #[case("nodes,extra\nA\n")]
    #[case("")]
    fn rejected_node_headers(#[case] content: &str) {
        let err = parse_nodes(content, "n.csv").unwrap_err();
        assert!(matches!(err, EngineError::Format(_)), "{err}");
    }

    #[test]
    fn duplicate_names_keep_first_id() {
        let index = parse_nodes("nodes\nA\nB,ignored\n  A  \nC\n\n", "n.csv").unwrap();
        assert_eq!(index.names, vec!["A", "B", "C"]);
        assert_eq!(index.get("C"), Some(2));
    }

    #[rstest]
    #[case("nodes\n\"Bob\nAlice\nCarol\n", &["\"Bob", "Alice", "Carol"])]
    #[case("nodes\n\"Bob\"\nAlice\n", &["\"Bob\"", "Alice"])]
    #[case("nodes\nO'Hara,\"x\nY\n", &["O'Hara", "Y"])]
    fn quotes_are_literal_name_characters(#[case] content: &str, #[case] expected: &[&str]) {
        let index = parse_nodes(content, "n.csv").unwrap();
        assert_eq!(index.names, expected);
    }

    #[test]
    fn header_only_node_file_has_no_nodes() {
        let err = parse_nodes("nodes\n\n", "n.csv").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn unweighted_edges() {
        let list = parse_edges("source,target\nA,B\nB,C\n", "e.csv", &abc()).unwrap();
        assert_eq!(list.edges, vec![(0, 1), (1, 2)]);
        assert!(list.weights.is_none());
    }

    #[test]
    fn weight_header_switches_on_weights() {
        let list =
            parse_edges("source,target,weight\nA,B,2.5\nB,C\nC,A,\n", "e.csv", &abc()).unwrap();
        assert_eq!(list.weights, Some(vec![2.5, 1.0, 1.0]));
    }

    #[test]
    fn non_numeric_weight_is_rejected() {
        let err = parse_edges("source,target,weight\nA,B,heavy\n", "e.csv", &abc()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("A -> B"));
    }

    #[test]
    fn unknown_endpoint_names_the_edge() {
        let err = parse_edges("source,target\nA,Z\n", "e.csv", &abc()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid node in edge: A -> Z");
    }

    #[rstest]
    #[case("from,to\nA,B\n")]
    #[case("source\nA\n")]
    #[case("target,source\nA,B\n")]
    #[case("")]
    fn rejected_edge_headers(#[case] content: &str) {
        let err = parse_edges(content, "e.csv", &abc()).unwrap_err();
        assert!(matches!(err, EngineError::Format(_)));
    }

    #[rstest]
    #[case("source,target\n\"Bob,Alice\n", vec![(0, 1)])]
    #[case("source,target\nAlice,\"Bob\nCarol,Alice\n", vec![(1, 0), (2, 1)])]
    fn quoted_endpoints_match_quoted_names(
        #[case] content: &str,
        #[case] expected: Vec<(VertexId, VertexId)>,
    ) {
        let nodes = parse_nodes("nodes\n\"Bob\nAlice\nCarol\n", "n.csv").unwrap();
        let list = parse_edges(content, "e.csv", &nodes).unwrap();
        assert_eq!(list.edges, expected);
    }

    #[test]
    fn short_rows_are_skipped() {
        let list = parse_edges("source,target\nA\nA,B\n", "e.csv", &abc()).unwrap();
        assert_eq!(list.edges, vec![(0, 1)]);
    }
}
