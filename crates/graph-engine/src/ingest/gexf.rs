use super::{display_name, read_source, Extractor};
use crate::error::{EngineError, Result};
use crate::graph::VertexId;
use crate::store::GraphInstallation;
use roxmltree::{Document, Node};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// GEXF document. Node IDs and labels must both be unique.
#[derive(Debug, Clone, Deserialize)]
pub struct GexfSource {
    pub path: PathBuf,
}

impl Extractor for GexfSource {
    fn extract(&self) -> Result<GraphInstallation> {
        let content = read_source(&self.path)?;
        parse_document(&content, &display_name(&self.path))
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: Option<Node<'a, 'input>>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.into_iter()
        .flat_map(|n| n.children())
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

pub fn parse_document(content: &str, origin: &str) -> Result<GraphInstallation> {
    let doc = Document::parse(content)
        .map_err(|e| EngineError::format(format!("Error parsing GEXF file {origin}: {e}")))?;

    let root = doc.root_element();
    let graph = (root.tag_name().name() == "gexf")
        .then(|| child(root, "graph"))
        .flatten()
        .ok_or_else(|| {
            EngineError::format(format!("No graph element found in GEXF file {origin}"))
        })?;
    let directed = graph.attribute("defaultedgetype") == Some("directed");

    let mut ids: HashMap<&str, VertexId> = HashMap::new();
    let mut seen_labels: HashSet<&str> = HashSet::new();
    let mut labels: Vec<String> = Vec::new();
    for node in children(child(graph, "nodes"), "node") {
        let id = node.attribute("id").ok_or_else(|| {
            EngineError::validation(format!("Node without an id in GEXF file {origin}"))
        })?;
        let label = node.attribute("label").filter(|l| !l.is_empty()).unwrap_or(id);

        if ids.contains_key(id) {
            return Err(EngineError::validation(format!(
                "Duplicate node id found: {id}"
            )));
        }
        if !seen_labels.insert(label) {
            return Err(EngineError::validation(format!(
                "Duplicate node label found: {label}"
            )));
        }
        ids.insert(id, labels.len() as VertexId);
        labels.push(label.to_string());
    }

    if labels.is_empty() {
        return Err(EngineError::validation(format!(
            "No nodes found in the file {origin}"
        )));
    }

    let mut edges = Vec::new();
    let mut weights = Vec::new();
    for edge in children(child(graph, "edges"), "edge") {
        let src = edge.attribute("source").unwrap_or("");
        let tar = edge.attribute("target").unwrap_or("");
        let (Some(&from), Some(&to)) = (ids.get(src), ids.get(tar)) else {
            return Err(EngineError::validation(format!(
                "Invalid node in edge: {src} -> {tar}"
            )));
        };
        edges.push((from, to));

        let weight = match edge.attribute("weight") {
            None => 1.0,
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                EngineError::validation(format!("Invalid weight in edge: {src} -> {tar}"))
            })?,
        };
        weights.push(weight);
    }

    Ok(GraphInstallation::named(
        labels,
        edges,
        Some(weights),
        directed,
    ))
}
