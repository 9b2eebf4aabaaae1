use super::{display_name, read_source, Extractor};
use crate::attributes::{AttributeTable, Value};
use crate::error::{EngineError, Result};
use crate::gml::{self, GmlError, GmlGraph};
use crate::graph::VertexId;
use crate::store::GraphInstallation;
use serde::Deserialize;
use std::path::PathBuf;

/// GML document, copied over verbatim: scalar node attributes become vertex
/// columns and scalar edge attributes become edge columns.
#[derive(Debug, Clone, Deserialize)]
pub struct GmlSource {
    pub path: PathBuf,
}

impl Extractor for GmlSource {
    fn extract(&self) -> Result<GraphInstallation> {
        let content = read_source(&self.path)?;
        parse_document(&content, &display_name(&self.path))
    }
}

pub fn parse_document(content: &str, origin: &str) -> Result<GraphInstallation> {
    let graph = gml::read_graph(content).map_err(|err| match err {
        GmlError::Syntax { .. } => EngineError::format(format!("{origin}: {err}")),
        GmlError::Structure(_) => EngineError::validation(format!("{origin}: {err}")),
    })?;
    install(graph, origin)
}

fn install(graph: GmlGraph, origin: &str) -> Result<GraphInstallation> {
    if graph.nodes.is_empty() {
        return Err(EngineError::validation(format!(
            "No nodes found in the file {origin}"
        )));
    }

    let mut vertex_attributes = AttributeTable::new(graph.nodes.len());
    for (index, node) in graph.nodes.iter().enumerate() {
        for (key, value) in &node.attributes {
            vertex_attributes.set(key, index, value.clone())?;
        }
    }

    let edges: Vec<(VertexId, VertexId)> = graph
        .edges
        .iter()
        .map(|e| (e.source as VertexId, e.target as VertexId))
        .collect();

    // Weights only when the reader found a numeric weight on every edge.
    let weights: Option<Vec<f64>> = if graph.edges.is_empty() {
        None
    } else {
        graph
            .edges
            .iter()
            .map(|e| {
                e.attributes.iter().find_map(|(k, v)| match v {
                    Value::Numeric(w) if k == "weight" => Some(*w),
                    _ => None,
                })
            })
            .collect()
    };

    let mut edge_attributes = AttributeTable::new(graph.edges.len());
    for (index, edge) in graph.edges.iter().enumerate() {
        for (key, value) in edge.attributes.iter().filter(|(k, _)| k != "weight") {
            edge_attributes.set(key, index, value.clone())?;
        }
    }

    let mut installation = GraphInstallation::anonymous(
        graph.nodes.len() as u32,
        edges,
        weights,
        graph.directed,
    );
    installation.vertex_attributes = vertex_attributes;
    installation.edge_attributes = edge_attributes;
    Ok(installation)
}
