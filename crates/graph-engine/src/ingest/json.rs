use super::delimited::NodeIndex;
use super::{display_name, read_source, Extractor};
use crate::error::{EngineError, Result};
use crate::store::GraphInstallation;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// A JSON document `{ "nodes": [...], "edges": [...], "directed": bool }`.
/// `vertices` and `links` are accepted as alternative keys.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonSource {
    pub path: PathBuf,
}

impl Extractor for JsonSource {
    fn extract(&self) -> Result<GraphInstallation> {
        let content = read_source(&self.path)?;
        parse_document(&content, &display_name(&self.path))
    }
}

fn member<'a>(root: &'a Map<String, Value>, key: &str, fallback: &str) -> Option<&'a Value> {
    root.get(key).or_else(|| root.get(fallback))
}

fn endpoint<'a>(edge: &'a Map<String, Value>, key: &str, position: usize) -> Result<&'a str> {
    edge.get(key).and_then(Value::as_str).ok_or_else(|| {
        EngineError::validation(format!(
            "Missing source or target in edge {position}: `{key}` must be a string"
        ))
    })
}

pub fn parse_document(content: &str, origin: &str) -> Result<GraphInstallation> {
    let doc: Value = serde_json::from_str(content)
        .map_err(|e| EngineError::format(format!("Error parsing JSON file {origin}: {e}")))?;

    let root = doc.as_object().ok_or_else(|| {
        EngineError::validation(format!("The root of {origin} must be a JSON object"))
    })?;

    let nodes = member(root, "nodes", "vertices")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EngineError::validation(format!(
                "Invalid nodes format in {origin}: expected an array under `nodes` or `vertices`"
            ))
        })?;
    let edges = member(root, "edges", "links")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EngineError::validation(format!(
                "Invalid edges format in {origin}: expected an array under `edges` or `links`"
            ))
        })?;
    let directed = root
        .get("directed")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            EngineError::validation(format!(
                "Invalid directed format in {origin}: expected a boolean `directed`"
            ))
        })?;

    let mut index = NodeIndex::default();
    // Non-string entries are skipped.
    for name in nodes.iter().filter_map(Value::as_str) {
        index.insert(name);
    }
    if index.is_empty() {
        return Err(EngineError::validation(format!(
            "No nodes found in the file {origin}"
        )));
    }

    let mut edge_list = Vec::with_capacity(edges.len());
    let mut weights = Vec::with_capacity(edges.len());
    for (position, edge) in edges.iter().enumerate() {
        let object = edge.as_object().ok_or_else(|| {
            EngineError::validation(format!("Edge {position} in {origin} is not an object"))
        })?;

        let src = endpoint(object, "source", position)?;
        let tar = endpoint(object, "target", position)?;

        let (Some(from), Some(to)) = (index.get(src), index.get(tar)) else {
            return Err(EngineError::validation(format!(
                "Invalid source or target in edge: {src} -> {tar}"
            )));
        };
        edge_list.push((from, to));

        let weight = match object.get("weight") {
            None => 1.0,
            Some(w) => w.as_f64().ok_or_else(|| {
                EngineError::validation(format!("Invalid weight in edge: {src} -> {tar}"))
            })?,
        };
        weights.push(weight);
    }

    Ok(GraphInstallation::named(
        index.names,
        edge_list,
        Some(weights),
        directed,
    ))
}
