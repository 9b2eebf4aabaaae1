use super::Extractor;
use crate::attributes::{AttributeTable, Value};
use crate::error::{EngineError, Result};
use crate::graph::VertexId;
use crate::store::GraphInstallation;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// A node row of a query result.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "tableName")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            table_name: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// A relationship row of a query result. Endpoints are node record IDs.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, JsonValue>,
}

impl EdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// Nodes and relationships returned by a graph database query.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSet {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub directed: bool,
}

/// Maps a JSON attribute onto a typed cell. `null` means absent; arrays and
/// objects are kept as their JSON text.
fn typed(value: &JsonValue) -> Option<Value> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(b) => Some(Value::Boolean(*b)),
        JsonValue::Number(n) => n.as_f64().map(Value::Numeric),
        JsonValue::String(s) => Some(Value::Text(s.clone())),
        other => Some(Value::Text(other.to_string())),
    }
}

impl Extractor for RecordSet {
    fn extract(&self) -> Result<GraphInstallation> {
        if self.nodes.is_empty() {
            return Err(EngineError::validation("No nodes found in the query result"));
        }

        let mut ids: HashMap<&str, VertexId> = HashMap::with_capacity(self.nodes.len());
        let mut vertex_attributes = AttributeTable::new(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            if ids.insert(node.id.as_str(), index as VertexId).is_some() {
                return Err(EngineError::validation(format!(
                    "Inconsistent graph: node {} is declared twice",
                    node.id
                )));
            }

            vertex_attributes.set("id", index, Value::Text(node.id.clone()))?;
            let label = node.label.clone().unwrap_or_else(|| node.id.clone());
            vertex_attributes.set("label", index, Value::Text(label))?;
            if let Some(table) = &node.table_name {
                vertex_attributes.set("tableName", index, Value::Text(table.clone()))?;
            }
            for (key, value) in &node.attributes {
                if let Some(value) = typed(value) {
                    vertex_attributes.set(key, index, value)?;
                }
            }
        }

        let mut edges = Vec::with_capacity(self.edges.len());
        let mut weights: Option<Vec<f64>> = None;
        let mut edge_attributes = AttributeTable::new(self.edges.len());
        for (index, edge) in self.edges.iter().enumerate() {
            let (Some(&from), Some(&to)) =
                (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
            else {
                return Err(EngineError::validation(format!(
                    "Inconsistent graph: edge {} -> {} references an undeclared node",
                    edge.source, edge.target
                )));
            };
            edges.push((from, to));

            for (key, value) in &edge.attributes {
                if key == "weight" {
                    let weight = match value.as_f64().filter(|w| w.is_finite()) {
                        Some(w) => w,
                        None => {
                            warn!(
                                source = %edge.source,
                                target = %edge.target,
                                %value,
                                "non-numeric edge weight treated as 0"
                            );
                            continue;
                        }
                    };
                    weights.get_or_insert_with(|| vec![0.0; self.edges.len()])[index] = weight;
                } else if let Some(value) = typed(value) {
                    edge_attributes.set(key, index, value)?;
                }
            }
        }

        let mut installation = GraphInstallation::anonymous(
            self.nodes.len() as u32,
            edges,
            weights,
            self.directed,
        );
        installation.vertex_attributes = vertex_attributes;
        installation.edge_attributes = edge_attributes;
        Ok(installation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> RecordSet {
        serde_json::from_value(json!({
            "nodes": [
                {"id": "p1", "label": "Ada", "tableName": "Person", "attributes": {"age": 36, "admin": true}},
                {"id": "p2", "tableName": "Person", "attributes": {"age": null, "tags": ["x", "y"]}},
                {"id": "c1", "label": "Acme", "tableName": "Company"}
            ],
            "edges": [
                {"source": "p1", "target": "c1", "attributes": {"since": 2019}},
                {"source": "p2", "target": "c1"}
            ],
            "directed": true
        }))
        .unwrap()
    }

    #[test]
    fn vertices_get_typed_columns() {
        let installation = people().extract().unwrap();
        let attrs = &installation.vertex_attributes;

        assert_eq!(installation.vertex_count, 3);
        assert!(installation.directed);
        assert_eq!(attrs.get("label", 1), Some(Value::Text("p2".into())));
        assert_eq!(attrs.get("tableName", 2), Some(Value::Text("Company".into())));
        assert_eq!(attrs.get("age", 0), Some(Value::Numeric(36.0)));
        assert_eq!(attrs.get("age", 1), None);
        assert_eq!(attrs.get("admin", 0), Some(Value::Boolean(true)));
        assert_eq!(attrs.get("tags", 1), Some(Value::Text("[\"x\",\"y\"]".into())));
    }

    #[test]
    fn edges_follow_declaration_order() {
        let installation = people().extract().unwrap();
        assert_eq!(installation.edges, vec![(0, 2), (1, 2)]);
        assert_eq!(
            installation.edge_attributes.get("since", 0),
            Some(Value::Numeric(2019.0))
        );
        assert!(installation.weights.is_none());
    }

    #[test]
    fn one_numeric_weight_turns_weights_on() {
        let mut set = people();
        set.edges[1]
            .attributes
            .insert("weight".into(), json!(4.5));
        let installation = set.extract().unwrap();
        assert_eq!(installation.weights, Some(vec![0.0, 4.5]));
        assert!(!installation.edge_attributes.has("weight"));
    }

    #[test]
    fn non_numeric_weight_counts_as_zero() {
        let mut set = people();
        set.edges[0].attributes.insert("weight".into(), json!("heavy"));
        set.edges[1].attributes.insert("weight".into(), json!(2));
        let installation = set.extract().unwrap();
        assert_eq!(installation.weights, Some(vec![0.0, 2.0]));
    }

    #[test]
    fn undeclared_endpoint_is_inconsistent() {
        let mut set = people();
        set.edges.push(EdgeRecord::new("p1", "ghost"));
        let err = set.extract().unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().starts_with("Inconsistent graph"));
    }

    #[test]
    fn duplicate_node_is_inconsistent() {
        let set = RecordSet {
            nodes: vec![NodeRecord::new("a"), NodeRecord::new("a")],
            edges: vec![],
            directed: false,
        };
        assert!(set.extract().is_err());
    }

    #[test]
    fn mixed_attribute_types_are_rejected() {
        let mut set = people();
        set.nodes[2].attributes.insert("age".into(), json!("old"));
        assert!(matches!(
            set.extract().unwrap_err(),
            EngineError::Validation(_)
        ));
    }

    #[test]
    fn label_names_vertices_once_installed() {
        let mut store = crate::store::GraphStore::new();
        let graph = store.install(people().extract().unwrap()).unwrap();
        assert_eq!(graph.names().column(), Some("label"));
        assert_eq!(graph.names().name(0), "Ada");
    }
}
