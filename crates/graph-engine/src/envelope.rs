use crate::error::{CollaboratorError, EngineError, Result};
use crate::graph::{CanonicalGraph, EdgeEntry, VertexId};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// How the renderer reads the accompanying map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dark for important, light for less important.
    Important = 1,
    ShadeDefault = 2,
    /// Like `ShadeDefault`, but absent keys render as an error shade.
    ShadeError = 3,
    SizeScalar = 4,
    Rainbow = 5,
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Key of a color or size map entry: a vertex, or an edge written `from-to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Vertex(VertexId),
    Edge(VertexId, VertexId),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Vertex(v) => write!(f, "{v}"),
            MapKey::Edge(from, to) => write!(f, "{from}-{to}"),
        }
    }
}

/// Ordered key -> number map, serialized as a JSON object with string keys.
/// Setting an existing key overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap(BTreeMap<MapKey, f64>);

impl ValueMap {
    pub fn set(&mut self, key: MapKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &MapKey) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.0.keys()
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key.to_string(), value)))
    }
}

/// The uniform result of every analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_map: Option<ValueMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_map: Option<ValueMap>,
    pub mode: Mode,
    pub data: JsonValue,
    /// Edges the renderer should draw in addition to the graph's own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<EdgeEntry>>,
}

/// Accumulates one envelope. Keys are checked against the graph at
/// [`EnvelopeBuilder::build`], so a malformed backend result never reaches
/// the caller.
#[derive(Debug)]
pub struct EnvelopeBuilder {
    algorithm: &'static str,
    mode: Mode,
    color_map: Option<ValueMap>,
    size_map: Option<ValueMap>,
    data: Map<String, JsonValue>,
    extra_edges: Option<Vec<EdgeEntry>>,
}

impl EnvelopeBuilder {
    pub fn new(algorithm: &'static str, mode: Mode) -> Self {
        let mut data = Map::new();
        data.insert("algorithm".into(), JsonValue::from(algorithm));
        Self {
            algorithm,
            mode,
            color_map: None,
            size_map: None,
            data,
            extra_edges: None,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    pub fn color(&mut self, key: MapKey, value: f64) -> &mut Self {
        self.color_map.get_or_insert_with(ValueMap::default).set(key, value);
        self
    }

    pub fn size(&mut self, vertex: VertexId, value: f64) -> &mut Self {
        self.size_map
            .get_or_insert_with(ValueMap::default)
            .set(MapKey::Vertex(vertex), value);
        self
    }

    pub fn data(&mut self, key: &str, value: impl Into<JsonValue>) -> &mut Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn extra_edge(&mut self, source: VertexId, target: VertexId) -> &mut Self {
        self.extra_edges
            .get_or_insert_with(Vec::new)
            .push(EdgeEntry { source, target });
        self
    }

    fn check_key(&self, graph: &CanonicalGraph, key: &MapKey) -> std::result::Result<(), String> {
        match *key {
            MapKey::Vertex(v) if graph.contains_vertex(v) => Ok(()),
            MapKey::Vertex(v) => Err(format!("result references unknown vertex {v}")),
            MapKey::Edge(from, to) => {
                let known = graph.find_edge(from, to).is_some()
                    || self.extra_edges.as_ref().is_some_and(|extra| {
                        extra.iter().any(|e| e.source == from && e.target == to)
                    });
                if known {
                    Ok(())
                } else {
                    Err(format!("result references unknown edge {from}-{to}"))
                }
            }
        }
    }

    pub fn build(self, graph: &CanonicalGraph) -> Result<ResponseEnvelope> {
        let keys = self
            .color_map
            .iter()
            .chain(self.size_map.iter())
            .flat_map(ValueMap::keys);
        for key in keys {
            self.check_key(graph, key).map_err(|message| {
                EngineError::collaborator(self.algorithm, CollaboratorError::new(message))
            })?;
        }

        Ok(ResponseEnvelope {
            color_map: self.color_map,
            size_map: self.size_map,
            mode: self.mode,
            data: JsonValue::Object(self.data),
            edges: self.extra_edges,
        })
    }
}
