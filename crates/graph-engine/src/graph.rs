use crate::attributes::{AttributeTable, Value};
use crate::error::{EngineError, Result};
use serde::Serialize;
use std::collections::HashMap;

pub type VertexId = u32;
pub type EdgeId = u32;

/// Attribute columns checked, in order, for a vertex display name.
const NAME_PRIORITY: [&str; 3] = ["name", "label", "id"];

/// The single normalized graph every analysis runs against.
///
/// Vertex IDs are dense in `[0, vertex_count)`. The position of an edge in
/// `edges` is its edge ID; `weights`, when present, is indexed the same way.
#[derive(Debug, Clone)]
pub struct CanonicalGraph {
    vertex_count: u32,
    directed: bool,
    edges: Vec<(VertexId, VertexId)>,
    weights: Option<Vec<f64>>,
    vertex_attributes: AttributeTable,
    edge_attributes: AttributeTable,
    /// (from, to) -> first edge ID joining them, in stored orientation.
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

/// Borrowed read-only view handed to the algorithms backend.
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    pub vertex_count: u32,
    pub directed: bool,
    pub edges: &'a [(VertexId, VertexId)],
    pub weights: Option<&'a [f64]>,
}

impl CanonicalGraph {
    pub fn new(vertex_count: u32, directed: bool) -> Self {
        Self {
            vertex_count,
            directed,
            edges: Vec::new(),
            weights: None,
            vertex_attributes: AttributeTable::new(vertex_count as usize),
            edge_attributes: AttributeTable::new(0),
            edge_index: HashMap::new(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn edges(&self) -> &[(VertexId, VertexId)] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edges.get(id as usize).copied()
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId> {
        if from >= self.vertex_count || to >= self.vertex_count {
            return Err(EngineError::validation(format!(
                "Edge {from} -> {to} references a vertex outside [0, {})",
                self.vertex_count
            )));
        }
        let id = self.edges.len() as EdgeId;
        self.edges.push((from, to));
        self.edge_index.entry((from, to)).or_insert(id);
        Ok(id)
    }

    /// True iff a weight column was installed, regardless of its contents.
    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn weight(&self, edge: EdgeId) -> Option<f64> {
        self.weights
            .as_ref()
            .and_then(|w| w.get(edge as usize).copied())
    }

    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.edges.len() {
            return Err(EngineError::validation(format!(
                "Weight vector has {} entries for {} edges",
                weights.len(),
                self.edges.len()
            )));
        }
        self.weights = Some(weights);
        Ok(())
    }

    pub fn vertex_attributes(&self) -> &AttributeTable {
        &self.vertex_attributes
    }

    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.vertex_attributes
    }

    pub fn edge_attributes(&self) -> &AttributeTable {
        &self.edge_attributes
    }

    pub(crate) fn set_edge_attributes(&mut self, table: AttributeTable) -> Result<()> {
        if table.len() != self.edges.len() {
            return Err(EngineError::validation(format!(
                "Edge attribute table has {} rows for {} edges",
                table.len(),
                self.edges.len()
            )));
        }
        self.edge_attributes = table;
        Ok(())
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        v < self.vertex_count
    }

    /// Edge joining `a` and `b`. Undirected graphs accept either orientation.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&(a, b)).copied().or_else(|| {
            if self.directed {
                None
            } else {
                self.edge_index.get(&(b, a)).copied()
            }
        })
    }

    /// Orientation in which the edge between `a` and `b` is stored, if any.
    /// Directed graphs only accept `a -> b`.
    pub fn stored_orientation(&self, a: VertexId, b: VertexId) -> Option<(VertexId, VertexId)> {
        self.find_edge(a, b).and_then(|id| self.edge(id))
    }

    pub fn view(&self) -> GraphView<'_> {
        GraphView {
            vertex_count: self.vertex_count,
            directed: self.directed,
            edges: &self.edges,
            weights: self.weights(),
        }
    }

    /// Resolves the name column once; use the returned resolver for a whole request.
    pub fn names(&self) -> NameResolver<'_> {
        let column = NAME_PRIORITY
            .iter()
            .copied()
            .find(|attr| self.vertex_attributes.has(attr));
        NameResolver {
            graph: self,
            column,
        }
    }

    pub fn describe(&self) -> GraphDescription {
        let names = self.names();
        let nodes = (0..self.vertex_count)
            .map(|id| NodeEntry {
                id,
                name: names.column().map(|_| names.name(id)),
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|&(source, target)| EdgeEntry { source, target })
            .collect();
        GraphDescription {
            nodes,
            edges,
            directed: self.directed,
        }
    }
}

/// Maps vertex IDs to display names using whichever of `name`, `label` or
/// `id` the graph carries.
pub struct NameResolver<'g> {
    graph: &'g CanonicalGraph,
    column: Option<&'static str>,
}

impl NameResolver<'_> {
    pub fn column(&self) -> Option<&'static str> {
        self.column
    }

    pub fn name(&self, v: VertexId) -> String {
        self.column
            .and_then(|col| self.graph.vertex_attributes.get(col, v as usize))
            .map(|value: Value| value.render())
            .unwrap_or_else(|| v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeEntry {
    pub id: VertexId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeEntry {
    pub source: VertexId,
    pub target: VertexId,
}

/// What ingestion reports back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphDescription {
    pub nodes: Vec<NodeEntry>,
    pub edges: Vec<EdgeEntry>,
    pub directed: bool,
}
