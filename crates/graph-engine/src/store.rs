use crate::attributes::AttributeTable;
use crate::config::DEFAULT_MAX_VERTICES;
use crate::error::{EngineError, Result};
use crate::graph::{CanonicalGraph, GraphDescription, VertexId};
use tracing::{debug, info};

/// Everything an adapter produces: a complete graph ready to be installed.
///
/// Building one never touches the live graph, so a failed parse leaves the
/// store exactly as it was.
#[derive(Debug, Clone)]
pub struct GraphInstallation {
    pub vertex_count: u32,
    /// Display names by vertex ID, stored in the `name` column.
    pub names: Option<Vec<String>>,
    pub edges: Vec<(VertexId, VertexId)>,
    pub weights: Option<Vec<f64>>,
    pub directed: bool,
    pub vertex_attributes: AttributeTable,
    pub edge_attributes: AttributeTable,
}

impl GraphInstallation {
    /// Vertex IDs are the positions of the names in `names`.
    pub fn named(
        names: Vec<String>,
        edges: Vec<(VertexId, VertexId)>,
        weights: Option<Vec<f64>>,
        directed: bool,
    ) -> Self {
        let vertex_count = names.len() as u32;
        let edge_count = edges.len();
        Self {
            vertex_count,
            names: Some(names),
            edges,
            weights,
            directed,
            vertex_attributes: AttributeTable::new(vertex_count as usize),
            edge_attributes: AttributeTable::new(edge_count),
        }
    }

    pub fn anonymous(
        vertex_count: u32,
        edges: Vec<(VertexId, VertexId)>,
        weights: Option<Vec<f64>>,
        directed: bool,
    ) -> Self {
        let edge_count = edges.len();
        Self {
            vertex_count,
            names: None,
            edges,
            weights,
            directed,
            vertex_attributes: AttributeTable::new(vertex_count as usize),
            edge_attributes: AttributeTable::new(edge_count),
        }
    }

    fn build(self, max_vertices: u32) -> Result<CanonicalGraph> {
        if self.vertex_count == 0 {
            return Err(EngineError::validation("No nodes found in the file"));
        }
        if self.vertex_count > max_vertices {
            return Err(EngineError::validation(format!(
                "Graph has {} vertices, the limit is {max_vertices}",
                self.vertex_count
            )));
        }
        if self.vertex_attributes.len() != self.vertex_count as usize {
            return Err(EngineError::validation(format!(
                "Vertex attribute table has {} rows for {} vertices",
                self.vertex_attributes.len(),
                self.vertex_count
            )));
        }

        let mut graph = CanonicalGraph::new(self.vertex_count, self.directed);
        *graph.vertex_attributes_mut() = self.vertex_attributes;
        for (from, to) in self.edges {
            graph.add_edge(from, to)?;
        }
        if let Some(weights) = self.weights {
            graph.set_weights(weights)?;
        }
        if let Some(names) = self.names {
            graph
                .vertex_attributes_mut()
                .insert_text_column("name", names)?;
        }
        graph.set_edge_attributes(self.edge_attributes)?;
        Ok(graph)
    }
}

/// Owns the one live graph of a session.
pub struct GraphStore {
    current: Option<CanonicalGraph>,
    max_vertices: u32,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_VERTICES)
    }

    pub fn with_limit(max_vertices: u32) -> Self {
        Self {
            current: None,
            max_vertices,
        }
    }

    /// Replaces the current graph. The new graph is fully built before the
    /// old one is dropped; on error the previous graph stays installed.
    pub fn install(&mut self, installation: GraphInstallation) -> Result<&CanonicalGraph> {
        let graph = installation.build(self.max_vertices)?;
        self.release();
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            directed = graph.is_directed(),
            weighted = graph.has_weights(),
            "installed graph"
        );
        Ok(self.current.insert(graph))
    }

    pub fn current(&self) -> Result<&CanonicalGraph> {
        self.current
            .as_ref()
            .ok_or_else(|| EngineError::validation("No graph is loaded"))
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Frees the current graph and its weights.
    pub fn release(&mut self) {
        if let Some(old) = self.current.take() {
            debug!(vertices = old.vertex_count(), "released graph");
        }
    }

    pub fn describe(&self) -> Result<GraphDescription> {
        Ok(self.current()?.describe())
    }
}
