//! Boundary with the external graph-algorithms library.
//!
//! A backend adapts that library to [`GraphAlgorithms`]. Every method has a
//! default body reporting the operation as unsupported, so a backend only
//! implements what it actually provides. Results are raw: vectors indexed by
//! vertex ID, membership arrays, and vertex/edge ID sequences. All encoding
//! happens in [`crate::analysis`].

use crate::error::CollaboratorError;
use crate::graph::{EdgeId, GraphView, VertexId};
use serde::Deserialize;

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Community assignment plus its modularity score.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub membership: Vec<u32>,
    pub modularity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeidenPartition {
    pub partition: Partition,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Eigenvector {
    pub scores: Vec<f64>,
    pub eigenvalue: f64,
}

/// A walk through the graph. `edges[i]` joins `vertices[i]` and `vertices[i + 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
}

/// Breadth-first visit order. Layer `i` is `order[layers[i]..layers[i + 1]]`;
/// the last entry of `layers` equals `order.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct BfsTree {
    pub order: Vec<VertexId>,
    pub layers: Vec<usize>,
}

/// Depth-first discovery and finishing orders.
#[derive(Debug, Clone, PartialEq)]
pub struct DfsOrder {
    pub discovery: Vec<VertexId>,
    pub finish: Vec<VertexId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diameter {
    pub length: f64,
    pub source: VertexId,
    pub target: VertexId,
    pub path: Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eulerian {
    pub has_path: bool,
    pub has_circuit: bool,
}

/// Predicted missing edge. Backends return these by descending probability.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedEdge {
    pub source: VertexId,
    pub target: VertexId,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortestPathMethod {
    Dijkstra,
    BellmanFord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectedness {
    Strong,
    Weak,
}

pub trait GraphAlgorithms {
    fn betweenness(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("betweenness"))
    }

    /// Unreachable-only vertices may be reported as NaN.
    fn closeness(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("closeness"))
    }

    /// Out-degree, self loops not counted.
    fn degree(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<u32>> {
        Err(CollaboratorError::unsupported("degree"))
    }

    fn eigenvector(&self, _graph: GraphView<'_>) -> CollaboratorResult<Eigenvector> {
        Err(CollaboratorError::unsupported("eigenvector"))
    }

    fn harmonic(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("harmonic"))
    }

    fn strength(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("strength"))
    }

    fn pagerank(&self, _graph: GraphView<'_>, _damping: f64) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("pagerank"))
    }

    fn louvain(&self, _graph: GraphView<'_>, _resolution: f64) -> CollaboratorResult<Partition> {
        Err(CollaboratorError::unsupported("louvain"))
    }

    fn leiden(
        &self,
        _graph: GraphView<'_>,
        _resolution: f64,
    ) -> CollaboratorResult<LeidenPartition> {
        Err(CollaboratorError::unsupported("leiden"))
    }

    fn fast_greedy(&self, _graph: GraphView<'_>) -> CollaboratorResult<Partition> {
        Err(CollaboratorError::unsupported("fast_greedy"))
    }

    fn label_propagation(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<u32>> {
        Err(CollaboratorError::unsupported("label_propagation"))
    }

    fn connected_components(
        &self,
        _graph: GraphView<'_>,
        _mode: Connectedness,
    ) -> CollaboratorResult<Vec<u32>> {
        Err(CollaboratorError::unsupported("connected_components"))
    }

    fn local_clustering(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        Err(CollaboratorError::unsupported("local_clustering"))
    }

    fn coreness(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<u32>> {
        Err(CollaboratorError::unsupported("coreness"))
    }

    fn triangles(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<[VertexId; 3]>> {
        Err(CollaboratorError::unsupported("triangles"))
    }

    /// Empty path when `target` is unreachable.
    fn shortest_path(
        &self,
        _graph: GraphView<'_>,
        _method: ShortestPathMethod,
        _source: VertexId,
        _target: VertexId,
    ) -> CollaboratorResult<Path> {
        Err(CollaboratorError::unsupported("shortest_path"))
    }

    /// One path per vertex, indexed by target; unreachable targets get an
    /// empty path.
    fn shortest_paths_from(
        &self,
        _graph: GraphView<'_>,
        _method: ShortestPathMethod,
        _source: VertexId,
    ) -> CollaboratorResult<Vec<Path>> {
        Err(CollaboratorError::unsupported("shortest_paths_from"))
    }

    fn k_shortest_paths(
        &self,
        _graph: GraphView<'_>,
        _source: VertexId,
        _target: VertexId,
        _k: u32,
    ) -> CollaboratorResult<Vec<Path>> {
        Err(CollaboratorError::unsupported("k_shortest_paths"))
    }

    fn bfs(&self, _graph: GraphView<'_>, _source: VertexId) -> CollaboratorResult<BfsTree> {
        Err(CollaboratorError::unsupported("bfs"))
    }

    /// Visits only what is reachable from `source`.
    fn dfs(&self, _graph: GraphView<'_>, _source: VertexId) -> CollaboratorResult<DfsOrder> {
        Err(CollaboratorError::unsupported("dfs"))
    }

    fn random_walk(
        &self,
        _graph: GraphView<'_>,
        _start: VertexId,
        _steps: u32,
    ) -> CollaboratorResult<Path> {
        Err(CollaboratorError::unsupported("random_walk"))
    }

    fn minimum_spanning_tree(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<EdgeId>> {
        Err(CollaboratorError::unsupported("minimum_spanning_tree"))
    }

    /// Square matrix over `vertices`, in the given order.
    fn jaccard(
        &self,
        _graph: GraphView<'_>,
        _vertices: &[VertexId],
    ) -> CollaboratorResult<Vec<Vec<f64>>> {
        Err(CollaboratorError::unsupported("jaccard"))
    }

    fn is_dag(&self, _graph: GraphView<'_>) -> CollaboratorResult<bool> {
        Err(CollaboratorError::unsupported("is_dag"))
    }

    fn topological_sort(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<VertexId>> {
        Err(CollaboratorError::unsupported("topological_sort"))
    }

    fn diameter(&self, _graph: GraphView<'_>) -> CollaboratorResult<Diameter> {
        Err(CollaboratorError::unsupported("diameter"))
    }

    fn eulerian(&self, _graph: GraphView<'_>) -> CollaboratorResult<Eulerian> {
        Err(CollaboratorError::unsupported("eulerian"))
    }

    fn eulerian_path(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<VertexId>> {
        Err(CollaboratorError::unsupported("eulerian_path"))
    }

    fn eulerian_circuit(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<VertexId>> {
        Err(CollaboratorError::unsupported("eulerian_circuit"))
    }

    fn predict_edges(
        &self,
        _graph: GraphView<'_>,
        _samples: u32,
        _bins: u32,
    ) -> CollaboratorResult<Vec<PredictedEdge>> {
        Err(CollaboratorError::unsupported("predict_edges"))
    }
}

/// A backend that provides nothing. Useful for exercising ingestion alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAlgorithms;

impl GraphAlgorithms for NoAlgorithms {}
