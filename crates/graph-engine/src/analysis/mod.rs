//! Runs one analysis against the current graph and encodes the raw backend
//! result into a [`ResponseEnvelope`].

use crate::algorithms::{CollaboratorResult, GraphAlgorithms, ShortestPathMethod};
use crate::envelope::ResponseEnvelope;
use crate::error::{CollaboratorError, EngineError, Result};
use crate::graph::{CanonicalGraph, VertexId};
use serde::Deserialize;
use tracing::{debug, debug_span};

mod centrality;
mod community;
mod paths;
mod structure;

fn default_damping() -> f64 {
    0.85
}

fn default_resolution() -> f64 {
    1.0
}

/// One analysis call, tagged by `algorithm`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Betweenness,
    Closeness,
    Degree,
    Eigenvector,
    Harmonic,
    Strength,
    Pagerank {
        #[serde(default = "default_damping")]
        damping: f64,
    },
    Louvain {
        #[serde(default = "default_resolution")]
        resolution: f64,
    },
    Leiden {
        #[serde(default = "default_resolution")]
        resolution: f64,
    },
    FastGreedy,
    LabelPropagation,
    LocalClustering,
    KCore {
        k: u32,
    },
    Triangles,
    StronglyConnectedComponents,
    WeaklyConnectedComponents,
    ShortestPath {
        method: ShortestPathMethod,
        source: VertexId,
        target: VertexId,
    },
    ShortestPathsFrom {
        method: ShortestPathMethod,
        source: VertexId,
    },
    KShortestPaths {
        source: VertexId,
        target: VertexId,
        k: u32,
    },
    Bfs {
        source: VertexId,
    },
    Dfs {
        source: VertexId,
    },
    RandomWalk {
        source: VertexId,
        steps: u32,
    },
    MinimumSpanningTree,
    Adjacency {
        source: VertexId,
        target: VertexId,
    },
    Jaccard {
        vertices: Vec<VertexId>,
    },
    TopologicalSort,
    Diameter,
    EulerianPath,
    EulerianCircuit,
    MissingEdges {
        #[serde(default)]
        samples: Option<u32>,
        #[serde(default)]
        bins: Option<u32>,
    },
}

/// Wire names accepted in the `algorithm` tag.
pub const ALGORITHMS: [&str; 30] = [
    "betweenness",
    "closeness",
    "degree",
    "eigenvector",
    "harmonic",
    "strength",
    "pagerank",
    "louvain",
    "leiden",
    "fast_greedy",
    "label_propagation",
    "local_clustering",
    "k_core",
    "triangles",
    "strongly_connected_components",
    "weakly_connected_components",
    "shortest_path",
    "shortest_paths_from",
    "k_shortest_paths",
    "bfs",
    "dfs",
    "random_walk",
    "minimum_spanning_tree",
    "adjacency",
    "jaccard",
    "topological_sort",
    "diameter",
    "eulerian_path",
    "eulerian_circuit",
    "missing_edges",
];

impl AnalysisRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
            Self::Degree => "degree",
            Self::Eigenvector => "eigenvector",
            Self::Harmonic => "harmonic",
            Self::Strength => "strength",
            Self::Pagerank { .. } => "pagerank",
            Self::Louvain { .. } => "louvain",
            Self::Leiden { .. } => "leiden",
            Self::FastGreedy => "fast_greedy",
            Self::LabelPropagation => "label_propagation",
            Self::LocalClustering => "local_clustering",
            Self::KCore { .. } => "k_core",
            Self::Triangles => "triangles",
            Self::StronglyConnectedComponents => "strongly_connected_components",
            Self::WeaklyConnectedComponents => "weakly_connected_components",
            Self::ShortestPath { .. } => "shortest_path",
            Self::ShortestPathsFrom { .. } => "shortest_paths_from",
            Self::KShortestPaths { .. } => "k_shortest_paths",
            Self::Bfs { .. } => "bfs",
            Self::Dfs { .. } => "dfs",
            Self::RandomWalk { .. } => "random_walk",
            Self::MinimumSpanningTree => "minimum_spanning_tree",
            Self::Adjacency { .. } => "adjacency",
            Self::Jaccard { .. } => "jaccard",
            Self::TopologicalSort => "topological_sort",
            Self::Diameter => "diameter",
            Self::EulerianPath => "eulerian_path",
            Self::EulerianCircuit => "eulerian_circuit",
            Self::MissingEdges { .. } => "missing_edges",
        }
    }
}

/// Checks preconditions, calls the backend and encodes its answer.
pub struct Analyzer<A> {
    backend: A,
}

impl<A: GraphAlgorithms> Analyzer<A> {
    pub fn new(backend: A) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &A {
        &self.backend
    }

    pub fn run(&self, graph: &CanonicalGraph, request: &AnalysisRequest) -> Result<ResponseEnvelope> {
        let span = debug_span!("analysis", algorithm = request.name());
        let _guard = span.enter();
        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "running analysis"
        );

        let b = &self.backend;
        match request {
            AnalysisRequest::Betweenness => centrality::betweenness(b, graph),
            AnalysisRequest::Closeness => centrality::closeness(b, graph),
            AnalysisRequest::Degree => centrality::degree(b, graph),
            AnalysisRequest::Eigenvector => centrality::eigenvector(b, graph),
            AnalysisRequest::Harmonic => centrality::harmonic(b, graph),
            AnalysisRequest::Strength => centrality::strength(b, graph),
            AnalysisRequest::Pagerank { damping } => centrality::pagerank(b, graph, *damping),
            AnalysisRequest::Louvain { resolution } => community::louvain(b, graph, *resolution),
            AnalysisRequest::Leiden { resolution } => community::leiden(b, graph, *resolution),
            AnalysisRequest::FastGreedy => community::fast_greedy(b, graph),
            AnalysisRequest::LabelPropagation => community::label_propagation(b, graph),
            AnalysisRequest::LocalClustering => community::local_clustering(b, graph),
            AnalysisRequest::KCore { k } => community::k_core(b, graph, *k),
            AnalysisRequest::Triangles => community::triangles(b, graph),
            AnalysisRequest::StronglyConnectedComponents => community::strong_components(b, graph),
            AnalysisRequest::WeaklyConnectedComponents => community::weak_components(b, graph),
            AnalysisRequest::ShortestPath {
                method,
                source,
                target,
            } => paths::shortest_path(b, graph, *method, *source, *target),
            AnalysisRequest::ShortestPathsFrom { method, source } => {
                paths::shortest_paths_from(b, graph, *method, *source)
            }
            AnalysisRequest::KShortestPaths { source, target, k } => {
                paths::k_shortest_paths(b, graph, *source, *target, *k)
            }
            AnalysisRequest::Bfs { source } => paths::bfs(b, graph, *source),
            AnalysisRequest::Dfs { source } => paths::dfs(b, graph, *source),
            AnalysisRequest::RandomWalk { source, steps } => {
                paths::random_walk(b, graph, *source, *steps)
            }
            AnalysisRequest::MinimumSpanningTree => paths::minimum_spanning_tree(b, graph),
            AnalysisRequest::Diameter => paths::diameter(b, graph),
            AnalysisRequest::Adjacency { source, target } => {
                structure::adjacency(graph, *source, *target)
            }
            AnalysisRequest::Jaccard { vertices } => structure::jaccard(b, graph, vertices),
            AnalysisRequest::TopologicalSort => structure::topological_sort(b, graph),
            AnalysisRequest::EulerianPath => structure::eulerian_path(b, graph),
            AnalysisRequest::EulerianCircuit => structure::eulerian_circuit(b, graph),
            AnalysisRequest::MissingEdges { samples, bins } => {
                structure::missing_edges(b, graph, *samples, *bins)
            }
        }
    }
}

/// Tags a backend failure with the analysis that triggered it.
fn invoke<T>(algorithm: &'static str, result: CollaboratorResult<T>) -> Result<T> {
    result.map_err(|source| EngineError::collaborator(algorithm, source))
}

fn backend_fault(algorithm: &'static str, message: String) -> EngineError {
    EngineError::collaborator(algorithm, CollaboratorError::new(message))
}

/// Like [`invoke`], but also insists on one entry per vertex.
fn per_vertex<T>(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    result: CollaboratorResult<Vec<T>>,
) -> Result<Vec<T>> {
    let values = invoke(algorithm, result)?;
    if values.len() != graph.vertex_count() as usize {
        return Err(backend_fault(
            algorithm,
            format!(
                "returned {} values for {} vertices",
                values.len(),
                graph.vertex_count()
            ),
        ));
    }
    Ok(values)
}

fn require_vertex(graph: &CanonicalGraph, vertex: VertexId) -> Result<()> {
    if graph.contains_vertex(vertex) {
        Ok(())
    } else {
        Err(EngineError::validation(format!(
            "Vertex {vertex} does not exist; the graph has {} vertices",
            graph.vertex_count()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_deserialize_with_defaults() {
        let request: AnalysisRequest =
            serde_json::from_value(json!({"algorithm": "pagerank"})).unwrap();
        assert_eq!(request, AnalysisRequest::Pagerank { damping: 0.85 });

        let request: AnalysisRequest = serde_json::from_value(json!({
            "algorithm": "shortest_path",
            "method": "bellman_ford",
            "source": 0,
            "target": 3
        }))
        .unwrap();
        assert_eq!(request.name(), "shortest_path");
    }

    #[test]
    fn negative_vertex_is_not_a_request() {
        let parsed: std::result::Result<AnalysisRequest, _> =
            serde_json::from_value(json!({"algorithm": "bfs", "source": -1}));
        assert!(parsed.is_err());
    }

    #[test]
    fn every_request_name_is_listed() {
        let samples = [
            AnalysisRequest::Degree,
            AnalysisRequest::KCore { k: 2 },
            AnalysisRequest::Jaccard { vertices: vec![] },
            AnalysisRequest::MissingEdges {
                samples: None,
                bins: None,
            },
        ];
        for request in samples {
            assert!(ALGORITHMS.contains(&request.name()));
        }
    }
}
