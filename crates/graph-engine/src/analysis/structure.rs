//! Whole-graph structure queries: adjacency, similarity, orderings, Eulerian
//! walks and missing-edge prediction.

use super::{backend_fault, invoke, require_vertex};
use crate::algorithms::GraphAlgorithms;
use crate::encoder::{prediction_defaults, round_to, stored_edge_key, COARSE};
use crate::envelope::{EnvelopeBuilder, MapKey, Mode, ResponseEnvelope};
use crate::error::{EngineError, Result};
use crate::graph::{CanonicalGraph, VertexId};
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

/// Predictions below this probability are dropped.
const PREDICTION_THRESHOLD: f64 = 0.5;

/// Answered from the canonical graph alone.
pub(super) fn adjacency(
    graph: &CanonicalGraph,
    source: VertexId,
    target: VertexId,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Adjacency Check";
    require_vertex(graph, source)?;
    require_vertex(graph, target)?;
    let names = graph.names();
    let edge = graph.find_edge(source, target);

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    envelope
        .color(MapKey::Vertex(source), 1.0)
        .color(MapKey::Vertex(target), 1.0)
        .data("source", names.name(source))
        .data("target", names.name(target))
        .data("adjacent", edge.is_some());
    if let Some(id) = edge {
        envelope.color(stored_edge_key(graph, source, target), 1.0);
        if let Some(weight) = graph.weight(id) {
            envelope.data("weight", weight);
        }
    }
    envelope.build(graph)
}

pub(super) fn jaccard<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    vertices: &[VertexId],
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Jaccard Similarity";
    if vertices.is_empty() {
        return Err(EngineError::validation(
            "Jaccard similarity needs at least one vertex",
        ));
    }
    for &v in vertices {
        require_vertex(graph, v)?;
    }
    let matrix = invoke(NAME, backend.jaccard(graph.view(), vertices))?;
    let n = vertices.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(backend_fault(
            NAME,
            format!("expected a {n}x{n} similarity matrix"),
        ));
    }
    let names = graph.names();

    let mut best: Option<(usize, usize, f64)> = None;
    let mut rows = Vec::with_capacity(n);
    for (i, row) in matrix.iter().enumerate() {
        let rounded: Vec<f64> = row.iter().map(|&s| round_to(s, COARSE)).collect();
        for (j, &similarity) in rounded.iter().enumerate() {
            if i == j || similarity.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, _, top)| similarity > top) {
                best = Some((i, j, similarity));
            }
        }
        rows.push(rounded);
    }

    let max_similarity = match best {
        Some((i, j, similarity)) => json!({
            "node1": names.name(vertices[i]),
            "node2": names.name(vertices[j]),
            "similarity": similarity,
        }),
        None => json!({}),
    };

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    for &v in vertices {
        envelope.color(MapKey::Vertex(v), 1.0);
    }
    envelope
        .data(
            "nodes",
            vertices.iter().map(|&v| names.name(v)).collect::<Vec<_>>(),
        )
        .data("similarityMatrix", json!(rows))
        .data("maxSimilarity", max_similarity);
    envelope.build(graph)
}

pub(super) fn topological_sort<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Topological Sort";
    if !invoke(NAME, backend.is_dag(graph.view()))? {
        return Err(EngineError::validation(
            "This graph is not a Directed Acyclic Graph (DAG) and cannot be topologically sorted.",
        ));
    }
    let order = invoke(NAME, backend.topological_sort(graph.view()))?;
    let names = graph.names();

    // Earlier vertices are darker.
    let total = order.len();
    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut rows = Vec::with_capacity(total);
    for (position, &vertex) in order.iter().enumerate() {
        envelope.color(
            MapKey::Vertex(vertex),
            (total - position) as f64 / total as f64,
        );
        rows.push(json!({"id": vertex, "node": names.name(vertex)}));
    }
    envelope.data("order", rows);
    envelope.build(graph)
}

/// Colours a vertex sequence as a walk and lists its steps.
fn walk_envelope(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    walk: &[VertexId],
) -> EnvelopeBuilder {
    let names = graph.names();
    let mut envelope = EnvelopeBuilder::new(algorithm, Mode::ShadeDefault);
    let steps: Vec<JsonValue> = walk
        .windows(2)
        .map(|pair| {
            envelope.color(stored_edge_key(graph, pair[0], pair[1]), 1.0);
            json!({"from": names.name(pair[0]), "to": names.name(pair[1])})
        })
        .collect();
    if let (Some(&first), Some(&last)) = (walk.first(), walk.last()) {
        envelope
            .color(MapKey::Vertex(first), 1.0)
            .color(MapKey::Vertex(last), 1.0)
            .data("start", names.name(first))
            .data("end", names.name(last));
    }
    envelope.data("path", steps);
    envelope
}

pub(super) fn eulerian_path<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Eulerian Path";
    let existence = invoke(NAME, backend.eulerian(graph.view()))?;
    if !existence.has_path {
        return Err(EngineError::validation(
            "This graph does not have an Eulerian path.",
        ));
    }
    let walk = invoke(NAME, backend.eulerian_path(graph.view()))?;
    walk_envelope(graph, NAME, &walk).build(graph)
}

pub(super) fn eulerian_circuit<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Eulerian Circuit";
    let existence = invoke(NAME, backend.eulerian(graph.view()))?;
    if !existence.has_circuit {
        let message = if existence.has_path {
            "This graph does not have an Eulerian circuit, but it does have an Eulerian path."
        } else {
            "This graph does not have an Eulerian circuit or an Eulerian path."
        };
        return Err(EngineError::validation(message));
    }
    let walk = invoke(NAME, backend.eulerian_circuit(graph.view()))?;
    walk_envelope(graph, NAME, &walk).build(graph)
}

pub(super) fn missing_edges<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    samples: Option<u32>,
    bins: Option<u32>,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "HRG Missing Edge Prediction";
    let defaults = prediction_defaults(graph.vertex_count(), graph.edge_count());
    let samples = samples.unwrap_or(defaults.num_samples);
    let bins = bins.unwrap_or(defaults.num_bins);
    debug!(samples, bins, "fitting edge prediction model");

    let predictions = invoke(NAME, backend.predict_edges(graph.view(), samples, bins))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut rows = Vec::new();
    for edge in predictions
        .iter()
        .take_while(|e| e.probability >= PREDICTION_THRESHOLD)
    {
        let (from, to) = (edge.source, edge.target);
        if !graph.contains_vertex(from) || !graph.contains_vertex(to) {
            return Err(backend_fault(
                NAME,
                format!("predicted edge {from}-{to} references an unknown vertex"),
            ));
        }
        envelope
            .extra_edge(from, to)
            .color(MapKey::Vertex(from), 0.5)
            .color(MapKey::Vertex(to), 0.5)
            .color(MapKey::Edge(from, to), 0.0);

        let mut row = Map::new();
        row.insert("from".into(), names.name(from).into());
        row.insert("to".into(), names.name(to).into());
        row.insert(
            "probability".into(),
            format!("{:.3}%", edge.probability * 100.0).into(),
        );
        rows.push(JsonValue::Object(row));
    }

    envelope
        .data("samples", samples)
        .data("bins", bins)
        .data("predictedEdges", rows);
    envelope.build(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{CollaboratorResult, Eulerian, PredictedEdge};
    use crate::graph::GraphView;

    fn square(directed: bool) -> CanonicalGraph {
        let mut graph = CanonicalGraph::new(4, directed);
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            graph.add_edge(a, b).unwrap();
        }
        graph
    }

    struct Fixed;

    impl GraphAlgorithms for Fixed {
        fn eulerian(&self, _graph: GraphView<'_>) -> CollaboratorResult<Eulerian> {
            Ok(Eulerian {
                has_path: true,
                has_circuit: false,
            })
        }

        fn is_dag(&self, graph: GraphView<'_>) -> CollaboratorResult<bool> {
            Ok(graph.directed)
        }

        fn topological_sort(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<VertexId>> {
            Ok(vec![2, 0, 1, 3])
        }

        fn jaccard(
            &self,
            _graph: GraphView<'_>,
            vertices: &[VertexId],
        ) -> CollaboratorResult<Vec<Vec<f64>>> {
            let n = vertices.len();
            Ok((0..n)
                .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 1.0 / 3.0 }).collect())
                .collect())
        }

        fn predict_edges(
            &self,
            _graph: GraphView<'_>,
            _samples: u32,
            _bins: u32,
        ) -> CollaboratorResult<Vec<PredictedEdge>> {
            Ok(vec![
                PredictedEdge {
                    source: 0,
                    target: 2,
                    probability: 0.91234,
                },
                PredictedEdge {
                    source: 1,
                    target: 3,
                    probability: 0.4,
                },
            ])
        }
    }

    #[test]
    fn adjacency_reports_weightless_edge() {
        let graph = square(false);
        let envelope = adjacency(&graph, 1, 0).unwrap();
        assert_eq!(envelope.data["adjacent"], json!(true));
        assert!(envelope.data.get("weight").is_none());
        let colors = envelope.color_map.unwrap();
        assert_eq!(colors.get(&MapKey::Edge(0, 1)), Some(1.0));
    }

    #[test]
    fn adjacency_respects_direction() {
        let graph = square(true);
        let envelope = adjacency(&graph, 1, 0).unwrap();
        assert_eq!(envelope.data["adjacent"], json!(false));
    }

    #[test]
    fn circuit_failure_mentions_existing_path() {
        let err = eulerian_circuit(&Fixed, &square(false)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("does have an Eulerian path"));
    }

    #[test]
    fn undirected_graph_is_not_sortable() {
        let err = topological_sort(&Fixed, &square(false)).unwrap_err();
        assert!(err.to_string().contains("not a Directed Acyclic Graph"));
    }

    #[test]
    fn earlier_vertices_are_darker() {
        let mut graph = CanonicalGraph::new(4, true);
        graph.add_edge(2, 0).unwrap();
        let envelope = topological_sort(&Fixed, &graph).unwrap();
        let colors = envelope.color_map.unwrap();
        assert_eq!(colors.get(&MapKey::Vertex(2)), Some(1.0));
        assert_eq!(colors.get(&MapKey::Vertex(3)), Some(0.25));
    }

    #[test]
    fn jaccard_picks_best_off_diagonal_pair() {
        let envelope = jaccard(&Fixed, &square(false), &[3, 1]).unwrap();
        assert_eq!(
            envelope.data["similarityMatrix"],
            json!([[1.0, 0.33], [0.33, 1.0]])
        );
        assert_eq!(
            envelope.data["maxSimilarity"],
            json!({"node1": "3", "node2": "1", "similarity": 0.33})
        );
    }

    #[test]
    fn jaccard_needs_vertices() {
        let err = jaccard(&Fixed, &square(false), &[]).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn predictions_below_threshold_are_dropped() {
        let envelope = missing_edges(&Fixed, &square(false), None, Some(7)).unwrap();
        assert_eq!(
            envelope.data["predictedEdges"],
            json!([{"from": "0", "to": "2", "probability": "91.234%"}])
        );
        assert_eq!(envelope.data["samples"], json!(500));
        assert_eq!(envelope.data["bins"], json!(7));
        let extra = envelope.edges.unwrap();
        assert_eq!((extra[0].source, extra[0].target), (0, 2));
    }
}
