//! Per-vertex scalar metrics, rendered as circle sizes.

use super::{invoke, per_vertex};
use crate::algorithms::GraphAlgorithms;
use crate::encoder::{max_ignoring_nan, round_to, scale_size, COARSE, FINE};
use crate::envelope::{EnvelopeBuilder, Mode, ResponseEnvelope};
use crate::error::Result;
use crate::graph::{CanonicalGraph, VertexId};
use serde_json::json;

/// `sizeMap` scaled against the largest non-NaN value, plus
/// `data.centralities` rounded to `digits`. An undefined (NaN) value is
/// reported as 0, matching the minimum size it is drawn at.
fn size_envelope(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    values: &[f64],
    digits: usize,
) -> EnvelopeBuilder {
    let names = graph.names();
    let max = max_ignoring_nan(values.iter().copied()).unwrap_or(0.0);

    let mut envelope = EnvelopeBuilder::new(algorithm, Mode::SizeScalar);
    let mut rows = Vec::with_capacity(values.len());
    for (index, &value) in values.iter().enumerate() {
        let id = index as VertexId;
        envelope.size(id, scale_size(value, max));
        rows.push(json!({
            "id": id,
            "node": names.name(id),
            "centrality": if value.is_nan() { 0.0 } else { round_to(value, digits) },
        }));
    }
    envelope.data("centralities", rows);
    envelope
}

pub(super) fn betweenness<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Betweenness Centrality";
    let values = per_vertex(graph, NAME, backend.betweenness(graph.view()))?;
    size_envelope(graph, NAME, &values, COARSE).build(graph)
}

pub(super) fn closeness<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Closeness Centrality";
    let values = per_vertex(graph, NAME, backend.closeness(graph.view()))?;
    size_envelope(graph, NAME, &values, FINE).build(graph)
}

pub(super) fn degree<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Degree Centrality";
    let degrees = per_vertex(graph, NAME, backend.degree(graph.view()))?;
    let values: Vec<f64> = degrees.into_iter().map(f64::from).collect();
    size_envelope(graph, NAME, &values, COARSE).build(graph)
}

pub(super) fn eigenvector<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Eigenvector Centrality";
    let result = invoke(NAME, backend.eigenvector(graph.view()))?;
    let scores = per_vertex(graph, NAME, Ok(result.scores))?;

    let mut envelope = size_envelope(graph, NAME, &scores, FINE);
    envelope.data("eigenvalue", round_to(result.eigenvalue, COARSE));
    envelope.build(graph)
}

pub(super) fn harmonic<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Harmonic Centrality";
    let values = per_vertex(graph, NAME, backend.harmonic(graph.view()))?;
    size_envelope(graph, NAME, &values, FINE).build(graph)
}

pub(super) fn strength<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Strength Centrality";
    let values = per_vertex(graph, NAME, backend.strength(graph.view()))?;
    size_envelope(graph, NAME, &values, COARSE).build(graph)
}

pub(super) fn pagerank<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    damping: f64,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "PageRank";
    let values = per_vertex(graph, NAME, backend.pagerank(graph.view(), damping))?;

    let mut envelope = size_envelope(graph, NAME, &values, FINE);
    envelope.data("damping", format!("{damping:.2}"));
    envelope.build(graph)
}
