//! Groupings and neighbourhood structure: communities, components,
//! clustering, cores and triangles.

use super::{backend_fault, invoke, per_vertex};
use crate::algorithms::{Connectedness, GraphAlgorithms};
use crate::encoder::{group_members, ratio_to_max, round_to, stored_edge_key, COARSE, FINE};
use crate::envelope::{EnvelopeBuilder, MapKey, Mode, ResponseEnvelope};
use crate::error::{EngineError, Result};
use crate::graph::{CanonicalGraph, VertexId};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;

fn require_undirected(graph: &CanonicalGraph, algorithm: &str) -> Result<()> {
    if graph.is_directed() {
        return Err(EngineError::validation(format!(
            "The {algorithm} algorithm does not support directed graphs"
        )));
    }
    Ok(())
}

fn require_directed(graph: &CanonicalGraph, algorithm: &str) -> Result<()> {
    if !graph.is_directed() {
        return Err(EngineError::validation(format!(
            "The {algorithm} algorithm does not support undirected graphs"
        )));
    }
    Ok(())
}

/// Rainbow colouring by group ID, with `data.<field>` listing member names
/// per group in ascending group order.
fn grouping(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    membership: &[u32],
    field: &str,
) -> EnvelopeBuilder {
    let mut envelope = EnvelopeBuilder::new(algorithm, Mode::Rainbow);
    for (vertex, &group) in membership.iter().enumerate() {
        envelope.color(MapKey::Vertex(vertex as VertexId), f64::from(group));
    }
    let groups: Vec<JsonValue> = group_members(membership, &graph.names())
        .into_values()
        .map(JsonValue::from)
        .collect();
    envelope.data(field, groups);
    envelope
}

pub(super) fn louvain<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    resolution: f64,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Louvain Community Detection";
    require_undirected(graph, "Louvain")?;
    let partition = invoke(NAME, backend.louvain(graph.view(), resolution))?;
    let membership = per_vertex(graph, NAME, Ok(partition.membership))?;

    let mut envelope = grouping(graph, NAME, &membership, "communities");
    envelope.data("modularity", round_to(partition.modularity, COARSE));
    envelope.build(graph)
}

pub(super) fn leiden<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    resolution: f64,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Leiden Community Detection";
    require_undirected(graph, "Leiden")?;
    let result = invoke(NAME, backend.leiden(graph.view(), resolution))?;
    let membership = per_vertex(graph, NAME, Ok(result.partition.membership))?;

    let mut envelope = grouping(graph, NAME, &membership, "communities");
    envelope
        .data("modularity", round_to(result.partition.modularity, COARSE))
        .data("quality", round_to(result.quality, COARSE));
    envelope.build(graph)
}

pub(super) fn fast_greedy<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Fast-Greedy Community Detection";
    require_undirected(graph, "Fast-Greedy")?;
    let partition = invoke(NAME, backend.fast_greedy(graph.view()))?;
    let membership = per_vertex(graph, NAME, Ok(partition.membership))?;

    let mut envelope = grouping(graph, NAME, &membership, "communities");
    envelope.data("modularity", round_to(partition.modularity, COARSE));
    envelope.build(graph)
}

pub(super) fn label_propagation<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Label Propagation";
    let membership = per_vertex(graph, NAME, backend.label_propagation(graph.view()))?;
    grouping(graph, NAME, &membership, "communities").build(graph)
}

pub(super) fn strong_components<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Strongly Connected Components";
    let membership = per_vertex(
        graph,
        NAME,
        backend.connected_components(graph.view(), Connectedness::Strong),
    )?;
    grouping(graph, NAME, &membership, "components").build(graph)
}

pub(super) fn weak_components<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Weakly Connected Components";
    require_directed(graph, NAME)?;
    let membership = per_vertex(
        graph,
        NAME,
        backend.connected_components(graph.view(), Connectedness::Weak),
    )?;
    grouping(graph, NAME, &membership, "components").build(graph)
}

pub(super) fn local_clustering<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Local Clustering Coefficient";
    let coefficients = per_vertex(graph, NAME, backend.local_clustering(graph.view()))?;
    let names = graph.names();

    // Mean over vertices that sit in at least one triangle.
    let nonzero: Vec<f64> = coefficients
        .iter()
        .copied()
        .filter(|c| *c != 0.0 && !c.is_nan())
        .collect();
    let global = if nonzero.is_empty() {
        0.0
    } else {
        nonzero.iter().sum::<f64>() / nonzero.len() as f64
    };

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut rows = Vec::with_capacity(coefficients.len());
    let mut shades = BTreeMap::new();
    for (index, &value) in coefficients.iter().enumerate() {
        let id = index as VertexId;
        shades.insert(id, value);
        rows.push(json!({
            "id": id,
            "node": names.name(id),
            "value": round_to(value, FINE),
        }));
    }
    for (id, shade) in ratio_to_max(shades) {
        envelope.color(MapKey::Vertex(id), shade);
    }

    envelope
        .data("global_coefficient", round_to(global, FINE))
        .data("coefficients", rows);
    envelope.build(graph)
}

pub(super) fn k_core<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    k: u32,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "K-Core Detection";
    let coreness = per_vertex(graph, NAME, backend.coreness(graph.view()))?;
    let names = graph.names();
    let in_core = |v: VertexId| coreness[v as usize] >= k;

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    for &(from, to) in graph.edges() {
        if in_core(from) && in_core(to) {
            envelope
                .color(MapKey::Edge(from, to), 1.0)
                .color(MapKey::Vertex(from), 0.5)
                .color(MapKey::Vertex(to), 0.5);
        }
    }

    let cores: Vec<JsonValue> = (0..graph.vertex_count())
        .filter(|&v| in_core(v))
        .map(|v| json!({"id": v, "node": names.name(v)}))
        .collect();
    envelope
        .data("cores", cores)
        .data("k", k)
        .data("max_coreness", coreness.iter().copied().max().unwrap_or(0));
    envelope.build(graph)
}

pub(super) fn triangles<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Triangle Count";
    let triangles = invoke(NAME, backend.triangles(graph.view()))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut rows = Vec::with_capacity(triangles.len());
    for (index, &[a, b, c]) in triangles.iter().enumerate() {
        if [a, b, c].iter().any(|&v| !graph.contains_vertex(v)) {
            return Err(backend_fault(
                NAME,
                format!("triangle {a}-{b}-{c} references an unknown vertex"),
            ));
        }
        rows.push(json!({
            "id": index + 1,
            "node1": names.name(a),
            "node2": names.name(b),
            "node3": names.name(c),
        }));
        for v in [a, b, c] {
            envelope.color(MapKey::Vertex(v), 0.5);
        }
        for (x, y) in [(a, b), (b, c), (c, a)] {
            envelope.color(stored_edge_key(graph, x, y), 1.0);
        }
    }

    envelope.data("triangles", rows);
    envelope.build(graph)
}
