//! Shortest paths, traversals, walks, spanning trees and the diameter.

use super::{backend_fault, invoke, require_vertex};
use crate::algorithms::{GraphAlgorithms, Path, ShortestPathMethod};
use crate::encoder::{frequencies_to_ratio, round_to, stored_edge_key, COARSE};
use crate::envelope::{EnvelopeBuilder, MapKey, Mode, ResponseEnvelope};
use crate::error::Result;
use crate::graph::{CanonicalGraph, VertexId};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Weight of the `step`-th edge of `path`, or `None` on an unweighted graph.
fn step_weight(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    path: &Path,
    step: usize,
) -> Result<Option<f64>> {
    if !graph.has_weights() {
        return Ok(None);
    }
    path.edges
        .get(step)
        .and_then(|&edge| graph.weight(edge))
        .map(Some)
        .ok_or_else(|| {
            backend_fault(
                algorithm,
                format!("path step {step} has no matching edge in the graph"),
            )
        })
}

/// `{from, to, weight?}` objects for each step of a single path, colouring
/// vertices 0.5 and edges 1. Returns the links and the total weight.
fn path_links(
    graph: &CanonicalGraph,
    algorithm: &'static str,
    path: &Path,
    envelope: &mut EnvelopeBuilder,
) -> Result<(Vec<JsonValue>, f64)> {
    let names = graph.names();
    let mut links = Vec::new();
    let mut total = 0.0;
    for (step, &vertex) in path.vertices.iter().enumerate() {
        envelope.color(MapKey::Vertex(vertex), 0.5);
        let Some(&previous) = step.checked_sub(1).and_then(|i| path.vertices.get(i)) else {
            continue;
        };
        envelope.color(stored_edge_key(graph, previous, vertex), 1.0);

        let mut link = Map::new();
        link.insert("from".into(), names.name(previous).into());
        link.insert("to".into(), names.name(vertex).into());
        if let Some(weight) = step_weight(graph, algorithm, path, step - 1)? {
            link.insert("weight".into(), weight.into());
            total += weight;
        }
        links.push(JsonValue::Object(link));
    }
    Ok((links, total))
}

fn method_names(method: ShortestPathMethod) -> (&'static str, &'static str) {
    match method {
        ShortestPathMethod::Dijkstra => ("Dijkstra Single Path", "Dijkstra Single Source"),
        ShortestPathMethod::BellmanFord => {
            ("Bellman-Ford Single Path", "Bellman-Ford Single Source")
        }
    }
}

pub(super) fn shortest_path<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    method: ShortestPathMethod,
    source: VertexId,
    target: VertexId,
) -> Result<ResponseEnvelope> {
    let (name, _) = method_names(method);
    require_vertex(graph, source)?;
    require_vertex(graph, target)?;
    let path = invoke(name, backend.shortest_path(graph.view(), method, source, target))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(name, Mode::ShadeDefault);
    let (links, total) = path_links(graph, name, &path, &mut envelope)?;
    envelope
        .color(MapKey::Vertex(source), 1.0)
        .color(MapKey::Vertex(target), 1.0)
        .data("source", names.name(source))
        .data("target", names.name(target))
        .data("weighted", graph.has_weights())
        .data("path", links);
    if graph.has_weights() {
        envelope.data("totalWeight", round_to(total, COARSE));
    }
    envelope.build(graph)
}

pub(super) fn shortest_paths_from<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    method: ShortestPathMethod,
    source: VertexId,
) -> Result<ResponseEnvelope> {
    let (_, name) = method_names(method);
    require_vertex(graph, source)?;
    let paths = invoke(name, backend.shortest_paths_from(graph.view(), method, source))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(name, Mode::ShadeError);
    let mut visits: BTreeMap<VertexId, u64> = BTreeMap::new();
    let mut rows = Vec::new();
    for path in &paths {
        // Unreachable targets and the source itself have nothing to show.
        let Some(&destination) = path.vertices.last() else {
            continue;
        };
        if destination == source {
            continue;
        }

        let mut weight = 0.0;
        for (step, pair) in path.vertices.windows(2).enumerate() {
            envelope.color(stored_edge_key(graph, pair[0], pair[1]), 1.0);
            if let Some(w) = step_weight(graph, name, path, step)? {
                weight += w;
            }
        }
        for &vertex in path.vertices.iter().filter(|&&v| v != source) {
            *visits.entry(vertex).or_default() += 1;
        }

        let mut row = Map::new();
        row.insert("target".into(), names.name(destination).into());
        row.insert(
            "path".into(),
            path.vertices.iter().map(|&v| names.name(v)).collect(),
        );
        if graph.has_weights() {
            row.insert("weight".into(), round_to(weight, COARSE).into());
        }
        rows.push(JsonValue::Object(row));
    }

    for (vertex, shade) in frequencies_to_ratio(visits) {
        envelope.color(MapKey::Vertex(vertex), shade);
    }
    envelope
        .color(MapKey::Vertex(source), 1.0)
        .data("source", names.name(source))
        .data("weighted", graph.has_weights())
        .data("paths", rows);
    envelope.build(graph)
}

pub(super) fn k_shortest_paths<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    source: VertexId,
    target: VertexId,
    k: u32,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Yen's k Shortest Paths";
    require_vertex(graph, source)?;
    require_vertex(graph, target)?;
    let paths = invoke(NAME, backend.k_shortest_paths(graph.view(), source, target, k))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut rows = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let (_, weight) = path_links(graph, NAME, path, &mut envelope)?;

        let mut row = Map::new();
        row.insert("num".into(), (index + 1).into());
        row.insert(
            "path".into(),
            path.vertices.iter().map(|&v| names.name(v)).collect(),
        );
        if graph.has_weights() {
            row.insert("weight".into(), round_to(weight, COARSE).into());
        }
        rows.push(JsonValue::Object(row));
    }

    envelope
        .color(MapKey::Vertex(source), 1.0)
        .color(MapKey::Vertex(target), 1.0)
        .data("source", names.name(source))
        .data("target", names.name(target))
        .data("k", k)
        .data("weighted", graph.has_weights())
        .data("paths", rows);
    envelope.build(graph)
}

pub(super) fn bfs<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    source: VertexId,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Breadth-First Search";
    require_vertex(graph, source)?;
    let tree = invoke(NAME, backend.bfs(graph.view(), source))?;
    let names = graph.names();

    let bounds_ok = tree.layers.windows(2).all(|w| w[0] <= w[1])
        && tree.layers.first().map_or(tree.order.is_empty(), |&first| first == 0)
        && tree.layers.last().map_or(true, |&last| last == tree.order.len());
    if !bounds_ok {
        return Err(backend_fault(
            NAME,
            "layer boundaries do not partition the visit order".into(),
        ));
    }

    // Each vertex is shaded by how many vertices were still undiscovered when
    // its layer started, so the source is darkest.
    let total = u64::from(graph.vertex_count());
    let mut remaining: BTreeMap<VertexId, u64> = BTreeMap::new();
    let mut layers = Vec::new();
    for (index, bounds) in tree.layers.windows(2).enumerate() {
        let members = &tree.order[bounds[0]..bounds[1]];
        let undiscovered = total.saturating_sub(bounds[0] as u64);
        for &vertex in members {
            remaining.insert(vertex, undiscovered);
        }
        layers.push(json!({
            "layer": members.iter().map(|&v| names.name(v)).collect::<Vec<_>>(),
            "index": index,
        }));
    }

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeError);
    for (vertex, shade) in frequencies_to_ratio(remaining) {
        envelope.color(MapKey::Vertex(vertex), shade);
    }
    envelope
        .data("source", names.name(source))
        .data("nodesFound", tree.order.len())
        .data("layers", layers);
    envelope.build(graph)
}

pub(super) fn dfs<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    source: VertexId,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Depth-First Search";
    require_vertex(graph, source)?;
    let order = invoke(NAME, backend.dfs(graph.view(), source))?;
    if let Some(&bad) = order
        .discovery
        .iter()
        .chain(order.finish.iter())
        .find(|&&v| !graph.contains_vertex(v))
    {
        return Err(backend_fault(NAME, format!("visited unknown vertex {bad}")));
    }
    let names = graph.names();

    // A subtree closes each time a not-yet-claimed vertex finishes: it holds
    // every unclaimed vertex discovered up to and including that one.
    let mut visited = vec![false; graph.vertex_count() as usize];
    let mut rank: BTreeMap<VertexId, u64> = BTreeMap::new();
    let mut subtrees = Vec::new();
    let mut cursor = 0;
    for &closing in &order.finish {
        if visited[closing as usize] {
            continue;
        }
        let mut tree = Vec::new();
        while let Some(&vertex) = order.discovery.get(cursor) {
            cursor += 1;
            if visited[vertex as usize] {
                continue;
            }
            visited[vertex as usize] = true;
            rank.insert(vertex, subtrees.len() as u64);
            tree.push(names.name(vertex));
            if vertex == closing {
                break;
            }
        }
        if !tree.is_empty() {
            subtrees.push(json!({"num": subtrees.len() + 1, "tree": tree}));
        }
    }

    // Earlier subtrees are darker.
    let count = subtrees.len() as u64;
    let shades = frequencies_to_ratio(
        rank.into_iter()
            .map(|(vertex, r)| (vertex, count - r + 1))
            .collect(),
    );

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeError);
    for (vertex, shade) in shades {
        envelope.color(MapKey::Vertex(vertex), shade);
    }
    envelope
        .data("source", names.name(source))
        .data("nodesFound", visited.iter().filter(|&&v| v).count())
        .data("subtrees", subtrees);
    envelope.build(graph)
}

pub(super) fn random_walk<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
    start: VertexId,
    steps: u32,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Random Walk";
    require_vertex(graph, start)?;
    let walk = invoke(NAME, backend.random_walk(graph.view(), start, steps))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let mut visits: BTreeMap<VertexId, u64> = BTreeMap::new();
    let (mut busiest, mut busiest_count) = (start, 0);
    let mut links = Vec::new();
    for (step, &vertex) in walk.vertices.iter().enumerate() {
        let count = visits.entry(vertex).or_default();
        *count += 1;
        if *count > busiest_count {
            busiest_count = *count;
            busiest = vertex;
        }

        let Some(&previous) = step.checked_sub(1).and_then(|i| walk.vertices.get(i)) else {
            continue;
        };
        envelope.color(stored_edge_key(graph, previous, vertex), 1.0);

        let mut link = Map::new();
        link.insert("step".into(), step.into());
        link.insert("from".into(), names.name(previous).into());
        link.insert("to".into(), names.name(vertex).into());
        if let Some(weight) = step_weight(graph, NAME, &walk, step - 1)? {
            link.insert("weight".into(), weight.into());
        }
        links.push(JsonValue::Object(link));
    }

    for (vertex, shade) in frequencies_to_ratio(visits) {
        envelope.color(MapKey::Vertex(vertex), shade);
    }
    envelope
        .data("source", names.name(start))
        .data("steps", steps)
        .data("weighted", graph.has_weights())
        .data("maxFrequencyNode", names.name(busiest))
        .data("maxFrequency", busiest_count)
        .data("path", links);
    envelope.build(graph)
}

pub(super) fn minimum_spanning_tree<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Minimum Spanning Tree";
    let tree = invoke(NAME, backend.minimum_spanning_tree(graph.view()))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeError);
    let mut rows = Vec::with_capacity(tree.len());
    let mut total = 0.0;
    for (index, &edge) in tree.iter().enumerate() {
        let (from, to) = graph
            .edge(edge)
            .ok_or_else(|| backend_fault(NAME, format!("unknown edge {edge}")))?;
        envelope
            .color(MapKey::Vertex(from), 0.5)
            .color(MapKey::Vertex(to), 0.5)
            .color(MapKey::Edge(from, to), 1.0);

        let mut link = Map::new();
        link.insert("num".into(), (index + 1).into());
        link.insert("from".into(), names.name(from).into());
        link.insert("to".into(), names.name(to).into());
        if let Some(weight) = graph.weight(edge) {
            link.insert("weight".into(), weight.into());
            total += weight;
        }
        rows.push(JsonValue::Object(link));
    }

    envelope
        .data("weighted", graph.has_weights())
        .data("maxEdges", graph.edge_count())
        .data("edges", rows);
    if graph.has_weights() {
        envelope.data("totalWeight", round_to(total, COARSE));
    }
    envelope.build(graph)
}

pub(super) fn diameter<A: GraphAlgorithms + ?Sized>(
    backend: &A,
    graph: &CanonicalGraph,
) -> Result<ResponseEnvelope> {
    const NAME: &str = "Diameter";
    let result = invoke(NAME, backend.diameter(graph.view()))?;
    let names = graph.names();

    let mut envelope = EnvelopeBuilder::new(NAME, Mode::ShadeDefault);
    let (links, _) = path_links(graph, NAME, &result.path, &mut envelope)?;
    envelope
        .color(MapKey::Vertex(result.source), 1.0)
        .color(MapKey::Vertex(result.target), 1.0)
        .data("source", names.name(result.source))
        .data("target", names.name(result.target))
        .data("weighted", graph.has_weights())
        .data("diameter", round_to(result.length, COARSE))
        .data("path", links);
    envelope.build(graph)
}
