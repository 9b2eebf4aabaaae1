use graphlens_core::ingest::{DelimitedSource, GexfSource, GmlSource, JsonSource};
use graphlens_core::{EngineError, GraphSource, GraphStore, IngestionEngine};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn delimited(dir: &TempDir, nodes: &str, edges: &str, directed: bool) -> GraphSource {
    GraphSource::Delimited(DelimitedSource {
        nodes: write(dir, "nodes.csv", nodes),
        edges: write(dir, "edges.csv", edges),
        directed,
    })
}

#[test]
fn delimited_pair_installs_unweighted_graph() {
    let dir = TempDir::new().unwrap();
    let source = delimited(&dir, "Nodes\nA\nB\nC\n", "source,target\nA,B\nB,C\n", false);
    let mut store = GraphStore::new();

    let description = IngestionEngine::default().load(&mut store, &source).unwrap();

    let graph = store.current().unwrap();
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(!graph.has_weights());
    assert_eq!(description.nodes.len(), 3);
    assert_eq!(description.edges.len(), 2);
    assert!(!description.directed);
}

#[test]
fn singular_header_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let source = delimited(&dir, "Node\nA\n", "source,target\n", false);

    let err = IngestionEngine::default()
        .load(&mut GraphStore::new(), &source)
        .unwrap_err();
    assert!(matches!(err, EngineError::Format(_)), "{err}");
}

#[test]
fn weight_header_switches_on_weights() {
    let dir = TempDir::new().unwrap();
    let source = delimited(
        &dir,
        "nodes\nA\nB\nC\n",
        "source,target,weight\nA,B,2.5\nB,C\n",
        true,
    );
    let mut store = GraphStore::new();
    IngestionEngine::default().load(&mut store, &source).unwrap();

    let graph = store.current().unwrap();
    assert!(graph.is_directed());
    assert_eq!(graph.weights(), Some(&[2.5, 1.0][..]));
}

#[test]
fn unknown_endpoint_leaves_previous_graph_installed() {
    let dir = TempDir::new().unwrap();
    let engine = IngestionEngine::default();
    let mut store = GraphStore::new();
    engine
        .load(
            &mut store,
            &delimited(&dir, "nodes\nA\nB\n", "source,target\nA,B\n", false),
        )
        .unwrap();

    let broken = delimited(&dir, "nodes\nX\nY\nZ\n", "source,target\nX,W\n", true);
    let err = engine.load(&mut store, &broken).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let graph = store.current().unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert!(!graph.is_directed());
    assert_eq!(graph.names().name(1), "B");
}

#[test]
fn json_document_round_trips_shape() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "graph.json",
        r#"{"vertices": ["a", "b", 3, "c"], "links": [{"source": "a", "target": "c", "weight": 4}], "directed": true}"#,
    );
    let mut store = GraphStore::new();
    let description = IngestionEngine::default()
        .load(&mut store, &GraphSource::Json(JsonSource { path }))
        .unwrap();

    assert_eq!(description.nodes.len(), 3);
    assert_eq!(description.edges[0].target, 2);
    assert!(description.directed);
    assert_eq!(store.current().unwrap().weight(0), Some(4.0));
}

#[test]
fn json_without_direction_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "graph.json", r#"{"nodes": ["a"], "edges": []}"#);

    let err = IngestionEngine::default()
        .extract(&GraphSource::Json(JsonSource { path }))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn gexf_labels_become_names() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "graph.gexf",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gexf xmlns="http://gexf.net/1.3" version="1.3">
  <graph defaultedgetype="directed">
    <nodes>
      <node id="n0" label="Alpha"/>
      <node id="n1"/>
    </nodes>
    <edges>
      <edge id="0" source="n1" target="n0" weight="3"/>
    </edges>
  </graph>
</gexf>"#,
    );
    let mut store = GraphStore::new();
    IngestionEngine::default()
        .load(&mut store, &GraphSource::Gexf(GexfSource { path }))
        .unwrap();

    let graph = store.current().unwrap();
    assert!(graph.is_directed());
    assert_eq!(graph.names().name(0), "Alpha");
    assert_eq!(graph.names().name(1), "n1");
    assert_eq!(graph.edges(), &[(1, 0)]);
    assert_eq!(graph.weight(0), Some(3.0));
}

#[test]
fn gml_carries_attributes_through() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "graph.gml",
        r#"graph [
  directed 0
  node [ id 10 label "left" size 2.5 ]
  node [ id 20 label "right" size 1 ]
  edge [ source 10 target 20 kind "road" ]
]"#,
    );
    let mut store = GraphStore::new();
    IngestionEngine::default()
        .load(&mut store, &GraphSource::Gml(GmlSource { path }))
        .unwrap();

    let graph = store.current().unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.names().name(1), "right");
    assert!(!graph.has_weights());
    let columns: Vec<&str> = graph.edge_attributes().user_columns().map(|(n, _)| n).collect();
    assert_eq!(columns, vec!["kind"]);
}
