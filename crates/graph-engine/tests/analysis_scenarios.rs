use graphlens_core::algorithms::{CollaboratorResult, Partition, Path, ShortestPathMethod};
use graphlens_core::envelope::MapKey;
use graphlens_core::{
    AnalysisRequest, Analyzer, EngineError, GraphAlgorithms, GraphInstallation, GraphStore,
    GraphView, Mode, VertexId,
};
use serde_json::json;
use std::cell::RefCell;

/// Answers from fixed data and remembers which operations were asked for.
#[derive(Default)]
struct Recording {
    calls: RefCell<Vec<&'static str>>,
}

impl Recording {
    fn record(&self, operation: &'static str) {
        self.calls.borrow_mut().push(operation);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl GraphAlgorithms for Recording {
    fn degree(&self, graph: GraphView<'_>) -> CollaboratorResult<Vec<u32>> {
        self.record("degree");
        let mut degrees = vec![0; graph.vertex_count as usize];
        for &(from, to) in graph.edges {
            if from != to {
                degrees[from as usize] += 1;
                if !graph.directed {
                    degrees[to as usize] += 1;
                }
            }
        }
        Ok(degrees)
    }

    fn closeness(&self, _graph: GraphView<'_>) -> CollaboratorResult<Vec<f64>> {
        self.record("closeness");
        Ok(vec![0.5, f64::NAN, 1.0])
    }

    fn louvain(&self, _graph: GraphView<'_>, _resolution: f64) -> CollaboratorResult<Partition> {
        self.record("louvain");
        Ok(Partition {
            membership: vec![1, 0, 1],
            modularity: 0.123456,
        })
    }

    fn random_walk(
        &self,
        _graph: GraphView<'_>,
        _start: VertexId,
        _steps: u32,
    ) -> CollaboratorResult<Path> {
        self.record("random_walk");
        Ok(Path {
            vertices: vec![0, 1, 2, 1, 0, 2],
            edges: vec![],
        })
    }

    fn shortest_path(
        &self,
        _graph: GraphView<'_>,
        _method: ShortestPathMethod,
        _source: VertexId,
        _target: VertexId,
    ) -> CollaboratorResult<Path> {
        self.record("shortest_path");
        // Vertex 7 does not exist.
        Ok(Path {
            vertices: vec![0, 7],
            edges: vec![0],
        })
    }
}

fn abc(directed: bool) -> GraphStore {
    let mut store = GraphStore::new();
    store
        .install(GraphInstallation::named(
            vec!["A".into(), "B".into(), "C".into()],
            vec![(0, 1), (1, 2)],
            None,
            directed,
        ))
        .unwrap();
    store
}

fn triangle() -> GraphStore {
    let mut store = GraphStore::new();
    store
        .install(GraphInstallation::named(
            vec!["A".into(), "B".into(), "C".into()],
            vec![(0, 1), (1, 2), (2, 0)],
            None,
            false,
        ))
        .unwrap();
    store
}

#[test]
fn community_detection_on_directed_graph_never_reaches_backend() {
    let store = abc(true);
    let analyzer = Analyzer::new(Recording::default());

    let err = analyzer
        .run(
            store.current().unwrap(),
            &AnalysisRequest::Louvain { resolution: 1.0 },
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert!(err.to_string().contains("Louvain"));
    assert!(analyzer.backend().calls().is_empty());
}

#[test]
fn louvain_groups_names_by_community() {
    let store = abc(false);
    let analyzer = Analyzer::new(Recording::default());
    let envelope = analyzer
        .run(
            store.current().unwrap(),
            &AnalysisRequest::Louvain { resolution: 1.0 },
        )
        .unwrap();

    assert_eq!(envelope.mode, Mode::Rainbow);
    assert_eq!(envelope.data["communities"], json!([["B"], ["A", "C"]]));
    assert_eq!(envelope.data["modularity"], json!(0.12));
    assert_eq!(analyzer.backend().calls(), vec!["louvain"]);
}

#[test]
fn equally_visited_vertices_share_full_shade() {
    let store = triangle();
    let analyzer = Analyzer::new(Recording::default());
    let envelope = analyzer
        .run(
            store.current().unwrap(),
            &AnalysisRequest::RandomWalk {
                source: 0,
                steps: 5,
            },
        )
        .unwrap();

    let colors = envelope.color_map.unwrap();
    for v in 0..3 {
        assert_eq!(colors.get(&MapKey::Vertex(v)), Some(1.0));
    }
    assert_eq!(envelope.data["maxFrequency"], json!(2));
    assert_eq!(envelope.data["weighted"], json!(false));
}

#[test]
fn degree_sizes_span_the_scale() {
    let store = abc(false);
    let analyzer = Analyzer::new(Recording::default());
    let envelope = analyzer
        .run(store.current().unwrap(), &AnalysisRequest::Degree)
        .unwrap();

    let sizes = envelope.size_map.unwrap();
    assert_eq!(sizes.get(&MapKey::Vertex(1)), Some(30.0));
    assert_eq!(sizes.get(&MapKey::Vertex(0)), Some(17.5));
    assert_eq!(
        envelope.data["centralities"][1],
        json!({"id": 1, "node": "B", "centrality": 2.0})
    );
}

#[test]
fn undefined_closeness_scales_as_minimum() {
    let store = abc(false);
    let analyzer = Analyzer::new(Recording::default());
    let envelope = analyzer
        .run(store.current().unwrap(), &AnalysisRequest::Closeness)
        .unwrap();

    let sizes = envelope.size_map.unwrap();
    assert_eq!(sizes.get(&MapKey::Vertex(1)), Some(5.0));
    assert_eq!(sizes.get(&MapKey::Vertex(2)), Some(30.0));
}

#[test]
fn results_naming_unknown_vertices_are_collaborator_errors() {
    let store = abc(false);
    let analyzer = Analyzer::new(Recording::default());
    let err = analyzer
        .run(
            store.current().unwrap(),
            &AnalysisRequest::ShortestPath {
                method: ShortestPathMethod::Dijkstra,
                source: 0,
                target: 2,
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), "collaborator");
}

#[test]
fn unsupported_operation_is_reported_by_name() {
    let store = abc(false);
    let analyzer = Analyzer::new(Recording::default());
    let err = analyzer
        .run(store.current().unwrap(), &AnalysisRequest::Betweenness)
        .unwrap_err();

    assert_eq!(err.kind(), "collaborator");
    assert!(err.to_string().contains("betweenness"));
}
