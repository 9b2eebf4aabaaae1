use super::Extractor;
use crate::error::{EngineError, Result};
use crate::graph::VertexId;
use crate::store::GraphInstallation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Erdős–Rényi G(n, p) graph without self loops. Every edge gets a uniform
/// integer weight in `[1, 20]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomGraph {
    pub vertices: u32,
    pub probability: f64,
    #[serde(default)]
    pub directed: bool,
    /// Fixed seed for reproducible output; OS entropy otherwise.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RandomGraph {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl Extractor for RandomGraph {
    fn extract(&self) -> Result<GraphInstallation> {
        if self.vertices == 0 {
            return Err(EngineError::validation(
                "A random graph needs at least one vertex",
            ));
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(EngineError::validation(format!(
                "Edge probability must lie in [0, 1], got {}",
                self.probability
            )));
        }

        let mut rng = self.rng();
        let n = self.vertices as VertexId;
        let mut edges = Vec::new();
        for from in 0..n {
            let first = if self.directed { 0 } else { from + 1 };
            for to in (first..n).filter(|&to| to != from) {
                if rng.random_bool(self.probability) {
                    edges.push((from, to));
                }
            }
        }

        let weights = edges
            .iter()
            .map(|_| rng.random_range(1..=20) as f64)
            .collect();

        Ok(GraphInstallation::anonymous(
            self.vertices,
            edges,
            Some(weights),
            self.directed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn graph(vertices: u32, probability: f64, directed: bool) -> RandomGraph {
        RandomGraph {
            vertices,
            probability,
            directed,
            seed: Some(42),
        }
    }

    #[rstest]
    #[case(false, 10)]
    #[case(true, 20)]
    fn certain_edges_give_complete_graph(#[case] directed: bool, #[case] expected: usize) {
        let installation = graph(5, 1.0, directed).extract().unwrap();
        assert_eq!(installation.edges.len(), expected);
        assert!(installation.edges.iter().all(|(a, b)| a != b));
    }

    #[test]
    fn zero_probability_gives_no_edges() {
        let installation = graph(8, 0.0, false).extract().unwrap();
        assert!(installation.edges.is_empty());
        assert_eq!(installation.vertex_count, 8);
        assert_eq!(installation.weights, Some(vec![]));
    }

    #[test]
    fn weights_are_integers_between_one_and_twenty() {
        let installation = graph(30, 0.5, true).extract().unwrap();
        let weights = installation.weights.unwrap();
        assert_eq!(weights.len(), installation.edges.len());
        assert!(weights
            .iter()
            .all(|w| (1.0..=20.0).contains(w) && w.fract() == 0.0));
    }

    #[test]
    fn undirected_edges_are_stored_low_to_high() {
        let installation = graph(10, 0.7, false).extract().unwrap();
        assert!(installation.edges.iter().all(|(a, b)| a < b));
    }

    #[rstest]
    #[case(0, 0.5)]
    #[case(4, -0.1)]
    #[case(4, 1.5)]
    #[case(4, f64::NAN)]
    fn invalid_parameters_are_rejected(#[case] vertices: u32, #[case] probability: f64) {
        let err = graph(vertices, probability, false).extract().unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
