//! Numeric scaling, rounding and grouping shared by every analysis.

use crate::envelope::MapKey;
use crate::graph::{CanonicalGraph, NameResolver, VertexId};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MIN_SCALE: f64 = 5.0;
pub const MAX_SCALE: f64 = 30.0;

/// Decimal places for coarse magnitudes (degree, betweenness, modularity).
pub const COARSE: usize = 2;
/// Decimal places for normalized ratios (closeness, eigenvector, pagerank).
pub const FINE: usize = 4;

/// Rounds to `digits` decimals by printing and re-parsing, so the value
/// serializes the same way on every platform.
pub fn round_to(value: f64, digits: usize) -> f64 {
    format!("{value:.digits$}").parse().unwrap_or(value)
}

/// Largest non-NaN value, or `None` when there is none.
pub fn max_ignoring_nan(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |max, v| Some(max.map_or(v, |m: f64| m.max(v))))
}

/// Maps `value` linearly from `[0, max]` onto `[MIN_SCALE, MAX_SCALE]`.
/// NaN counts as zero; a non-positive `max` pins everything to `MIN_SCALE`.
pub fn scale_size(value: f64, max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return MIN_SCALE;
    }
    let ratio = if value.is_nan() { 0.0 } else { (value / max).clamp(0.0, 1.0) };
    MIN_SCALE + (MAX_SCALE - MIN_SCALE) * ratio
}

/// Divides every value by the largest one. NaN maps to 0, and so does
/// everything when the maximum is not positive.
pub fn ratio_to_max<K: Ord>(values: BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    let max = max_ignoring_nan(values.values().copied()).unwrap_or(0.0);
    values
        .into_iter()
        .map(|(key, value)| {
            let scaled = if max > 0.0 && !value.is_nan() { value / max } else { 0.0 };
            (key, scaled)
        })
        .collect()
}

/// Visit counts scaled against the most frequent key.
pub fn frequencies_to_ratio<K: Ord>(counts: BTreeMap<K, u64>) -> BTreeMap<K, f64> {
    ratio_to_max(counts.into_iter().map(|(k, c)| (k, c as f64)).collect())
}

/// Inverts a membership array into group ID -> member names, both ascending.
pub fn group_members(membership: &[u32], names: &NameResolver<'_>) -> BTreeMap<u32, Vec<String>> {
    let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (vertex, &group) in membership.iter().enumerate() {
        groups
            .entry(group)
            .or_default()
            .push(names.name(vertex as VertexId));
    }
    groups
}

/// Key for the edge joining `a` and `b`, in the orientation the graph stores
/// it. Falls back to `a-b` when no such edge exists.
pub fn stored_edge_key(graph: &CanonicalGraph, a: VertexId, b: VertexId) -> MapKey {
    let (from, to) = graph
        .find_edge(a, b)
        .or_else(|| graph.find_edge(b, a))
        .and_then(|id| graph.edge(id))
        .unwrap_or((a, b));
    MapKey::Edge(from, to)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSize {
    Small,
    Medium,
    Large,
}

/// Sample and bin counts for missing-edge prediction, sized to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDefaults {
    pub graph_size: GraphSize,
    pub num_samples: u32,
    pub num_bins: u32,
}

pub fn prediction_defaults(vertices: u32, edges: usize) -> PredictionDefaults {
    let m = u32::try_from(edges).unwrap_or(u32::MAX);
    if vertices < 100 {
        PredictionDefaults {
            graph_size: GraphSize::Small,
            num_samples: 500,
            num_bins: 10,
        }
    } else if vertices <= 1000 {
        PredictionDefaults {
            graph_size: GraphSize::Medium,
            num_samples: 1000u32.saturating_add(m / 100),
            num_bins: 25,
        }
    } else {
        PredictionDefaults {
            graph_size: GraphSize::Large,
            num_samples: 5000u32.saturating_add(m / 50),
            num_bins: 50u32.saturating_add(m / 200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.123456, 2, 0.12)]
    #[case(0.125001, 2, 0.13)]
    #[case(2.0 / 3.0, 4, 0.6667)]
    #[case(7.0, 2, 7.0)]
    fn rounds_to_fixed_decimals(#[case] value: f64, #[case] digits: usize, #[case] expected: f64) {
        assert_eq!(round_to(value, digits), expected);
    }

    #[test]
    fn rounding_is_idempotent() {
        for v in [0.0, 1.25, -3.5, 0.3333, 123.4567] {
            let once = round_to(v, 4);
            assert_eq!(round_to(once, 4), once);
        }
    }

    #[test]
    fn nan_survives_rounding() {
        assert!(round_to(f64::NAN, 4).is_nan());
    }

    #[test]
    fn size_scaling_is_bounded_and_monotonic() {
        let max = 8.0;
        let mut previous = MIN_SCALE;
        for step in 0..=16 {
            let scaled = scale_size(step as f64 * 0.5, max);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&scaled));
            assert!(scaled >= previous);
            previous = scaled;
        }
        assert_eq!(scale_size(max, max), MAX_SCALE);
        assert_eq!(scale_size(0.0, max), MIN_SCALE);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn non_positive_max_pins_to_minimum(#[case] max: f64) {
        assert_eq!(scale_size(3.0, max), MIN_SCALE);
    }

    #[test]
    fn nan_value_scales_as_zero() {
        assert_eq!(scale_size(f64::NAN, 2.0), MIN_SCALE);
    }

    #[test]
    fn ratio_to_max_maps_max_to_one() {
        let scaled = ratio_to_max(BTreeMap::from([(1, 2.0), (2, 4.0), (3, f64::NAN)]));
        assert_eq!(scaled[&1], 0.5);
        assert_eq!(scaled[&2], 1.0);
        assert_eq!(scaled[&3], 0.0);
    }

    #[test]
    fn all_zero_values_stay_zero() {
        let scaled = ratio_to_max(BTreeMap::from([(1, 0.0), (2, 0.0)]));
        assert!(scaled.values().all(|v| *v == 0.0));
    }

    #[test]
    fn equal_frequencies_all_scale_to_one() {
        let scaled = frequencies_to_ratio(BTreeMap::from([(0, 3), (1, 3), (2, 3)]));
        assert!(scaled.values().all(|v| *v == 1.0));
    }

    #[test]
    fn max_ignores_nan() {
        assert_eq!(max_ignoring_nan([f64::NAN, 1.0, 3.0]), Some(3.0));
        assert_eq!(max_ignoring_nan([f64::NAN]), None);
    }

    #[test]
    fn groups_are_ordered_by_id_then_vertex() {
        let mut graph = CanonicalGraph::new(4, false);
        graph
            .vertex_attributes_mut()
            .insert_text_column("name", vec!["a".into(), "b".into(), "c".into(), "d".into()])
            .unwrap();
        let groups = group_members(&[2, 0, 2, 0], &graph.names());

        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec![
                (0, vec!["b".to_string(), "d".to_string()]),
                (2, vec!["a".to_string(), "c".to_string()]),
            ]
        );
    }

    #[test]
    fn stored_edge_key_follows_graph_orientation() {
        let mut graph = CanonicalGraph::new(3, true);
        graph.add_edge(2, 0).unwrap();
        assert_eq!(stored_edge_key(&graph, 0, 2), MapKey::Edge(2, 0));
        assert_eq!(stored_edge_key(&graph, 0, 1), MapKey::Edge(0, 1));
    }

    #[rstest]
    #[case(99, 10_000, GraphSize::Small, 500, 10)]
    #[case(100, 10_000, GraphSize::Medium, 1100, 25)]
    #[case(1000, 250, GraphSize::Medium, 1002, 25)]
    #[case(1001, 10_000, GraphSize::Large, 5200, 100)]
    fn prediction_defaults_by_size(
        #[case] vertices: u32,
        #[case] edges: usize,
        #[case] size: GraphSize,
        #[case] samples: u32,
        #[case] bins: u32,
    ) {
        let defaults = prediction_defaults(vertices, edges);
        assert_eq!(defaults.graph_size, size);
        assert_eq!(defaults.num_samples, samples);
        assert_eq!(defaults.num_bins, bins);
    }
}
