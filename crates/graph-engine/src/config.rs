use crate::error::{EngineError, Result};
use std::env;

/// Largest vertex count the algorithms backend can address (32-bit signed IDs).
pub const DEFAULT_MAX_VERTICES: u32 = 0x7fff_ffff;

const SEED_ENV: &str = "GRAPHLENS_RANDOM_SEED";
const MAX_VERTICES_ENV: &str = "GRAPHLENS_MAX_VERTICES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed for the synthetic generator. `None` draws from OS entropy.
    pub random_seed: Option<u64>,
    pub max_vertices: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            max_vertices: DEFAULT_MAX_VERTICES,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(SEED_ENV) {
            let seed = raw.trim().parse::<u64>().map_err(|e| {
                EngineError::validation(format!("{SEED_ENV} must be an unsigned integer: {e}"))
            })?;
            config.random_seed = Some(seed);
        }

        if let Some(raw) = lookup(MAX_VERTICES_ENV) {
            let max = raw.trim().parse::<u32>().map_err(|e| {
                EngineError::validation(format!(
                    "{MAX_VERTICES_ENV} must be an unsigned integer: {e}"
                ))
            })?;
            if max == 0 || max > DEFAULT_MAX_VERTICES {
                return Err(EngineError::validation(format!(
                    "{MAX_VERTICES_ENV} must lie in [1, {DEFAULT_MAX_VERTICES}]"
                )));
            }
            config.max_vertices = max;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn reads_seed_and_limit() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("GRAPHLENS_RANDOM_SEED", "42"),
            ("GRAPHLENS_MAX_VERTICES", " 1000 "),
        ]))
        .unwrap();
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(config.max_vertices, 1000);
    }

    #[test]
    fn malformed_value_names_the_variable() {
        let err = EngineConfig::from_lookup(lookup(&[("GRAPHLENS_RANDOM_SEED", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("GRAPHLENS_RANDOM_SEED"));
    }

    #[test]
    fn zero_vertex_limit_is_rejected() {
        assert!(EngineConfig::from_lookup(lookup(&[("GRAPHLENS_MAX_VERTICES", "0")])).is_err());
    }
}
