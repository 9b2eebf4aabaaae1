use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::GraphDescription;
use crate::store::{GraphInstallation, GraphStore};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info_span};

pub mod delimited;
pub mod demo;
pub mod generator;
pub mod gexf;
pub mod gml;
pub mod json;
pub mod records;

pub use delimited::DelimitedSource;
pub use generator::RandomGraph;
pub use gexf::GexfSource;
pub use gml::GmlSource;
pub use json::JsonSource;
pub use records::{EdgeRecord, NodeRecord, RecordSet};

/// Turns one external input into a complete installation without touching
/// the live graph.
pub trait Extractor {
    fn extract(&self) -> Result<GraphInstallation>;
}

/// Every supported input, tagged by format.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum GraphSource {
    Delimited(DelimitedSource),
    Json(JsonSource),
    Gexf(GexfSource),
    Gml(GmlSource),
    Random(RandomGraph),
    Records(RecordSet),
}

impl GraphSource {
    pub fn format_name(&self) -> &'static str {
        match self {
            GraphSource::Delimited(_) => "delimited",
            GraphSource::Json(_) => "json",
            GraphSource::Gexf(_) => "gexf",
            GraphSource::Gml(_) => "gml",
            GraphSource::Random(_) => "random",
            GraphSource::Records(_) => "records",
        }
    }
}

pub struct IngestionEngine {
    config: EngineConfig,
}

impl Default for IngestionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl IngestionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, source: &GraphSource) -> Result<GraphInstallation> {
        match source {
            GraphSource::Delimited(s) => s.extract(),
            GraphSource::Json(s) => s.extract(),
            GraphSource::Gexf(s) => s.extract(),
            GraphSource::Gml(s) => s.extract(),
            GraphSource::Random(g) => {
                // Checked before generation, which draws up to n^2 edges.
                if g.vertices > self.config.max_vertices {
                    return Err(EngineError::validation(format!(
                        "Graph has {} vertices, the limit is {}",
                        g.vertices, self.config.max_vertices
                    )));
                }
                RandomGraph {
                    seed: g.seed.or(self.config.random_seed),
                    ..g.clone()
                }
                .extract()
            }
            GraphSource::Records(r) => r.extract(),
        }
    }

    /// Parses `source` completely, then swaps it in as the current graph.
    pub fn load(&self, store: &mut GraphStore, source: &GraphSource) -> Result<GraphDescription> {
        let span = info_span!("ingest", format = source.format_name());
        let _guard = span.enter();

        let installation = self.extract(source)?;
        debug!(
            vertices = installation.vertex_count,
            edges = installation.edges.len(),
            "parsed input"
        );
        Ok(store.install(installation)?.describe())
    }
}

/// Reads a whole input file; the handle is closed before parsing starts.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EngineError::Resource {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
