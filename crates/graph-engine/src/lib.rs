//! Canonical graph store, format adapters and visualization-envelope encoder
//! for interactive graph analysis.
//!
//! The algorithms themselves live behind [`algorithms::GraphAlgorithms`];
//! this crate prepares the graph they run on and turns their raw answers
//! into the colour/size maps a renderer draws.

pub mod algorithms;
pub mod analysis;
pub mod attributes;
pub mod config;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod gml;
pub mod graph;
pub mod ingest;
pub mod logging;
pub mod rpc;
pub mod server;
pub mod store;

pub use algorithms::{GraphAlgorithms, NoAlgorithms};
pub use analysis::{AnalysisRequest, Analyzer};
pub use config::EngineConfig;
pub use envelope::{Mode, ResponseEnvelope};
pub use error::{CollaboratorError, EngineError, Result};
pub use graph::{CanonicalGraph, EdgeId, GraphView, VertexId};
pub use ingest::{GraphSource, IngestionEngine};
pub use server::GraphServer;
pub use store::{GraphInstallation, GraphStore};
