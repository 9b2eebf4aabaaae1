//! Line-delimited JSON-RPC front end over one graph session.

use crate::algorithms::GraphAlgorithms;
use crate::analysis::{AnalysisRequest, Analyzer, ALGORITHMS};
use crate::attributes::AttributeTable;
use crate::config::EngineConfig;
use crate::encoder::prediction_defaults;
use crate::ingest::{demo, GraphSource, IngestionEngine};
use crate::rpc::{RpcError, RpcRequest, RpcResponse};
use crate::store::GraphStore;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

type Reply = std::result::Result<JsonValue, RpcError>;

pub const METHODS: [&str; 9] = [
    "initialize",
    "graph/load",
    "graph/demo",
    "graph/describe",
    "graph/attributes",
    "graph/release",
    "analysis/list",
    "analysis/run",
    "prediction/defaults",
];

/// Owns the session state: the live graph, the adapters that replace it and
/// the analyzer that reads it.
pub struct GraphServer<A> {
    store: GraphStore,
    ingestion: IngestionEngine,
    analyzer: Analyzer<A>,
}

impl<A: GraphAlgorithms> GraphServer<A> {
    pub fn new(backend: A, config: EngineConfig) -> Self {
        Self {
            store: GraphStore::with_limit(config.max_vertices),
            ingestion: IngestionEngine::new(config),
            analyzer: Analyzer::new(backend),
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn handle(&mut self, request: RpcRequest) -> RpcResponse {
        debug!(method = %request.method, "handling request");
        match self.dispatch(&request.method, request.params) {
            Ok(result) => RpcResponse::success(request.id, result),
            Err(error) => {
                debug!(code = error.code, message = %error.message, "request failed");
                RpcResponse::failure(request.id, error)
            }
        }
    }

    fn dispatch(&mut self, method: &str, params: Option<JsonValue>) -> Reply {
        match method {
            "initialize" => Ok(json!({
                "serverInfo": {
                    "name": "graphlens",
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "methods": METHODS,
            })),
            "graph/load" => {
                let source: GraphSource = parse_params(params)?;
                let description = self.ingestion.load(&mut self.store, &source)?;
                to_value(description)
            }
            "graph/demo" => {
                let description = self.store.install(demo::european_cities())?.describe();
                to_value(description)
            }
            "graph/describe" => to_value(self.store.describe()?),
            "graph/attributes" => {
                let graph = self.store.current()?;
                Ok(json!({
                    "vertex": columns(graph.vertex_attributes()),
                    "edge": columns(graph.edge_attributes()),
                }))
            }
            "graph/release" => {
                let released = self.store.is_loaded();
                self.store.release();
                Ok(json!({ "released": released }))
            }
            "analysis/list" => Ok(json!({ "algorithms": ALGORITHMS })),
            "analysis/run" => {
                let request: AnalysisRequest = parse_params(params)?;
                let envelope = self.analyzer.run(self.store.current()?, &request)?;
                to_value(envelope)
            }
            "prediction/defaults" => {
                let graph = self.store.current()?;
                to_value(prediction_defaults(graph.vertex_count(), graph.edge_count()))
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    /// Answers one request per input line until `reader` is exhausted.
    /// Lines that are not JSON-RPC requests are skipped.
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> anyhow::Result<()> {
        info!("serving JSON-RPC on stdio");
        for line in reader.lines() {
            let line = line.context("failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            let request: RpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(err) => {
                    warn!(error = %err, "skipping malformed request line");
                    continue;
                }
            };

            let response = self.handle(request);
            let encoded = serde_json::to_string(&response).context("failed to encode response")?;
            writeln!(writer, "{encoded}").context("failed to write response")?;
            writer.flush().context("failed to flush response")?;
        }
        info!("input closed");
        Ok(())
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<JsonValue>) -> std::result::Result<T, RpcError> {
    serde_json::from_value(params.unwrap_or(JsonValue::Null)).map_err(RpcError::invalid_params)
}

fn to_value<T: serde::Serialize>(value: T) -> Reply {
    serde_json::to_value(value).map_err(|err| RpcError {
        code: crate::rpc::ENGINE_ERROR,
        message: format!("failed to encode result: {err}"),
        data: None,
    })
}

fn columns(table: &AttributeTable) -> Vec<JsonValue> {
    table
        .user_columns()
        .map(|(name, kind)| json!({ "name": name, "type": kind }))
        .collect()
}
