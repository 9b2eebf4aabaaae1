use anyhow::Context;
use graphlens_core::logging::init_logging;
use graphlens_core::{EngineConfig, GraphServer, NoAlgorithms};
use std::io;

fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialise logging")?;
    let config = EngineConfig::from_env().context("invalid configuration")?;

    // No algorithms backend is linked into this binary; analyses report
    // themselves unsupported while ingestion and description still work.
    let mut server = GraphServer::new(NoAlgorithms, config);
    server.serve(io::stdin().lock(), io::stdout().lock())
}
