use std::env;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use sidewinder_engine::{Engine, FeatureSchema, Network};
use sidewinder_proto::Handler;

/// Default cap on resident plus recycled evaluator instances.
const DEFAULT_MAX_MODELS: usize = 64;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let weights_path = env::args()
        .nth(1)
        .or_else(|| env::var("SIDEWINDER_WEIGHTS").ok());

    let net = match weights_path {
        Some(path) => {
            let net = Network::from_path(&path)
                .with_context(|| format!("loading weight bundle from {path}"))?;
            info!(path, features = net.feature_count(), "weight bundle loaded");
            Some(Arc::new(net))
        }
        None => {
            warn!("no weight bundle configured, serving heuristic-only");
            None
        }
    };

    let max_models = env::var("SIDEWINDER_MAX_MODELS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_MODELS);

    let engine = Engine::new(&FeatureSchema::standard(), net, max_models)
        .context("weight bundle does not match the feature schema")?;

    info!("sidewinder starting");
    let stdin = io::stdin();
    Handler::new(engine).run(stdin.lock(), io::stdout())?;
    Ok(())
}
