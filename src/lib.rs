// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod freshness;
pub mod fs;
pub mod logging;
pub mod serve;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::engine::Engine;
use crate::exec::{GoToolchain, Toolchain};
use crate::freshness::{freshness_channel, FreshnessEndpoint};
use crate::fs::RealFileSystem;
use crate::serve::{HttpServer, Routes, StaticFiles};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + CLI overrides)
/// - the freshness channel shared by engine and server
/// - the HTTP server
/// - the engine (initial build, discovery, watcher, rebuild loop)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::resolve(&args)?;

    let (publisher, receiver) =
        freshness_channel(cfg.freshness.channel_capacity, cfg.poll_timeout());

    let toolchain: Arc<dyn Toolchain> = Arc::new(GoToolchain::new(
        cfg.toolchain.program.clone(),
        cfg.toolchain.env.clone(),
    ));

    let routes = Routes {
        freshness_path: cfg.serve.freshness_path.clone(),
        endpoint: FreshnessEndpoint::new(receiver),
        static_files: StaticFiles::new(cfg.serve.dir.clone(), Arc::new(RealFileSystem)),
    };
    let server = HttpServer::bind(cfg.listen_addr())?.spawn(routes, Handle::current());
    info!(
        dir = %cfg.serve.dir.display(),
        freshness_path = %cfg.serve.freshness_path,
        "serving static files"
    );

    let engine = Engine::new(toolchain, args.target.clone(), args.effective_build_flags());
    let outcome = match engine.start(publisher).await {
        Ok(running) => {
            info!(
                build_target = %running.target().path().display(),
                files = running.tracked_files(),
                "ready; edit a tracked file to rebuild"
            );
            running.run_until(shutdown_signal()).await
        }
        Err(e) => Err(e),
    };

    // Joining the accept thread blocks; keep it off the runtime workers.
    if let Err(e) = tokio::task::spawn_blocking(move || server.shutdown()).await {
        warn!(error = %e, "HTTP server did not shut down cleanly");
    }

    if let Err(e) = &outcome {
        error!(error = %e, "engine stopped");
    }
    outcome.map_err(Into::into)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, shutting down"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
