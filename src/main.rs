// repwatch entry point
// Wires the configuration, the classifier, the counting loops, and the
// network listeners together, then serves until shutdown.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::trace::TraceLayer;

use repwatch::classifier::{Backend, ClassifierAdapter, LabelMap, MotionHeuristic};
use repwatch::config::{self, BackendKind, ExternalProtocol, FileConfig};
use repwatch::detector::RepDetector;
use repwatch::display::{spawn_control, spawn_display, ConsoleSink};
use repwatch::listener::{self, socket, HttpState};
use repwatch::runtime::{
    spawn_acquisition, spawn_detection, FrameSlot, PostureCell, SyntheticFrameSource,
};
use repwatch::session::SessionAggregator;

#[derive(Parser, Debug)]
#[command(name = "repwatch", about = "Camera + wearable exercise rep counter")]
struct Args {
    /// Directory holding config.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the HTTP listener port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the wearable symbol-socket port
    #[arg(long)]
    socket_port: Option<u16>,

    /// Override the wearable channel protocol
    #[arg(long, value_enum)]
    protocol: Option<ExternalProtocol>,

    /// Override the classifier backend
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Override the classifier model artifact path
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Override the session rep target
    #[arg(long)]
    target_count: Option<u64>,
}

impl Args {
    fn apply(&self, fc: &mut FileConfig) {
        if let Some(host) = &self.host {
            fc.server.host = host.clone();
        }
        if let Some(port) = self.http_port {
            fc.server.http_port = port;
        }
        if let Some(port) = self.socket_port {
            fc.server.socket_port = port;
        }
        if let Some(protocol) = self.protocol {
            fc.external.protocol = protocol;
        }
        if let Some(backend) = self.backend {
            fc.classifier.backend = backend;
        }
        if let Some(path) = &self.model_path {
            fc.classifier.model_path = Some(path.clone());
        }
        if let Some(target) = self.target_count {
            fc.session.target_count = Some(target);
        }
    }
}

/// Build the configured scoring backend. A missing or unloadable model
/// artifact is a startup precondition failure, not a runtime fault.
fn build_backend(fc: &FileConfig) -> Result<Backend> {
    match fc.classifier.backend {
        BackendKind::Heuristic => Ok(Backend::Heuristic(MotionHeuristic::new())),
        #[cfg(feature = "onnx")]
        BackendKind::Onnx => {
            let path = fc
                .classifier
                .model_path
                .as_deref()
                .context("classifier.model_path is required for the onnx backend")?;
            let model = repwatch::classifier::OnnxModel::load(path)
                .with_context(|| format!("failed to load model artifact {}", path.display()))?;
            Ok(Backend::Onnx(model))
        }
        #[cfg(not(feature = "onnx"))]
        BackendKind::Onnx => {
            anyhow::bail!(
                "this build does not include the onnx backend (enable the `onnx` cargo feature)"
            )
        }
    }
}

/// Resolves when either Ctrl+C arrives or a loop set the shared flag
async fn wait_for_shutdown(shutdown: Arc<AtomicBool>) {
    let flag = async {
        while !shutdown.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("received shutdown signal");
        }
        _ = flag => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut fc: FileConfig = config::load_config(&args.config_dir)
        .extract()
        .context("invalid configuration")?;
    args.apply(&mut fc);

    let backend = build_backend(&fc)?;
    let adapter =
        ClassifierAdapter::new(backend, LabelMap::standard()).context("classifier setup failed")?;

    let aggregator = Arc::new(SessionAggregator::new(
        fc.session.target_count,
        fc.session.completion,
    ));
    let shutdown = Arc::new(AtomicBool::new(false));
    let slot = Arc::new(FrameSlot::new());
    let posture = Arc::new(PostureCell::new());

    // Frame source is a pluggable collaborator; the built-in synthetic
    // source keeps the pipeline running without capture hardware.
    log::info!("using synthetic frame source");
    let acquisition = spawn_acquisition(
        Box::new(SyntheticFrameSource::new()),
        Arc::clone(&slot),
        fc.frame_interval(),
        Arc::clone(&shutdown),
    );
    let detection = spawn_detection(
        adapter,
        RepDetector::new(fc.debounce()),
        Arc::clone(&slot),
        Arc::clone(&aggregator),
        Arc::clone(&posture),
        fc.frame_interval(),
        Arc::clone(&shutdown),
    );
    let display = spawn_display(
        Box::new(ConsoleSink),
        Arc::clone(&aggregator),
        Arc::clone(&posture),
        Duration::from_millis(200),
        Arc::clone(&shutdown),
    );
    spawn_control(Arc::clone(&aggregator), Arc::clone(&shutdown));

    if fc.external.protocol == ExternalProtocol::Socket {
        let addr = fc.socket_addr().context("invalid socket listener address")?;
        let symbol_listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind wearable socket on {}", addr))?;
        tokio::spawn(socket::serve(
            symbol_listener,
            Arc::clone(&aggregator),
            fc.debounce(),
            Arc::clone(&shutdown),
        ));
    }

    let accept_count = fc.external.protocol == ExternalProtocol::Http;
    let app = listener::router(
        HttpState {
            aggregator: Arc::clone(&aggregator),
        },
        accept_count,
    )
    .layer(TraceLayer::new_for_http());

    let http_addr = fc.http_addr().context("invalid HTTP listener address")?;
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", http_addr))?;
    let actual = http_listener.local_addr()?;

    log::info!("repwatch listening on http://{}", actual);
    if accept_count {
        log::info!("wearable should POST counts to http://{}/count", actual);
    }
    log::info!("  GET  /status - counter snapshot");
    log::info!("  POST /reset  - zero both counters");
    log::info!("press 'r'+Enter to reset, 'q'+Enter or Ctrl+C to exit");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(wait_for_shutdown(Arc::clone(&shutdown)))
        .await
        .context("server error")?;

    // Ask the loops to exit and wait for them
    shutdown.store(true, Ordering::SeqCst);
    for handle in [acquisition, detection, display] {
        if handle.join().is_err() {
            log::warn!("a worker thread panicked during shutdown");
        }
    }

    let s = aggregator.snapshot();
    log::info!(
        "session totals - camera: {}, external: {}, weighted: {}",
        s.camera_count,
        s.external_count,
        s.weighted
    );
    log::info!("shutdown complete");
    Ok(())
}
