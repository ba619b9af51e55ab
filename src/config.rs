// Configuration
// Figment-layered: struct defaults -> config.toml -> REPWATCH_* env vars.
// CLI flags override the extracted file config in main.
//
//   config.toml:   [server]
//                  http_port = 5000
//
//   env var:       REPWATCH_SERVER__HTTP_PORT=5000   (double underscore = nesting)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::CompletionPolicy;

/// Which channel the wearable pushes rep signals over
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExternalProtocol {
    /// Absolute-count JSON pushes to POST /count (last-write-wins)
    #[default]
    Http,
    /// Two-symbol TCP stream (edge-triggered, debounced)
    Socket,
}

/// Which scoring backend classifies frames
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Rule-based motion heuristic (no model artifact required)
    #[default]
    Heuristic,
    /// Pre-trained ONNX artifact (requires the `onnx` cargo feature)
    Onnx,
}

/// Top-level tunable configuration, deserialized by figment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub detector: DetectorSection,
    #[serde(default)]
    pub external: ExternalSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

/// Listen addresses (lives under `[server]` in config.toml)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_socket_port")]
    pub socket_port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            socket_port: default_socket_port(),
        }
    }
}

/// Rep detection tuning (lives under `[detector]`)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorSection {
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: f64,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            debounce_secs: default_debounce_secs(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// External device channel (lives under `[external]`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExternalSection {
    #[serde(default)]
    pub protocol: ExternalProtocol,
}

/// Session goals (lives under `[session]`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionSection {
    /// Optional rep target; completion is signaled exactly once per session
    #[serde(default)]
    pub target_count: Option<u64>,
    #[serde(default)]
    pub completion: CompletionPolicy,
}

/// Classifier backend selection (lives under `[classifier]`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    #[serde(default)]
    pub backend: BackendKind,
    /// Model artifact path; required (and only read) by the onnx backend
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    5000
}
fn default_socket_port() -> u16 {
    8080
}
fn default_debounce_secs() -> f64 {
    1.0
}
fn default_frame_interval_ms() -> u64 {
    100
}

/// Build a figment that layers: defaults -> config.toml -> REPWATCH_* env.
pub fn load_config(config_dir: &Path) -> figment::Figment {
    use figment::{
        providers::{Env, Format, Serialized, Toml},
        Figment,
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(config_dir.join("config.toml")))
        .merge(Env::prefixed("REPWATCH_").split("__"))
}

impl FileConfig {
    pub fn http_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.http_port).parse()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.socket_port).parse()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs_f64(self.detector.debounce_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.detector.frame_interval_ms)
    }
}
