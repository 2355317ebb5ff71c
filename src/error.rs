use thiserror::Error;

/// Errors surfaced by layout, rebuild and the WASM boundary.
///
/// Degenerate input (no children, zero sizes) is not an error: it lays out
/// to a chart with nothing visible.
#[derive(Debug, Error)]
pub enum SunburstError {
    #[error("invalid size {size} at '{path}': sizes must be finite and non-negative")]
    InvalidSize { path: String, size: f64 },

    #[error("criterion '{0}' is not present in any node's metrics")]
    UnknownCriterion(String),

    #[error("no node with id {0}")]
    UnknownNode(usize),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),
    #[error("chart is already mounted on '{0}'")]
    AlreadyMounted(String),
}

pub type Result<T> = std::result::Result<T, SunburstError>;
