use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Unsupported distance metric: {0}")]
    UnsupportedMetric(String),

    #[error("Matrix has {actual} entries, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Routing graph source failed: {0}")]
    GraphSource(#[source] anyhow::Error),
}
