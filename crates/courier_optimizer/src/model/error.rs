use courier_matrix_providers::error::MatrixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Nothing to solve: {0}")]
    EmptyProblem(&'static str),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
