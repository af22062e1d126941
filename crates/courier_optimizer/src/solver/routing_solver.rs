use thiserror::Error;

use crate::{model::routing_model::RoutingModel, solver::assignment::Assignment};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("No solution found: {0}")]
    NoSolution(String),
}

/// Boundary to the combinatorial search. Implementations must return within the
/// model's time limit, with the best incumbent they have.
pub trait RoutingSolver: Send + Sync {
    fn solve(&self, model: &RoutingModel) -> Result<Assignment, SolveError>;
}
