use courier_matrix_providers::error::MatrixError;
use thiserror::Error;

use crate::{
    model::error::BuildError,
    problem::{
        error::{InvalidOrder, InvalidTransition},
        vehicle::VehicleIdx,
    },
    session::session_state::SessionState,
    solver::routing_solver::SolveError,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    InvalidOrder(#[from] InvalidOrder),

    /// Unsupported metric or a malformed external matrix.
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("Nothing to solve: {0}")]
    EmptyProblem(&'static str),

    #[error("No solution found: {0}")]
    NoSolutionFound(String),

    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Vehicles are already on the road, reroute instead")]
    ExecutionStarted,

    #[error("Vehicle {0} has no route")]
    NoRoute(VehicleIdx),

    #[error("Unknown vehicle {0}")]
    UnknownVehicle(VehicleIdx),
}

impl From<BuildError> for SessionError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::EmptyProblem(reason) => SessionError::EmptyProblem(reason),
            BuildError::Matrix(error) => SessionError::Matrix(error),
        }
    }
}

impl From<SolveError> for SessionError {
    fn from(error: SolveError) -> Self {
        match error {
            SolveError::NoSolution(reason) => SessionError::NoSolutionFound(reason),
        }
    }
}
