use schemars::JsonSchema;
use serde::Serialize;

/// `Unsolved -> Solved -> Executing <-> Rerouting`. A successful reroute lands
/// back in `Solved`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, JsonSchema, Default)]
pub enum SessionState {
    #[default]
    Unsolved,
    Solved,
    Executing,
    Rerouting,
}

impl SessionState {
    pub fn can_solve(self) -> bool {
        matches!(self, SessionState::Unsolved | SessionState::Solved)
    }

    pub fn can_execute(self) -> bool {
        matches!(self, SessionState::Solved | SessionState::Executing)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unsolved => write!(f, "unsolved"),
            SessionState::Solved => write!(f, "solved"),
            SessionState::Executing => write!(f, "executing"),
            SessionState::Rerouting => write!(f, "rerouting"),
        }
    }
}
