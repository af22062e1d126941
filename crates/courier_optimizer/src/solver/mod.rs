pub mod assignment;
pub mod insertion_solver;
pub mod relocate;
pub mod route_evaluator;
pub mod routing_solver;
pub mod search_state;
