pub mod as_the_crow_flies;
pub mod distance_metric;
pub mod error;
pub mod travel_matrices;
pub mod travel_matrix_client;
pub mod travel_times;
pub mod units;
