pub mod clustering;
pub mod json;
pub mod model;
pub mod problem;
pub mod routes;
pub mod session;
pub mod solver;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
