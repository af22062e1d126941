pub mod depot;
pub mod error;
pub mod fleet;
pub mod generator;
pub mod ingest;
pub mod location;
pub mod order;
pub mod stop_node;
pub mod time_window;
pub mod vehicle;
pub mod volume;
