pub mod callbacks;
pub mod dimension;
pub mod error;
pub mod index_manager;
pub mod problem_builder;
pub mod routing_model;
pub mod search_parameters;
