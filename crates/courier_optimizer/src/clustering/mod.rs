use crate::problem::{location::Location, order::OrderIdx};

pub mod sweep;

/// Splits orders into groups small enough for one solver call.
/// Every input order ends up in exactly one cluster.
pub trait Partitioner: Send + Sync {
    fn partition(&self, depot: &Location, orders: &[(OrderIdx, Location)]) -> Vec<Vec<OrderIdx>>;
}
