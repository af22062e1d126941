use thiserror::Error;

use crate::problem::{order::OrderStatus, stop_node::NodeKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderValidationError {
    #[error("missing coordinates")]
    MissingCoordinates,

    #[error("coordinates are not finite numbers")]
    NonFiniteCoordinates,

    #[error("volume {0} is negative or not finite")]
    InvalidVolume(f64),

    #[error("an order cannot be of kind depot")]
    DepotKind,

    #[error("kind {actual} does not belong to the {expected} collection")]
    KindMismatch { expected: NodeKind, actual: NodeKind },

    #[error("time window ends before it starts")]
    InvertedTimeWindow,

    #[error("carryforward penalty {0} must be positive")]
    InvalidPenalty(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCollection {
    Deliveries,
    Pickups,
    Dynamic,
}

impl std::fmt::Display for OrderCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderCollection::Deliveries => write!(f, "deliveries"),
            OrderCollection::Pickups => write!(f, "pickups"),
            OrderCollection::Dynamic => write!(f, "dynamic orders"),
        }
    }
}

/// A raw order record rejected at the ingestion boundary.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid order #{position} in {collection}: {reason}")]
pub struct InvalidOrder {
    pub collection: OrderCollection,
    pub position: usize,
    #[source]
    pub reason: OrderValidationError,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Invalid order status transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}
