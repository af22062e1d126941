use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::order::OrderIdx;

/// Where a vehicle stops: the depot or one of the orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StopNode {
    Depot,
    Order(OrderIdx),
}

impl StopNode {
    pub fn order(&self) -> Option<OrderIdx> {
        match self {
            StopNode::Depot => None,
            StopNode::Order(order) => Some(*order),
        }
    }

    pub fn is_depot(&self) -> bool {
        matches!(self, StopNode::Depot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Depot,
    Delivery,
    Pickup,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Depot => write!(f, "depot"),
            NodeKind::Delivery => write!(f, "delivery"),
            NodeKind::Pickup => write!(f, "pickup"),
        }
    }
}
