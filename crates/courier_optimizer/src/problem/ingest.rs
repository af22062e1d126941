use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::problem::{
    depot::Depot,
    error::{InvalidOrder, OrderCollection, OrderValidationError},
    order::{DEFAULT_CARRYFORWARD_PENALTY, Order, OrderBuilder},
    stop_node::NodeKind,
    time_window::TimeWindow,
};

/// An order record as it arrives from upstream systems. Everything is optional
/// so that bad records can be reported instead of failing deserialization.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub external_ref: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub volume: f64,
    pub kind: Option<NodeKind>,
    pub time_window: Option<RawTimeWindow>,
    pub carryforward_penalty: Option<i64>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, Default)]
pub struct RawTimeWindow {
    pub earliest: Option<jiff::Timestamp>,
    pub latest: Option<jiff::Timestamp>,
}

#[derive(Debug, Clone)]
pub struct Ingested {
    pub depot: Depot,
    pub orders: Vec<Order>,
    pub rejected: Vec<InvalidOrder>,
}

impl RawOrder {
    pub fn into_order(
        self,
        expected: NodeKind,
        default_penalty: i64,
    ) -> Result<Order, OrderValidationError> {
        let kind = self.kind.unwrap_or(expected);
        if kind == NodeKind::Depot {
            return Err(OrderValidationError::DepotKind);
        }
        if kind != expected {
            return Err(OrderValidationError::KindMismatch {
                expected,
                actual: kind,
            });
        }

        let mut builder = OrderBuilder::default();
        builder
            .set_kind(kind)
            .set_volume(self.volume)
            .set_carryforward_penalty(self.carryforward_penalty.unwrap_or(default_penalty));

        if let Some(latitude) = self.latitude {
            builder.set_latitude(latitude);
        }
        if let Some(longitude) = self.longitude {
            builder.set_longitude(longitude);
        }
        if let Some(external_ref) = self.external_ref {
            builder.set_external_ref(external_ref);
        }
        if let Some(window) = self.time_window {
            builder.set_time_window(TimeWindow::new(window.earliest, window.latest)?);
        }

        builder.build()
    }
}

pub fn ingest(depot: Depot, deliveries: Vec<RawOrder>, pickups: Vec<RawOrder>) -> Ingested {
    ingest_with_default_penalty(depot, deliveries, pickups, DEFAULT_CARRYFORWARD_PENALTY)
}

/// Builds orders from raw records. Each bad record is rejected on its own and
/// the rest of the batch goes through.
#[instrument(skip_all, level = "debug")]
pub fn ingest_with_default_penalty(
    depot: Depot,
    deliveries: Vec<RawOrder>,
    pickups: Vec<RawOrder>,
    default_penalty: i64,
) -> Ingested {
    let mut orders = Vec::with_capacity(deliveries.len() + pickups.len());
    let mut rejected = Vec::new();

    let collections = [
        (OrderCollection::Deliveries, NodeKind::Delivery, deliveries),
        (OrderCollection::Pickups, NodeKind::Pickup, pickups),
    ];

    for (collection, expected, records) in collections {
        for (position, record) in records.into_iter().enumerate() {
            match record.into_order(expected, default_penalty) {
                Ok(order) => orders.push(order),
                Err(reason) => {
                    let error = InvalidOrder {
                        collection,
                        position,
                        reason,
                    };
                    warn!("{error}");
                    rejected.push(error);
                }
            }
        }
    }

    info!(
        accepted = orders.len(),
        rejected = rejected.len(),
        "Ingested orders"
    );

    Ingested {
        depot,
        orders,
        rejected,
    }
}
