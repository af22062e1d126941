use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    define_index_newtype,
    problem::{
        error::{InvalidTransition, OrderValidationError},
        fleet::Fleet,
        location::Location,
        stop_node::NodeKind,
        time_window::TimeWindow,
        vehicle::VehicleIdx,
        volume::Volume,
    },
};

define_index_newtype!(OrderIdx, Order);

pub const DEFAULT_CARRYFORWARD_PENALTY: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Delivery,
    Pickup,
}

impl TryFrom<NodeKind> for OrderKind {
    type Error = OrderValidationError;

    fn try_from(kind: NodeKind) -> Result<Self, Self::Error> {
        match kind {
            NodeKind::Delivery => Ok(OrderKind::Delivery),
            NodeKind::Pickup => Ok(OrderKind::Pickup),
            NodeKind::Depot => Err(OrderValidationError::DepotKind),
        }
    }
}

impl From<OrderKind> for NodeKind {
    fn from(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Delivery => NodeKind::Delivery,
            OrderKind::Pickup => NodeKind::Pickup,
        }
    }
}

/// Lifecycle of an order. The responsible vehicle lives inside the variants
/// that require one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case", tag = "status", content = "vehicle")]
pub enum OrderStatus {
    #[default]
    Unrouted,
    Postponed,
    Scheduled(VehicleIdx),
    Succeeded(VehicleIdx),
    Failed(VehicleIdx),
}

impl OrderStatus {
    pub fn vehicle(&self) -> Option<VehicleIdx> {
        match self {
            OrderStatus::Unrouted | OrderStatus::Postponed => None,
            OrderStatus::Scheduled(vehicle)
            | OrderStatus::Succeeded(vehicle)
            | OrderStatus::Failed(vehicle) => Some(*vehicle),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Succeeded(_) | OrderStatus::Failed(_))
    }

    /// Orders a solve may (re)assign.
    pub fn is_candidate(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Unrouted => write!(f, "unrouted"),
            OrderStatus::Postponed => write!(f, "postponed"),
            OrderStatus::Scheduled(vehicle) => write!(f, "scheduled on vehicle {vehicle}"),
            OrderStatus::Succeeded(vehicle) => write!(f, "succeeded on vehicle {vehicle}"),
            OrderStatus::Failed(vehicle) => write!(f, "failed on vehicle {vehicle}"),
        }
    }
}

/// Result of visiting a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    Succeeded,
    Failed,
}

impl StopOutcome {
    pub fn status(self, vehicle: VehicleIdx) -> OrderStatus {
        match self {
            StopOutcome::Succeeded => OrderStatus::Succeeded(vehicle),
            StopOutcome::Failed => OrderStatus::Failed(vehicle),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    external_ref: Option<String>,
    location: Location,
    kind: OrderKind,
    volume: Volume,
    carryforward_penalty: i64,
    time_window: Option<TimeWindow>,
    status: OrderStatus,
}

impl Order {
    pub fn external_ref(&self) -> Option<&str> {
        self.external_ref.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn is_delivery(&self) -> bool {
        self.kind == OrderKind::Delivery
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn carryforward_penalty(&self) -> i64 {
        self.carryforward_penalty
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn vehicle(&self) -> Option<VehicleIdx> {
        self.status.vehicle()
    }

    /// The only way an order changes status. Keeps the fleet's capacity
    /// bookkeeping in step with the transition.
    pub fn update_status(
        &mut self,
        new_status: OrderStatus,
        fleet: &mut Fleet,
    ) -> Result<(), InvalidTransition> {
        let invalid = InvalidTransition {
            from: self.status,
            to: new_status,
        };

        if self.status.is_terminal() {
            return Err(invalid);
        }

        match new_status {
            OrderStatus::Unrouted => return Err(invalid),
            OrderStatus::Succeeded(vehicle) | OrderStatus::Failed(vehicle) => {
                if self.status != OrderStatus::Scheduled(vehicle) {
                    return Err(invalid);
                }
            }
            OrderStatus::Postponed | OrderStatus::Scheduled(_) => {}
        }

        if let (OrderStatus::Scheduled(previous), OrderKind::Delivery) = (self.status, self.kind) {
            fleet.vehicle_mut(previous).unload_delivery(self.volume);
        }

        match (new_status, self.kind) {
            (OrderStatus::Scheduled(vehicle), OrderKind::Delivery) => {
                fleet.vehicle_mut(vehicle).load_delivery(self.volume);
            }
            // The parcel stays in the container, taking up space for the rest of the day.
            (OrderStatus::Failed(vehicle), OrderKind::Delivery)
            | (OrderStatus::Succeeded(vehicle), OrderKind::Pickup) => {
                fleet.vehicle_mut(vehicle).reduce_actual_capacity(self.volume);
            }
            _ => {}
        }

        self.status = new_status;
        Ok(())
    }

    /// Status of an order entering a session. Any status it carried belonged to
    /// another fleet.
    pub(crate) fn into_unrouted(mut self) -> Self {
        self.status = OrderStatus::Unrouted;
        self
    }
}

#[derive(Default)]
pub struct OrderBuilder {
    external_ref: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    kind: Option<NodeKind>,
    volume: Option<f64>,
    carryforward_penalty: Option<i64>,
    time_window: Option<TimeWindow>,
}

impl OrderBuilder {
    pub fn set_external_ref(&mut self, external_ref: String) -> &mut OrderBuilder {
        self.external_ref = Some(external_ref);
        self
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) -> &mut OrderBuilder {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn set_latitude(&mut self, latitude: f64) -> &mut OrderBuilder {
        self.latitude = Some(latitude);
        self
    }

    pub fn set_longitude(&mut self, longitude: f64) -> &mut OrderBuilder {
        self.longitude = Some(longitude);
        self
    }

    pub fn set_kind(&mut self, kind: NodeKind) -> &mut OrderBuilder {
        self.kind = Some(kind);
        self
    }

    pub fn set_volume(&mut self, volume: f64) -> &mut OrderBuilder {
        self.volume = Some(volume);
        self
    }

    pub fn set_carryforward_penalty(&mut self, penalty: i64) -> &mut OrderBuilder {
        self.carryforward_penalty = Some(penalty);
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut OrderBuilder {
        self.time_window = Some(time_window);
        self
    }

    /// Orders are always created `Unrouted`.
    pub fn build(self) -> Result<Order, OrderValidationError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(OrderValidationError::MissingCoordinates);
        };
        let location = Location::from_lat_lon(latitude, longitude)?;

        let raw_volume = self.volume.unwrap_or(0.0);
        let volume =
            Volume::new(raw_volume).ok_or(OrderValidationError::InvalidVolume(raw_volume))?;

        let kind = OrderKind::try_from(self.kind.unwrap_or(NodeKind::Delivery))?;

        let carryforward_penalty = self
            .carryforward_penalty
            .unwrap_or(DEFAULT_CARRYFORWARD_PENALTY);
        if carryforward_penalty <= 0 {
            return Err(OrderValidationError::InvalidPenalty(carryforward_penalty));
        }

        Ok(Order {
            external_ref: self.external_ref,
            location,
            kind,
            volume,
            carryforward_penalty,
            time_window: self.time_window.filter(|window| !window.is_empty()),
            status: OrderStatus::Unrouted,
        })
    }
}
