use jiff::Timestamp;
use serde::Serialize;

use crate::{
    problem::{
        order::{OrderIdx, OrderKind, OrderStatus},
        vehicle::VehicleIdx,
        volume::Volume,
    },
    session::{session_state::SessionState, vrp_session::VrpSession},
    utils::enumerate_idx::EnumerateIdx,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VehicleSummary {
    pub vehicle: VehicleIdx,
    pub external_id: String,
    /// Meters, depot to depot.
    pub distance: i64,
    pub deliveries: Volume,
    pub pickups: Volume,
    pub stops: usize,
    pub completed_stops: usize,
    pub return_time: Option<Timestamp>,
    pub available_capacity: Volume,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SolutionSummary {
    pub state: SessionState,
    pub objective: Option<i64>,
    pub vehicles: Vec<VehicleSummary>,
    pub dropped: Vec<OrderIdx>,
    pub total_distance: i64,
}

impl SolutionSummary {
    pub(crate) fn new(session: &VrpSession) -> Self {
        let shift_start = session.params().shift_start;
        let orders = session.orders();

        let vehicles: Vec<VehicleSummary> = session
            .routes()
            .routes()
            .map(|route| {
                let vehicle = session.fleet().vehicle(route.vehicle());
                let volume_of = |kind: OrderKind| -> Volume {
                    route
                        .orders()
                        .map(|order| &orders[order])
                        .filter(|order| order.kind() == kind)
                        .map(|order| order.volume())
                        .sum()
                };
                let completed_stops = route.stops()[..route.current_position()]
                    .iter()
                    .filter(|stop| stop.order().is_some())
                    .count();

                VehicleSummary {
                    vehicle: route.vehicle(),
                    external_id: vehicle.external_id().to_owned(),
                    distance: route.distance(),
                    deliveries: volume_of(OrderKind::Delivery),
                    pickups: volume_of(OrderKind::Pickup),
                    stops: route.orders().count(),
                    completed_stops,
                    return_time: route
                        .return_time()
                        .and_then(|arrival| shift_start.checked_add(arrival).ok()),
                    available_capacity: vehicle.available_capacity(),
                }
            })
            .collect();

        let dropped = orders
            .iter()
            .enumerate_idx()
            .filter_map(|(order_id, order): (OrderIdx, _)| {
                (order.status() == OrderStatus::Postponed).then_some(order_id)
            })
            .collect();

        SolutionSummary {
            state: session.state(),
            objective: session.objective(),
            total_distance: vehicles.iter().map(|vehicle| vehicle.distance).sum(),
            vehicles,
            dropped,
        }
    }
}
