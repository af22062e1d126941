use serde::Serialize;

use crate::{
    problem::{
        order::{Order, OrderIdx, OrderStatus},
        vehicle::VehicleIdx,
    },
    routes::route::Route,
};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RouteSlot {
    Route(Route),
    NoRoute,
}

impl RouteSlot {
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteSlot::Route(route) => Some(route),
            RouteSlot::NoRoute => None,
        }
    }
}

/// One slot per vehicle of the fleet, in fleet order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutesList {
    slots: Vec<RouteSlot>,
}

impl RoutesList {
    pub fn empty(num_vehicles: usize) -> Self {
        RoutesList {
            slots: vec![RouteSlot::NoRoute; num_vehicles],
        }
    }

    pub(crate) fn from_slots(slots: Vec<RouteSlot>) -> Self {
        RoutesList { slots }
    }

    pub fn slots(&self) -> &[RouteSlot] {
        &self.slots
    }

    pub fn get(&self, vehicle: VehicleIdx) -> Option<&Route> {
        self.slots.get(vehicle.get()).and_then(RouteSlot::route)
    }

    pub(crate) fn get_mut(&mut self, vehicle: VehicleIdx) -> Option<&mut Route> {
        match self.slots.get_mut(vehicle.get()) {
            Some(RouteSlot::Route(route)) => Some(route),
            _ => None,
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.slots.iter().filter_map(RouteSlot::route)
    }

    pub(crate) fn routes_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            RouteSlot::Route(route) => Some(route),
            RouteSlot::NoRoute => None,
        })
    }

    pub fn num_routes(&self) -> usize {
        self.routes().count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Per vehicle, the orders still to visit after the current stop, in route
    /// order. Resolved orders and the terminal depot are left out.
    pub fn warm_start_hints(&self, orders: &[Order]) -> Vec<Vec<OrderIdx>> {
        self.slots
            .iter()
            .map(|slot| match slot {
                RouteSlot::Route(route) => route
                    .remaining_stops()
                    .iter()
                    .filter_map(|stop| stop.order())
                    .filter(|&order| {
                        matches!(orders[order].status(), OrderStatus::Scheduled(vehicle) if vehicle == route.vehicle())
                    })
                    .collect(),
                RouteSlot::NoRoute => Vec::new(),
            })
            .collect()
    }
}
