use geo::{Destination, Haversine};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::problem::{
    depot::Depot,
    location::Location,
    order::{Order, OrderBuilder},
    stop_node::NodeKind,
    vehicle::Vehicle,
    volume::Volume,
};

/// Random instance around a depot, for tests, benches and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorParams {
    pub center: Location,
    pub num_orders: usize,
    pub num_vehicles: usize,
    pub vehicle_capacity: f64,
    pub radius_meters: f64,
    pub max_volume: f64,
    pub pickup_ratio: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        GeneratorParams {
            // Bengaluru
            center: Location::from(geo::Point::new(77.5946, 12.9716)),
            num_orders: 100,
            num_vehicles: 5,
            vehicle_capacity: 120.0,
            radius_meters: 8_000.0,
            max_volume: 5.0,
            pickup_ratio: 0.1,
        }
    }
}

pub struct GeneratedProblem {
    pub depot: Depot,
    pub orders: Vec<Order>,
    pub vehicles: Vec<Vehicle>,
}

pub fn random_location<R: Rng>(rng: &mut R, center: &Location, radius_meters: f64) -> Location {
    let bearing = rng.random_range(0.0..360.0);
    // sqrt keeps the points uniform over the disc
    let distance = radius_meters * rng.random::<f64>().sqrt();

    Haversine
        .destination(center.into(), bearing, distance)
        .into()
}

pub fn generate_problem<R: Rng>(rng: &mut R, params: &GeneratorParams) -> GeneratedProblem {
    let orders = (0..params.num_orders)
        .filter_map(|index| {
            let location = random_location(rng, &params.center, params.radius_meters);
            let kind = if rng.random_bool(params.pickup_ratio.clamp(0.0, 1.0)) {
                NodeKind::Pickup
            } else {
                NodeKind::Delivery
            };

            let mut builder = OrderBuilder::default();
            builder
                .set_external_ref(format!("AWB-{index:05}"))
                .set_location(location.lat(), location.lon())
                .set_kind(kind)
                .set_volume(rng.random_range(1.0..=params.max_volume.max(1.0)).round());
            builder.build().ok()
        })
        .collect();

    let capacity = Volume::new(params.vehicle_capacity).unwrap_or(Volume::ZERO);
    let vehicles = (0..params.num_vehicles)
        .map(|index| Vehicle::new(format!("vehicle-{index}"), capacity))
        .collect();

    GeneratedProblem {
        depot: Depot::new(params.center),
        orders,
        vehicles,
    }
}
