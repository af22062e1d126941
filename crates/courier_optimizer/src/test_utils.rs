use std::sync::Arc;

use jiff::SignedDuration;

use crate::{
    model::{
        dimension::{DELIVERIES, Dimension, LOADS, Transit},
        index_manager::IndexManager,
        routing_model::RoutingModel,
        search_parameters::SearchParameters,
    },
    problem::{
        depot::Depot,
        fleet::Fleet,
        location::Location,
        order::{Order, OrderBuilder, OrderIdx},
        stop_node::{NodeKind, StopNode},
        vehicle::{Vehicle, VehicleIdx},
        volume::Volume,
    },
    session::{session_params::SessionParams, vrp_session::VrpSession},
};

pub fn create_depot() -> Depot {
    Depot::new(Location::from_lat_lon(0.0, 0.0).unwrap())
}

fn create_order(latitude: f64, longitude: f64, volume: f64, kind: NodeKind) -> Order {
    let mut builder = OrderBuilder::default();
    builder
        .set_location(latitude, longitude)
        .set_volume(volume)
        .set_kind(kind);
    builder.build().unwrap()
}

pub fn create_delivery(latitude: f64, longitude: f64, volume: f64) -> Order {
    create_order(latitude, longitude, volume, NodeKind::Delivery)
}

pub fn create_pickup(latitude: f64, longitude: f64, volume: f64) -> Order {
    create_order(latitude, longitude, volume, NodeKind::Pickup)
}

pub fn create_vehicles(capacities: &[f64]) -> Vec<Vehicle> {
    capacities
        .iter()
        .enumerate()
        .map(|(index, &capacity)| {
            Vehicle::new(format!("vehicle-{index}"), Volume::new(capacity).unwrap())
        })
        .collect()
}

pub fn create_fleet(capacities: &[f64]) -> Fleet {
    Fleet::new(create_vehicles(capacities))
}

/// `count` deliveries evenly spread on a circle around the depot, starting north.
pub fn create_ring_deliveries(count: usize, radius_degrees: f64, volume: f64) -> Vec<Order> {
    (0..count)
        .map(|index| {
            let angle = (index as f64 * 360.0 / count as f64).to_radians();
            create_delivery(
                radius_degrees * angle.cos(),
                radius_degrees * angle.sin(),
                volume,
            )
        })
        .collect()
}

pub fn create_test_params() -> SessionParams {
    SessionParams {
        time_limit: SignedDuration::from_millis(200),
        ..SessionParams::default()
    }
}

pub fn create_session(orders: Vec<Order>, capacities: &[f64]) -> VrpSession {
    VrpSession::new(
        create_depot(),
        orders,
        create_vehicles(capacities),
        create_test_params(),
    )
}

/// Orders of one unit each on a line at `positions`, every vehicle starting at
/// the depot (position 0). Arc cost is the distance along the line.
pub fn create_line_model(positions: &[i64], capacities: &[i64], penalty: Option<i64>) -> RoutingModel {
    let nodes = std::iter::once(StopNode::Depot)
        .chain((0..positions.len()).map(|order| StopNode::Order(OrderIdx::new(order))))
        .collect();
    let vehicles = (0..capacities.len()).map(VehicleIdx::new).collect();
    let manager = IndexManager::new(nodes, &vec![0; capacities.len()], vehicles);

    let num_orders = positions.len();
    let index_positions: Arc<[i64]> = (0..manager.num_indices())
        .map(|index| match manager.index_to_node(index) {
            0 => 0,
            node => positions[node - 1],
        })
        .collect();
    let distance = move |from: usize, to: usize| (index_positions[from] - index_positions[to]).abs();

    let search_parameters = SearchParameters {
        time_limit: SignedDuration::from_millis(100),
        ..SearchParameters::default()
    };
    let mut model = RoutingModel::new(manager, Box::new(distance), search_parameters);

    let demand = move |index: usize| if index < num_orders { -1 } else { 0 };
    let deliveries = model.add_dimension(Dimension::new(
        DELIVERIES,
        Transit::Unary(Box::new(demand)),
        0,
        capacities.to_vec(),
        false,
    ));
    let loads = model.add_dimension(Dimension::new(
        LOADS,
        Transit::Unary(Box::new(demand)),
        0,
        capacities.to_vec(),
        false,
    ));
    model.add_start_cumul_equality(deliveries, loads);

    if let Some(penalty) = penalty {
        for index in 0..num_orders {
            model.add_disjunction(index, penalty);
        }
    }

    model
}
