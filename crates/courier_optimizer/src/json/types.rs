use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    problem::{
        depot::Depot,
        error::{InvalidOrder, OrderValidationError},
        generator::GeneratedProblem,
        ingest::{RawOrder, RawTimeWindow, ingest_with_default_penalty},
        location::Location,
        order::{Order, OrderKind},
        stop_node::NodeKind,
        vehicle::Vehicle,
        volume::Volume,
    },
    session::{session_params::SessionParams, vrp_session::VrpSession},
};

#[derive(Debug, Error)]
pub enum JsonProblemError {
    #[error("Invalid depot: {0}")]
    InvalidDepot(#[source] OrderValidationError),

    #[error("Vehicle {id} has an invalid capacity {capacity}")]
    InvalidCapacity { id: String, capacity: f64 },
}

/// A dispatch day as a JSON document: the depot, the fleet and the order
/// records, plus optional session parameters.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "DispatchProblem")]
pub struct JsonDispatchProblem {
    pub depot: JsonDepot,
    pub vehicles: Vec<JsonVehicle>,
    #[serde(default)]
    pub deliveries: Vec<RawOrder>,
    #[serde(default)]
    pub pickups: Vec<RawOrder>,
    #[serde(default)]
    pub params: Option<SessionParams>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Depot")]
pub struct JsonDepot {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct JsonVehicle {
    pub id: String,
    pub capacity: f64,
}

/// Entities ready for a session. Bad order records are listed in `rejected`.
pub struct DispatchProblem {
    pub depot: Depot,
    pub orders: Vec<Order>,
    pub vehicles: Vec<Vehicle>,
    pub params: SessionParams,
    pub rejected: Vec<InvalidOrder>,
}

impl DispatchProblem {
    pub fn into_session(self) -> VrpSession {
        VrpSession::new(self.depot, self.orders, self.vehicles, self.params)
    }
}

impl JsonDispatchProblem {
    #[instrument(skip_all, level = "debug")]
    pub fn build_problem(self) -> Result<DispatchProblem, JsonProblemError> {
        let location = Location::from_lat_lon(self.depot.latitude, self.depot.longitude)
            .map_err(JsonProblemError::InvalidDepot)?;
        let params = self.params.unwrap_or_default();

        let vehicles = self
            .vehicles
            .into_iter()
            .map(|vehicle| match Volume::new(vehicle.capacity) {
                Some(capacity) => Ok(Vehicle::new(vehicle.id, capacity)),
                None => Err(JsonProblemError::InvalidCapacity {
                    capacity: vehicle.capacity,
                    id: vehicle.id,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ingested = ingest_with_default_penalty(
            Depot::new(location),
            self.deliveries,
            self.pickups,
            params.carryforward_penalty,
        );

        Ok(DispatchProblem {
            depot: ingested.depot,
            orders: ingested.orders,
            vehicles,
            params,
            rejected: ingested.rejected,
        })
    }
}

fn raw_order(order: &Order) -> RawOrder {
    RawOrder {
        external_ref: order.external_ref().map(str::to_owned),
        latitude: Some(order.location().lat()),
        longitude: Some(order.location().lon()),
        volume: order.volume().value(),
        kind: Some(NodeKind::from(order.kind())),
        time_window: order.time_window().map(|window| RawTimeWindow {
            earliest: window.earliest(),
            latest: window.latest(),
        }),
        carryforward_penalty: Some(order.carryforward_penalty()),
    }
}

impl From<&GeneratedProblem> for JsonDispatchProblem {
    fn from(problem: &GeneratedProblem) -> Self {
        let (deliveries, pickups): (Vec<&Order>, Vec<&Order>) = problem
            .orders
            .iter()
            .partition(|order| order.kind() == OrderKind::Delivery);

        JsonDispatchProblem {
            depot: JsonDepot {
                latitude: problem.depot.location().lat(),
                longitude: problem.depot.location().lon(),
            },
            vehicles: problem
                .vehicles
                .iter()
                .map(|vehicle| JsonVehicle {
                    id: vehicle.external_id().to_owned(),
                    capacity: vehicle.total_capacity().value(),
                })
                .collect(),
            deliveries: deliveries.into_iter().map(raw_order).collect(),
            pickups: pickups.into_iter().map(raw_order).collect(),
            params: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::problem::generator::{GeneratorParams, generate_problem};

    #[test]
    fn test_build_problem_rejects_bad_records() {
        let json = r#"{
            "depot": {"latitude": 12.97, "longitude": 77.59},
            "vehicles": [{"id": "bike-1", "capacity": 40}],
            "deliveries": [
                {"externalRef": "AWB-1", "latitude": 12.98, "longitude": 77.60, "volume": 2},
                {"externalRef": "AWB-2", "latitude": 12.98, "volume": 2}
            ],
            "pickups": [
                {"externalRef": "AWB-3", "latitude": 12.96, "longitude": 77.58, "volume": 1, "kind": "delivery"}
            ],
            "params": {"time_limit": "PT2S"}
        }"#;

        let problem: JsonDispatchProblem = serde_json::from_str(json).unwrap();
        let problem = problem.build_problem().unwrap();

        assert_eq!(problem.orders.len(), 1);
        assert_eq!(problem.vehicles.len(), 1);
        assert_eq!(problem.rejected.len(), 2);
        assert_eq!(problem.params.time_limit, jiff::SignedDuration::from_secs(2));
    }

    #[test]
    fn test_invalid_capacity() {
        let problem = JsonDispatchProblem {
            depot: JsonDepot {
                latitude: 0.0,
                longitude: 0.0,
            },
            vehicles: vec![JsonVehicle {
                id: "van".to_owned(),
                capacity: -1.0,
            }],
            deliveries: vec![],
            pickups: vec![],
            params: None,
        };

        assert!(matches!(
            problem.build_problem(),
            Err(JsonProblemError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn test_generated_problem_round_trips_through_json() {
        let mut rng = SmallRng::seed_from_u64(3);
        let generated = generate_problem(
            &mut rng,
            &GeneratorParams {
                num_orders: 20,
                ..GeneratorParams::default()
            },
        );

        let json = serde_json::to_string(&JsonDispatchProblem::from(&generated)).unwrap();
        let parsed: JsonDispatchProblem = serde_json::from_str(&json).unwrap();
        let problem = parsed.build_problem().unwrap();

        assert!(problem.rejected.is_empty());
        assert_eq!(problem.orders.len(), 20);
        assert_eq!(problem.vehicles.len(), generated.vehicles.len());
    }
}
