use courier_matrix_providers::{
    distance_metric::DistanceMetric,
    travel_times::{DEFAULT_AVERAGE_SPEED, DEFAULT_SERVICE_TIME, TravelTimes},
    units::{Kmh, Meters},
};
use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    clustering::sweep::{DEFAULT_CLUSTER_SIZE, DEFAULT_SWEEP_STEP_DEGREES, SweepPartitioner},
    model::search_parameters::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters},
    problem::order::DEFAULT_CARRYFORWARD_PENALTY,
};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(default)]
pub struct SessionParams {
    pub average_speed: Kmh,
    pub service_time: SignedDuration,
    pub carryforward_penalty: i64,
    pub distance_metric: DistanceMetric,

    /// When the vehicles leave the depot. Time windows and predicted arrivals are
    /// relative to it.
    pub shift_start: Timestamp,
    pub time_horizon: SignedDuration,
    pub max_wait_time: SignedDuration,
    pub max_route_distance: Option<Meters>,
    pub max_orders_per_vehicle: Option<usize>,

    pub first_solution_strategy: FirstSolutionStrategy,
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    pub time_limit: SignedDuration,

    pub cluster_size: usize,
    pub sweep_step_degrees: f64,
}

impl Default for SessionParams {
    fn default() -> Self {
        SessionParams {
            average_speed: DEFAULT_AVERAGE_SPEED,
            service_time: DEFAULT_SERVICE_TIME,
            carryforward_penalty: DEFAULT_CARRYFORWARD_PENALTY,
            distance_metric: DistanceMetric::GreatCircle,
            shift_start: Timestamp::UNIX_EPOCH,
            time_horizon: SignedDuration::from_hours(24),
            max_wait_time: SignedDuration::from_hours(1),
            max_route_distance: None,
            max_orders_per_vehicle: None,
            first_solution_strategy: FirstSolutionStrategy::Automatic,
            local_search_metaheuristic: LocalSearchMetaheuristic::Automatic,
            time_limit: SignedDuration::from_secs(300),
            cluster_size: DEFAULT_CLUSTER_SIZE,
            sweep_step_degrees: DEFAULT_SWEEP_STEP_DEGREES,
        }
    }
}

impl SessionParams {
    pub fn travel_times(&self) -> TravelTimes {
        TravelTimes {
            average_speed: self.average_speed,
            service_time: self.service_time,
        }
    }

    pub fn search_parameters(&self) -> SearchParameters {
        SearchParameters {
            first_solution_strategy: self.first_solution_strategy,
            local_search_metaheuristic: self.local_search_metaheuristic,
            time_limit: self.time_limit,
        }
    }

    pub fn horizon_minutes(&self) -> i64 {
        self.time_horizon.as_mins()
    }

    pub fn sweep_partitioner(&self) -> SweepPartitioner {
        SweepPartitioner::new(self.cluster_size, self.sweep_step_degrees)
    }
}
