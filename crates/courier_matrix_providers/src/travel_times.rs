use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    travel_matrices::TravelMatrices,
    units::{Kmh, Meters},
};

pub const DEFAULT_AVERAGE_SPEED: Kmh = Kmh::new(25.0);
pub const DEFAULT_SERVICE_TIME: SignedDuration = SignedDuration::from_mins(5);

/// Converts matrix distances into whole minutes for the time dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct TravelTimes {
    pub average_speed: Kmh,
    pub service_time: SignedDuration,
}

impl Default for TravelTimes {
    fn default() -> Self {
        TravelTimes {
            average_speed: DEFAULT_AVERAGE_SPEED,
            service_time: DEFAULT_SERVICE_TIME,
        }
    }
}

fn ceil_minutes(duration: SignedDuration) -> i64 {
    let seconds = duration.as_secs();
    let minutes = seconds / 60;
    if seconds % 60 > 0 || duration.subsec_nanos() > 0 {
        minutes + 1
    } else {
        minutes
    }
}

impl TravelTimes {
    pub fn transit_time(&self, matrices: &TravelMatrices, from: usize, to: usize) -> SignedDuration {
        Meters::new(matrices.distance(from, to) as f64) / self.average_speed
    }

    pub fn transit_minutes(&self, matrices: &TravelMatrices, from: usize, to: usize) -> i64 {
        ceil_minutes(self.transit_time(matrices, from, to))
    }

    /// Time spent at `from` before leaving for `to`. Does not depend on `to`.
    pub fn service_minutes(&self, _from: usize, _to: usize) -> i64 {
        ceil_minutes(self.service_time)
    }
}
