use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::error::OrderValidationError;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    earliest: Option<Timestamp>,
    latest: Option<Timestamp>,
}

impl TimeWindow {
    pub fn new(
        earliest: Option<Timestamp>,
        latest: Option<Timestamp>,
    ) -> Result<Self, OrderValidationError> {
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            if latest < earliest {
                return Err(OrderValidationError::InvertedTimeWindow);
            }
        }

        Ok(TimeWindow { earliest, latest })
    }

    pub fn earliest(&self) -> Option<Timestamp> {
        self.earliest
    }

    pub fn latest(&self) -> Option<Timestamp> {
        self.latest
    }

    pub fn is_empty(&self) -> bool {
        self.earliest.is_none() && self.latest.is_none()
    }

    /// Window as whole minutes since `shift_start`, clamped to `[0, horizon]`.
    /// The range is empty (`lo > hi`) when the window closes before the shift starts.
    pub fn minutes_since(&self, shift_start: Timestamp, horizon: i64) -> (i64, i64) {
        let earliest = self
            .earliest
            .map(|earliest| ceil_minutes(earliest.duration_since(shift_start)))
            .unwrap_or(0)
            .max(0);
        let latest = self
            .latest
            .map(|latest| latest.duration_since(shift_start).as_mins())
            .unwrap_or(horizon)
            .min(horizon);

        (earliest, latest)
    }

    pub fn contains(&self, instant: Timestamp) -> bool {
        self.earliest.is_none_or(|earliest| instant >= earliest)
            && self.latest.is_none_or(|latest| instant <= latest)
    }
}

fn ceil_minutes(duration: SignedDuration) -> i64 {
    let minutes = duration.as_mins();
    if duration > SignedDuration::from_mins(minutes) {
        minutes + 1
    } else {
        minutes
    }
}
