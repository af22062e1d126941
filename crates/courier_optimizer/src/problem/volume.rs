use std::{
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parcel or container volume. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    pub const ZERO: Volume = Volume(0.0);

    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Volume(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Demand in whole solver units, rounded up.
    pub fn demand_units(&self) -> i64 {
        self.0.ceil() as i64
    }

    /// Capacity in whole solver units, rounded down.
    pub fn capacity_units(&self) -> i64 {
        self.0.floor() as i64
    }

    pub fn saturating_sub(self, other: Volume) -> Volume {
        Volume((self.0 - other.0).max(0.0))
    }
}

impl Add for Volume {
    type Output = Volume;

    fn add(self, other: Volume) -> Volume {
        Volume(self.0 + other.0)
    }
}

impl AddAssign for Volume {
    fn add_assign(&mut self, other: Volume) {
        self.0 += other.0;
    }
}

impl Sub for Volume {
    type Output = Volume;

    fn sub(self, other: Volume) -> Volume {
        self.saturating_sub(other)
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Volume {
        iter.fold(Volume::ZERO, |acc, x| acc + x)
    }
}

impl std::fmt::Display for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
