use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Sub},
};

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize, JsonSchema)]
pub struct Kmh(f64);

impl Kmh {
    pub const fn new(value: f64) -> Self {
        Kmh(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn meters_per_minute(&self) -> f64 {
        self.0 * 1000.0 / 60.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Meters(f64);

impl Meters {
    pub const ZERO: Meters = Meters(0.0);

    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whole meters, rounded up. Solver costs must be integral.
    pub fn ceil_i64(&self) -> i64 {
        self.0.ceil() as i64
    }
}

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Meters {
    fn from(value: f64) -> Self {
        Meters::new(value)
    }
}

impl Add for Meters {
    type Output = Meters;

    fn add(self, other: Meters) -> Meters {
        Meters(self.0 + other.0)
    }
}

impl AddAssign for Meters {
    fn add_assign(&mut self, other: Meters) {
        self.0 += other.0;
    }
}

impl Sub for Meters {
    type Output = Meters;

    fn sub(self, other: Meters) -> Meters {
        Meters(self.0 - other.0)
    }
}

impl Div<Kmh> for Meters {
    type Output = SignedDuration;

    fn div(self, speed: Kmh) -> SignedDuration {
        let seconds = self.0 * 3.6 / speed.value();
        SignedDuration::from_secs_f64(seconds)
    }
}

impl Sum for Meters {
    fn sum<I: Iterator<Item = Meters>>(iter: I) -> Meters {
        iter.fold(Meters::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_div_kmh() {
        let duration = Meters::new(25_000.0) / Kmh::new(25.0);
        assert_eq!(duration, SignedDuration::from_hours(1));
    }

    #[test]
    fn test_meters_per_minute() {
        let speed = Kmh::new(60.0);
        assert_eq!(speed.meters_per_minute(), 1000.0);
    }

    #[test]
    fn test_ceil() {
        assert_eq!(Meters::new(10.2).ceil_i64(), 11);
        assert_eq!(Meters::new(10.0).ceil_i64(), 10);
    }
}
