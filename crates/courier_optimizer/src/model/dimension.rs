use fxhash::FxHashMap;

use crate::model::callbacks::{CostFunction, UnaryTransit};

pub const DISTANCE: &str = "Distance";
pub const TIME: &str = "Time";
pub const DELIVERIES: &str = "Deliveries";
pub const LOADS: &str = "Loads";
pub const STOPS: &str = "Stops";

/// Cumul bound used when a dimension has no natural capacity.
pub const UNBOUNDED: i64 = i64::MAX / 4;

pub enum Transit {
    Arc(Box<dyn CostFunction>),
    Unary(Box<dyn UnaryTransit>),
}

impl Transit {
    #[inline]
    pub fn evaluate(&self, from: usize, to: usize) -> i64 {
        match self {
            Transit::Arc(callback) => callback.cost(from, to),
            Transit::Unary(callback) => callback.transit(from),
        }
    }
}

/// A quantity accumulated along each route.
///
/// `cumul(next) = cumul(prev) + transit(prev, next) + slack`, with
/// `0 <= slack <= slack_max` and `0 <= cumul <= capacity` of the vehicle slot.
pub struct Dimension {
    name: String,
    transit: Transit,
    slack_max: i64,
    capacities: Vec<i64>,
    force_start_zero: bool,
    cumul_ranges: FxHashMap<usize, (i64, i64)>,
}

impl Dimension {
    pub fn new(
        name: &str,
        transit: Transit,
        slack_max: i64,
        capacities: Vec<i64>,
        force_start_zero: bool,
    ) -> Self {
        Dimension {
            name: name.to_owned(),
            transit,
            slack_max,
            capacities,
            force_start_zero,
            cumul_ranges: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    pub fn capacity(&self, slot: usize) -> i64 {
        self.capacities[slot]
    }

    pub fn force_start_zero(&self) -> bool {
        self.force_start_zero
    }

    #[inline]
    pub fn transit(&self, from: usize, to: usize) -> i64 {
        self.transit.evaluate(from, to)
    }

    /// Restricts the cumul at `index`. Repeated calls intersect.
    pub fn set_cumul_range(&mut self, index: usize, min: i64, max: i64) {
        self.cumul_ranges
            .entry(index)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).max(min);
                *hi = (*hi).min(max);
            })
            .or_insert((min, max));
    }

    pub fn cumul_range(&self, index: usize) -> Option<(i64, i64)> {
        self.cumul_ranges.get(&index).copied()
    }

    /// Bounds of the cumul at `index` on vehicle `slot`.
    pub fn bounds(&self, index: usize, slot: usize, is_start: bool) -> (i64, i64) {
        let (mut lo, mut hi) = (0, self.capacities[slot]);
        if let Some((min, max)) = self.cumul_range(index) {
            lo = lo.max(min);
            hi = hi.min(max);
        }
        if is_start && self.force_start_zero {
            hi = hi.min(0);
        }
        (lo, hi)
    }
}
