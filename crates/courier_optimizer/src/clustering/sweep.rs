use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    clustering::Partitioner,
    problem::{location::Location, order::OrderIdx},
};

pub const DEFAULT_CLUSTER_SIZE: usize = 500;
pub const DEFAULT_SWEEP_STEP_DEGREES: f64 = 5.0;

/// Scores closer than this are ties.
const SCORE_EPSILON: f64 = 1e-9;

/// Angular partitioning around the depot.
///
/// Orders are sorted by polar angle, then cut into contiguous chunks of
/// `cluster_size`. The sweep tries every starting angle in steps of
/// `step_degrees` and keeps the cut whose widest chunk (by angular standard
/// deviation) is the narrowest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepPartitioner {
    pub cluster_size: usize,
    pub step_degrees: f64,
}

impl Default for SweepPartitioner {
    fn default() -> Self {
        SweepPartitioner {
            cluster_size: DEFAULT_CLUSTER_SIZE,
            step_degrees: DEFAULT_SWEEP_STEP_DEGREES,
        }
    }
}

struct AngledOrder {
    order: OrderIdx,
    angle: f64,
}

/// Population standard deviation.
fn standard_deviation(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (count, sum) = values
        .clone()
        .fold((0usize, 0.0), |(count, sum), value| (count + 1, sum + value));
    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = values.map(|value| (value - mean).powi(2)).sum::<f64>() / count as f64;
    variance.sqrt()
}

impl SweepPartitioner {
    pub fn new(cluster_size: usize, step_degrees: f64) -> Self {
        SweepPartitioner {
            cluster_size,
            step_degrees,
        }
    }

    /// Widest chunk when the sorted orders are rotated to begin at `offset`.
    /// Orders before `offset` wrap around and get 360° added, so a chunk
    /// crossing north is measured over contiguous angles.
    fn score(&self, sorted: &[AngledOrder], offset: usize, cluster_size: usize) -> f64 {
        let n = sorted.len();
        let unwrapped = |position: usize| {
            let index = (offset + position) % n;
            if index < offset {
                sorted[index].angle + 360.0
            } else {
                sorted[index].angle
            }
        };

        (0..n)
            .step_by(cluster_size)
            .map(|chunk_start| {
                let chunk_end = (chunk_start + cluster_size).min(n);
                standard_deviation((chunk_start..chunk_end).map(unwrapped))
            })
            .fold(0.0, f64::max)
    }

    /// Offset into `sorted` of every start angle the sweep tries, in sweep
    /// order. The sweep stops at the first start angle past the last order.
    fn sweep_offsets(&self, sorted: &[AngledOrder]) -> Vec<usize> {
        let step = if self.step_degrees > 0.0 {
            self.step_degrees
        } else {
            DEFAULT_SWEEP_STEP_DEGREES
        };
        let num_starts = (360.0 / step).ceil() as usize;

        (0..num_starts)
            .map_while(|start_index| {
                let start_angle = start_index as f64 * step;
                sorted.iter().position(|entry| entry.angle >= start_angle)
            })
            .collect()
    }

    /// Contiguous chunks of the sorted orders rotated to begin at `offset`.
    fn chunks_from(sorted: &[AngledOrder], offset: usize, cluster_size: usize) -> Vec<Vec<OrderIdx>> {
        let (head, tail) = sorted.split_at(offset);
        let rotated: Vec<OrderIdx> = tail.iter().chain(head).map(|entry| entry.order).collect();

        rotated.chunks(cluster_size).map(<[OrderIdx]>::to_vec).collect()
    }

    fn sorted_by_angle(depot: &Location, orders: &[(OrderIdx, Location)]) -> Vec<AngledOrder> {
        let mut sorted: Vec<AngledOrder> = orders
            .iter()
            .map(|(order, location)| AngledOrder {
                order: *order,
                angle: location.polar_angle_from(depot),
            })
            .collect();
        sorted.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        sorted
    }

    #[instrument(skip_all, level = "debug", fields(orders = orders.len()))]
    pub fn cluster(&self, depot: &Location, orders: &[(OrderIdx, Location)]) -> Vec<Vec<OrderIdx>> {
        let cluster_size = self.cluster_size.max(1);

        if orders.is_empty() {
            return vec![];
        }

        if orders.len() <= cluster_size {
            return vec![orders.iter().map(|(order, _)| *order).collect()];
        }

        let sorted = Self::sorted_by_angle(depot, orders);

        let mut best: Option<(usize, f64)> = None;
        for offset in self.sweep_offsets(&sorted) {
            let score = self.score(&sorted, offset, cluster_size);
            if best.is_none_or(|(_, best_score)| score < best_score - SCORE_EPSILON) {
                best = Some((offset, score));
            }
        }

        let (offset, score) = best.unwrap_or((0, 0.0));
        debug!(offset, score, "Selected sweep start");

        Self::chunks_from(&sorted, offset, cluster_size)
    }
}

impl Partitioner for SweepPartitioner {
    fn partition(&self, depot: &Location, orders: &[(OrderIdx, Location)]) -> Vec<Vec<OrderIdx>> {
        self.cluster(depot, orders)
    }
}
