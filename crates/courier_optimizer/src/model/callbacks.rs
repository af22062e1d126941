use std::sync::Arc;

use courier_matrix_providers::{travel_matrices::TravelMatrices, travel_times::TravelTimes};

/// Cost of moving between two solver indices.
pub trait CostFunction: Send + Sync {
    fn cost(&self, from: usize, to: usize) -> i64;
}

/// Quantity picked up (or dropped, when negative) when leaving a solver index.
pub trait UnaryTransit: Send + Sync {
    fn transit(&self, index: usize) -> i64;
}

impl<F> CostFunction for F
where
    F: Fn(usize, usize) -> i64 + Send + Sync,
{
    fn cost(&self, from: usize, to: usize) -> i64 {
        self(from, to)
    }
}

impl<F> UnaryTransit for F
where
    F: Fn(usize) -> i64 + Send + Sync,
{
    fn transit(&self, index: usize) -> i64 {
        self(index)
    }
}

/// Matrix distance between the nodes behind two indices.
#[derive(Clone)]
pub struct ArcDistance {
    index_nodes: Arc<[usize]>,
    matrices: Arc<TravelMatrices>,
}

impl ArcDistance {
    pub fn new(index_nodes: Arc<[usize]>, matrices: Arc<TravelMatrices>) -> Self {
        ArcDistance {
            index_nodes,
            matrices,
        }
    }
}

impl CostFunction for ArcDistance {
    #[inline]
    fn cost(&self, from: usize, to: usize) -> i64 {
        self.matrices
            .distance(self.index_nodes[from], self.index_nodes[to])
    }
}

/// Service time at `from` plus driving time to `to`, in minutes.
pub struct ArcTravelTime {
    index_nodes: Arc<[usize]>,
    matrices: Arc<TravelMatrices>,
    travel_times: TravelTimes,
    serviced: Arc<[bool]>,
}

impl ArcTravelTime {
    /// `serviced[index]` is false for the depot.
    pub fn new(
        index_nodes: Arc<[usize]>,
        matrices: Arc<TravelMatrices>,
        travel_times: TravelTimes,
        serviced: Arc<[bool]>,
    ) -> Self {
        ArcTravelTime {
            index_nodes,
            matrices,
            travel_times,
            serviced,
        }
    }
}

impl CostFunction for ArcTravelTime {
    fn cost(&self, from: usize, to: usize) -> i64 {
        let from_node = self.index_nodes[from];
        let to_node = self.index_nodes[to];

        let service = if self.serviced[from] {
            self.travel_times.service_minutes(from_node, to_node)
        } else {
            0
        };

        service
            + self
                .travel_times
                .transit_minutes(&self.matrices, from_node, to_node)
    }
}

/// Per-index demand, precomputed by the builder.
pub struct IndexDemands {
    demands: Vec<i64>,
}

impl IndexDemands {
    pub fn new(demands: Vec<i64>) -> Self {
        IndexDemands { demands }
    }
}

impl UnaryTransit for IndexDemands {
    #[inline]
    fn transit(&self, index: usize) -> i64 {
        self.demands[index]
    }
}

#[cfg(test)]
mod tests {
    use courier_matrix_providers::units::Kmh;
    use jiff::SignedDuration;

    use super::*;

    fn matrices() -> Arc<TravelMatrices> {
        Arc::new(TravelMatrices::from_flat(vec![0, 1000, 1000, 0], 2).unwrap())
    }

    #[test]
    fn test_arc_distance_maps_indices_to_nodes() {
        // indices: 0 -> node 1, 1 -> node 0 (start), 2 -> node 0 (end)
        let callback = ArcDistance::new(Arc::from(vec![1, 0, 0]), matrices());

        assert_eq!(callback.cost(1, 0), 1000);
        assert_eq!(callback.cost(1, 2), 0);
    }

    #[test]
    fn test_travel_time_skips_service_at_depot() {
        let travel_times = TravelTimes {
            average_speed: Kmh::new(60.0),
            service_time: SignedDuration::from_mins(5),
        };
        let callback = ArcTravelTime::new(
            Arc::from(vec![1, 0, 0]),
            matrices(),
            travel_times,
            Arc::from(vec![true, false, false]),
        );

        assert_eq!(callback.cost(1, 0), 1);
        assert_eq!(callback.cost(0, 2), 6);
    }

    #[test]
    fn test_closures_are_callbacks() {
        let cost = |from: usize, to: usize| (from as i64 - to as i64).abs();
        let transit = |index: usize| -(index as i64);

        assert_eq!(cost.cost(3, 1), 2);
        assert_eq!(transit.transit(4), -4);
    }
}
