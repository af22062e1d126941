use crate::model::{dimension::Dimension, routing_model::RoutingModel};

const NEG_INF: i64 = i64::MIN / 4;
const POS_INF: i64 = i64::MAX / 4;

/// Checks a complete sequence (start index .. end index) of one vehicle slot
/// against every dimension of the model.
///
/// Dimensions without slack pin every cumul to `start + prefix transit`, so the
/// feasible start values form one interval. Start cumul equalities intersect
/// those intervals. Dimensions with slack are propagated forward as reachable
/// intervals.
pub struct RouteEvaluator<'a> {
    model: &'a RoutingModel,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(model: &'a RoutingModel) -> Self {
        RouteEvaluator { model }
    }

    pub fn route_cost(&self, sequence: &[usize]) -> i64 {
        sequence
            .windows(2)
            .map(|arc| self.model.arc_cost(arc[0], arc[1]))
            .sum()
    }

    pub fn is_feasible(&self, slot: usize, sequence: &[usize]) -> bool {
        self.start_intervals(slot, sequence).is_some()
            && self
                .model
                .dimensions()
                .iter()
                .filter(|dimension| dimension.slack_max() > 0)
                .all(|dimension| self.propagate(dimension, slot, sequence).is_some())
    }

    /// Earliest time cumul at each position, or `None` when infeasible.
    /// All zeros when the model has no time dimension.
    pub fn schedule(&self, slot: usize, sequence: &[usize]) -> Option<Vec<i64>> {
        let intervals = self.start_intervals(slot, sequence)?;

        for dimension in self.model.dimensions() {
            if dimension.slack_max() > 0 {
                self.propagate(dimension, slot, sequence)?;
            }
        }

        let Some(time) = self.model.time_dimension() else {
            return Some(vec![0; sequence.len()]);
        };
        let dimension = &self.model.dimensions()[time];

        if dimension.slack_max() > 0 {
            return self.propagate(dimension, slot, sequence);
        }

        let (start, _) = intervals[time]?;
        let mut cumul = start;
        let mut schedule = Vec::with_capacity(sequence.len());
        schedule.push(cumul);
        for arc in sequence.windows(2) {
            cumul += dimension.transit(arc[0], arc[1]);
            schedule.push(cumul);
        }
        Some(schedule)
    }

    /// Feasible start cumuls of every zero-slack dimension, after applying the
    /// start cumul equalities. `None` entries are dimensions with slack.
    fn start_intervals(&self, slot: usize, sequence: &[usize]) -> Option<Vec<Option<(i64, i64)>>> {
        let mut intervals = Vec::with_capacity(self.model.dimensions().len());

        for dimension in self.model.dimensions() {
            if dimension.slack_max() > 0 {
                intervals.push(None);
                continue;
            }
            intervals.push(Some(start_interval(dimension, slot, sequence)?));
        }

        for &(first, second) in self.model.start_cumul_equalities() {
            if let (Some((lo1, hi1)), Some((lo2, hi2))) = (intervals[first], intervals[second]) {
                let (lo, hi) = (lo1.max(lo2), hi1.min(hi2));
                if lo > hi {
                    return None;
                }
                intervals[first] = Some((lo, hi));
                intervals[second] = Some((lo, hi));
            }
        }

        Some(intervals)
    }

    /// Forward pass over reachable cumul intervals, then a backward pass that
    /// picks the earliest consistent cumul at each position.
    fn propagate(&self, dimension: &Dimension, slot: usize, sequence: &[usize]) -> Option<Vec<i64>> {
        let slack = dimension.slack_max();
        let mut reachable = Vec::with_capacity(sequence.len());
        let mut transits = Vec::with_capacity(sequence.len());

        let (mut lo, mut hi) = dimension.bounds(sequence[0], slot, true);
        if lo > hi {
            return None;
        }
        reachable.push((lo, hi));

        for arc in sequence.windows(2) {
            let transit = dimension.transit(arc[0], arc[1]);
            let (min, max) = dimension.bounds(arc[1], slot, false);

            lo = min.max(lo.saturating_add(transit));
            hi = max.min(hi.saturating_add(transit).saturating_add(slack));
            if lo > hi {
                return None;
            }

            transits.push(transit);
            reachable.push((lo, hi));
        }

        let mut schedule = vec![0; sequence.len()];
        let last = sequence.len() - 1;
        schedule[last] = reachable[last].0;
        for position in (0..last).rev() {
            schedule[position] = reachable[position]
                .0
                .max(schedule[position + 1] - transits[position] - slack);
        }

        Some(schedule)
    }
}

fn start_interval(dimension: &Dimension, slot: usize, sequence: &[usize]) -> Option<(i64, i64)> {
    let (mut lo, mut hi) = (NEG_INF, POS_INF);
    let mut prefix = 0i64;

    for (position, &index) in sequence.iter().enumerate() {
        if position > 0 {
            prefix = prefix.saturating_add(dimension.transit(sequence[position - 1], index));
        }

        let (min, max) = dimension.bounds(index, slot, position == 0);
        lo = lo.max(min.saturating_sub(prefix));
        hi = hi.min(max.saturating_sub(prefix));
        if lo > hi {
            return None;
        }
    }

    Some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            dimension::{DELIVERIES, LOADS, TIME, Transit},
            index_manager::IndexManager,
            search_parameters::SearchParameters,
        },
        problem::{order::OrderIdx, stop_node::StopNode, vehicle::VehicleIdx},
    };

    /// Three orders on a line at 10, 20 and 30; one vehicle at the depot (0).
    /// Indices 0..=2 are the orders, 3 the start, 4 the end.
    fn line_model(capacity: i64, demands: [i64; 3], time_slack: i64) -> RoutingModel {
        let nodes = vec![
            StopNode::Depot,
            StopNode::Order(OrderIdx::new(0)),
            StopNode::Order(OrderIdx::new(1)),
            StopNode::Order(OrderIdx::new(2)),
        ];
        let manager = IndexManager::new(nodes, &[0], vec![VehicleIdx::new(0)]);
        let positions = [10i64, 20, 30, 0, 0];
        let distance = move |from: usize, to: usize| (positions[from] - positions[to]).abs();

        let mut model = RoutingModel::new(manager, Box::new(distance), SearchParameters::default());

        let time = model.add_dimension(Dimension::new(
            TIME,
            Transit::Arc(Box::new(distance)),
            time_slack,
            vec![1000],
            false,
        ));
        model.set_time_dimension(time);

        let delivery = move |index: usize| if index < 3 { -demands[index].max(0) } else { 0 };
        let load = move |index: usize| if index < 3 { -demands[index] } else { 0 };
        let deliveries = model.add_dimension(Dimension::new(
            DELIVERIES,
            Transit::Unary(Box::new(delivery)),
            0,
            vec![capacity],
            false,
        ));
        let loads = model.add_dimension(Dimension::new(
            LOADS,
            Transit::Unary(Box::new(load)),
            0,
            vec![capacity],
            false,
        ));
        model.add_start_cumul_equality(deliveries, loads);

        model
    }

    #[test]
    fn test_route_cost() {
        let model = line_model(10, [1, 1, 1], 0);
        let evaluator = RouteEvaluator::new(&model);

        assert_eq!(evaluator.route_cost(&[3, 0, 1, 2, 4]), 60);
        assert_eq!(evaluator.route_cost(&[3, 2, 0, 4]), 60);
    }

    #[test]
    fn test_capacity_limits_deliveries() {
        let model = line_model(5, [2, 2, 2], 0);
        let evaluator = RouteEvaluator::new(&model);

        assert!(evaluator.is_feasible(0, &[3, 0, 1, 4]));
        assert!(!evaluator.is_feasible(0, &[3, 0, 1, 2, 4]));
    }

    #[test]
    fn test_pickup_after_delivery_fits() {
        // Order 2 is a pickup of 3: deliver 2 + 2, then pick up 3.
        let model = line_model(4, [2, 2, -3], 0);
        let evaluator = RouteEvaluator::new(&model);

        assert!(evaluator.is_feasible(0, &[3, 0, 1, 2, 4]));
        // Picking up first leaves no room for the deliveries still on board.
        assert!(!evaluator.is_feasible(0, &[3, 2, 0, 1, 4]));
    }

    #[test]
    fn test_time_window_requires_waiting() {
        let mut model = line_model(10, [1, 1, 1], 0);
        let time = model.time_dimension().unwrap();
        model.dimension_mut(time).set_cumul_range(1, 50, 60);
        let evaluator = RouteEvaluator::new(&model);

        // Start cumul is free, so the vehicle leaves late instead of waiting.
        let schedule = evaluator.schedule(0, &[3, 0, 1, 4]).unwrap();
        assert_eq!(schedule, vec![30, 40, 50, 70]);
    }

    #[test]
    fn test_slack_absorbs_waiting() {
        let mut model = line_model(10, [1, 1, 1], 30);
        let time = model.time_dimension().unwrap();
        model.dimension_mut(time).set_cumul_range(3, 0, 0);
        model.dimension_mut(time).set_cumul_range(1, 50, 60);
        let evaluator = RouteEvaluator::new(&model);

        let schedule = evaluator.schedule(0, &[3, 0, 1, 4]).unwrap();
        assert_eq!(schedule, vec![0, 10, 50, 70]);
    }

    #[test]
    fn test_waiting_beyond_slack_is_infeasible() {
        let mut model = line_model(10, [1, 1, 1], 30);
        let time = model.time_dimension().unwrap();
        model.dimension_mut(time).set_cumul_range(3, 0, 0);
        // At most 30 minutes of waiting on each of the two arcs before it.
        model.dimension_mut(time).set_cumul_range(1, 85, 90);
        let evaluator = RouteEvaluator::new(&model);

        assert!(evaluator.schedule(0, &[3, 0, 1, 4]).is_none());
        assert!(!evaluator.is_feasible(0, &[3, 0, 1, 4]));
        assert!(evaluator.is_feasible(0, &[3, 0, 4]));
    }
}
