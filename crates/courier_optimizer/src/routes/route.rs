use jiff::SignedDuration;
use serde::Serialize;

use crate::problem::{
    error::InvalidTransition,
    fleet::Fleet,
    order::{Order, OrderIdx, StopOutcome},
    stop_node::StopNode,
    vehicle::VehicleIdx,
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    node: StopNode,
    /// Predicted arrival, relative to the shift start.
    arrival: SignedDuration,
    /// Meters from the previous stop.
    leg_distance: i64,
}

impl Stop {
    pub fn new(node: StopNode, arrival: SignedDuration, leg_distance: i64) -> Self {
        Stop {
            node,
            arrival,
            leg_distance,
        }
    }

    pub fn node(&self) -> StopNode {
        self.node
    }

    pub fn order(&self) -> Option<OrderIdx> {
        self.node.order()
    }

    pub fn arrival(&self) -> SignedDuration {
        self.arrival
    }

    pub fn leg_distance(&self) -> i64 {
        self.leg_distance
    }
}

/// Stops of one vehicle, depot to depot, and the position the vehicle is at.
///
/// The stop at `current_position` is the one the vehicle is serving or driving
/// to. Everything before it has been resolved.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Route {
    vehicle: VehicleIdx,
    stops: Vec<Stop>,
    current_position: usize,
}

impl Route {
    pub fn new(vehicle: VehicleIdx, stops: Vec<Stop>) -> Self {
        debug_assert!(stops.first().is_some_and(|stop| stop.node().is_depot()));
        debug_assert!(stops.last().is_some_and(|stop| stop.node().is_depot()));

        Route {
            vehicle,
            stops,
            current_position: 0,
        }
    }

    /// Keeps the executed prefix of `previous` and continues with `planned`,
    /// which starts at the vehicle's current stop.
    pub(crate) fn continue_from(previous: &Route, planned: &[Stop]) -> Self {
        let cursor = previous.current_position;
        let mut stops = previous.stops[..=cursor].to_vec();

        if let Some((_, rest)) = planned.split_first() {
            let only_returns_to_depot = rest.len() == 1 && stops[cursor].node().is_depot();
            if !only_returns_to_depot {
                stops.extend_from_slice(rest);
            }
        }

        Route {
            vehicle: previous.vehicle,
            stops,
            current_position: cursor,
        }
    }

    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn current_position(&self) -> usize {
        self.current_position
    }

    pub fn current_stop(&self) -> &Stop {
        &self.stops[self.current_position]
    }

    pub fn is_finished(&self) -> bool {
        self.current_position + 1 >= self.stops.len()
    }

    pub fn has_left_depot(&self) -> bool {
        self.current_position > 0
    }

    /// Stops after the current one.
    pub fn remaining_stops(&self) -> &[Stop] {
        &self.stops[(self.current_position + 1).min(self.stops.len())..]
    }

    pub fn orders(&self) -> impl Iterator<Item = OrderIdx> + '_ {
        self.stops.iter().filter_map(Stop::order)
    }

    /// Meters from the first stop to the last.
    pub fn distance(&self) -> i64 {
        self.stops.iter().map(Stop::leg_distance).sum()
    }

    pub fn return_time(&self) -> Option<SignedDuration> {
        self.stops.last().map(Stop::arrival)
    }

    /// Resolves the stop at the cursor with `outcome`, then moves to the next
    /// stop. Depot stops are passed without an outcome. Does nothing once the
    /// vehicle is back at the terminal depot.
    ///
    /// Returns the order that was resolved, if any.
    pub fn advance(
        &mut self,
        outcome: StopOutcome,
        orders: &mut [Order],
        fleet: &mut Fleet,
    ) -> Result<Option<OrderIdx>, InvalidTransition> {
        if self.is_finished() {
            return Ok(None);
        }

        let resolved = self.current_stop().order();
        if let Some(order) = resolved {
            orders[order].update_status(outcome.status(self.vehicle), fleet)?;
        }

        self.current_position += 1;
        let node = self.current_stop().node();
        fleet.vehicle_mut(self.vehicle).set_current_node(node);

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::order::OrderStatus,
        test_utils::{create_delivery, create_fleet},
    };

    fn stop(node: StopNode, minutes: i64) -> Stop {
        Stop::new(node, SignedDuration::from_mins(minutes), 100)
    }

    fn scheduled_route(orders: &mut [Order], fleet: &mut Fleet) -> Route {
        let vehicle = VehicleIdx::new(0);
        for order in orders.iter_mut() {
            order
                .update_status(OrderStatus::Scheduled(vehicle), fleet)
                .unwrap();
        }

        Route::new(
            vehicle,
            vec![
                stop(StopNode::Depot, 0),
                stop(StopNode::Order(OrderIdx::new(0)), 10),
                stop(StopNode::Order(OrderIdx::new(1)), 20),
                stop(StopNode::Depot, 30),
            ],
        )
    }

    #[test]
    fn test_advance_resolves_stop_at_cursor() {
        let mut orders = vec![create_delivery(0.01, 0.0, 2.0), create_delivery(0.02, 0.0, 3.0)];
        let mut fleet = create_fleet(&[10.0]);
        let mut route = scheduled_route(&mut orders, &mut fleet);

        // Leaving the depot resolves nothing.
        let resolved = route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();
        assert_eq!(resolved, None);
        assert_eq!(route.current_position(), 1);
        assert_eq!(
            fleet.vehicle(VehicleIdx::new(0)).current_node(),
            StopNode::Order(OrderIdx::new(0))
        );

        let resolved = route.advance(StopOutcome::Failed, &mut orders, &mut fleet).unwrap();
        assert_eq!(resolved, Some(OrderIdx::new(0)));
        assert_eq!(orders[0].status(), OrderStatus::Failed(VehicleIdx::new(0)));
        assert_eq!(fleet.vehicle(VehicleIdx::new(0)).actual_capacity().value(), 8.0);
    }

    #[test]
    fn test_advance_is_idempotent_at_terminal_depot() {
        let mut orders = vec![create_delivery(0.01, 0.0, 2.0), create_delivery(0.02, 0.0, 3.0)];
        let mut fleet = create_fleet(&[10.0]);
        let mut route = scheduled_route(&mut orders, &mut fleet);

        for _ in 0..3 {
            route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();
        }
        assert!(route.is_finished());
        let snapshot = route.clone();

        for _ in 0..3 {
            let resolved = route.advance(StopOutcome::Failed, &mut orders, &mut fleet).unwrap();
            assert_eq!(resolved, None);
        }

        assert_eq!(route, snapshot);
        assert_eq!(route.current_position(), 3);
        assert!(orders.iter().all(|order| order.status().is_terminal()));
    }

    #[test]
    fn test_failed_transition_keeps_cursor() {
        let mut orders = vec![create_delivery(0.01, 0.0, 2.0), create_delivery(0.02, 0.0, 3.0)];
        let mut fleet = create_fleet(&[10.0]);
        let mut route = scheduled_route(&mut orders, &mut fleet);
        route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();
        orders[0]
            .update_status(OrderStatus::Postponed, &mut fleet)
            .unwrap();

        let result = route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet);

        assert!(result.is_err());
        assert_eq!(route.current_position(), 1);
    }

    #[test]
    fn test_continue_from_keeps_executed_prefix() {
        let mut orders = vec![create_delivery(0.01, 0.0, 2.0), create_delivery(0.02, 0.0, 3.0)];
        let mut fleet = create_fleet(&[10.0]);
        let mut route = scheduled_route(&mut orders, &mut fleet);
        route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();
        route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();

        let planned = [
            stop(StopNode::Order(OrderIdx::new(1)), 25),
            stop(StopNode::Order(OrderIdx::new(2)), 40),
            stop(StopNode::Depot, 55),
        ];
        let rebuilt = Route::continue_from(&route, &planned);

        assert_eq!(rebuilt.current_position(), 2);
        let nodes: Vec<StopNode> = rebuilt.stops().iter().map(Stop::node).collect();
        assert_eq!(
            nodes,
            vec![
                StopNode::Depot,
                StopNode::Order(OrderIdx::new(0)),
                StopNode::Order(OrderIdx::new(1)),
                StopNode::Order(OrderIdx::new(2)),
                StopNode::Depot,
            ]
        );
        // The current stop keeps its previous prediction.
        assert_eq!(rebuilt.current_stop().arrival(), SignedDuration::from_mins(20));
    }

    #[test]
    fn test_continue_from_terminal_depot_without_orders() {
        let mut orders = vec![create_delivery(0.01, 0.0, 2.0), create_delivery(0.02, 0.0, 3.0)];
        let mut fleet = create_fleet(&[10.0]);
        let mut route = scheduled_route(&mut orders, &mut fleet);
        for _ in 0..3 {
            route.advance(StopOutcome::Succeeded, &mut orders, &mut fleet).unwrap();
        }

        let planned = [stop(StopNode::Depot, 60), stop(StopNode::Depot, 60)];
        let rebuilt = Route::continue_from(&route, &planned);

        assert_eq!(rebuilt, route);
    }
}
