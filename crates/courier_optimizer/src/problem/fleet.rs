use crate::{
    problem::{
        order::{Order, OrderStatus},
        stop_node::StopNode,
        vehicle::{Vehicle, VehicleIdx},
        volume::Volume,
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Ordered collection of vehicles plus the per-vehicle lists the solver needs.
/// `update` must be called whenever routes or capacities change.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    capacities: Vec<i64>,
    start_nodes: Vec<StopNode>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        let mut fleet = Fleet {
            vehicles,
            capacities: Vec::new(),
            start_nodes: Vec::new(),
        };
        fleet.refresh_derived();
        fleet
    }

    #[inline]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[inline]
    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    pub fn get(&self, vehicle_id: VehicleIdx) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id.get())
    }

    pub(crate) fn vehicle_mut(&mut self, vehicle_id: VehicleIdx) -> &mut Vehicle {
        &mut self.vehicles[vehicle_id]
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleIdx> + use<> {
        (0..self.vehicles.len()).map(VehicleIdx::new)
    }

    /// Actual capacity of each vehicle in solver units.
    pub fn capacities(&self) -> &[i64] {
        &self.capacities
    }

    pub fn start_nodes(&self) -> &[StopNode] {
        &self.start_nodes
    }

    /// Routes always end at the depot.
    pub fn end_nodes(&self) -> impl Iterator<Item = StopNode> + '_ {
        self.vehicles.iter().map(|_| StopNode::Depot)
    }

    /// Recomputes onboard cargo from the orders' statuses, then the derived lists.
    pub fn update(&mut self, orders: &[Order]) {
        let mut onboard = vec![Volume::ZERO; self.vehicles.len()];
        for order in orders.iter().filter(|order| order.is_delivery()) {
            if let OrderStatus::Scheduled(vehicle) = order.status() {
                onboard[vehicle.get()] += order.volume();
            }
        }

        for (vehicle_id, volume) in onboard.into_iter().enumerate_idx() {
            let vehicle = self.vehicle_mut(vehicle_id);
            let current = vehicle.onboard_volume();
            vehicle.unload_delivery(current);
            vehicle.load_delivery(volume);
        }

        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.capacities = self
            .vehicles
            .iter()
            .map(|vehicle| vehicle.actual_capacity().capacity_units())
            .collect();
        self.start_nodes = self
            .vehicles
            .iter()
            .map(|vehicle| vehicle.current_node())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_delivery, create_fleet};

    #[test]
    fn test_update_recomputes_onboard_and_lists() {
        let mut fleet = create_fleet(&[10.0, 8.5]);
        let mut orders = vec![
            create_delivery(0.01, 0.0, 3.0),
            create_delivery(0.02, 0.0, 2.0),
        ];

        orders[0]
            .update_status(OrderStatus::Scheduled(VehicleIdx::new(1)), &mut fleet)
            .unwrap();
        orders[1]
            .update_status(OrderStatus::Scheduled(VehicleIdx::new(1)), &mut fleet)
            .unwrap();

        fleet.update(&orders);

        assert_eq!(fleet.capacities(), &[10, 8]);
        assert_eq!(fleet.start_nodes(), &[StopNode::Depot, StopNode::Depot]);
        assert_eq!(
            fleet.vehicle(VehicleIdx::new(1)).available_capacity().value(),
            3.5
        );
        assert_eq!(fleet.end_nodes().count(), 2);
    }
}
