use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{stop_node::StopNode, volume::Volume},
};

define_index_newtype!(VehicleIdx, Vehicle);

/// A delivery partner's vehicle.
///
/// * `total_capacity` is the size of the container.
/// * `actual_capacity` excludes space taken by cargo stuck in the container for
///   the rest of the day (failed deliveries, completed pickups). It only decreases.
/// * `onboard` is the volume of deliveries scheduled on the vehicle and not yet resolved.
#[derive(Serialize, Debug, Clone)]
pub struct Vehicle {
    external_id: String,
    total_capacity: Volume,
    actual_capacity: Volume,
    onboard: Volume,
    current_node: StopNode,
}

impl Vehicle {
    pub fn new(external_id: String, total_capacity: Volume) -> Self {
        Vehicle {
            external_id,
            total_capacity,
            actual_capacity: total_capacity,
            onboard: Volume::ZERO,
            current_node: StopNode::Depot,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn total_capacity(&self) -> Volume {
        self.total_capacity
    }

    pub fn actual_capacity(&self) -> Volume {
        self.actual_capacity
    }

    pub fn available_capacity(&self) -> Volume {
        self.actual_capacity - self.onboard
    }

    pub fn onboard_volume(&self) -> Volume {
        self.onboard
    }

    pub fn current_node(&self) -> StopNode {
        self.current_node
    }

    pub(crate) fn set_current_node(&mut self, node: StopNode) {
        self.current_node = node;
    }

    pub(crate) fn load_delivery(&mut self, volume: Volume) {
        self.onboard += volume;
    }

    pub(crate) fn unload_delivery(&mut self, volume: Volume) {
        self.onboard = self.onboard - volume;
    }

    pub(crate) fn reduce_actual_capacity(&mut self, volume: Volume) {
        self.actual_capacity = self.actual_capacity - volume;
    }
}
