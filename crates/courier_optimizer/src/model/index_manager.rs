use fxhash::FxHashMap;

use crate::problem::{stop_node::StopNode, vehicle::VehicleIdx};

/// Maps model nodes to solver indices and back.
///
/// Node 0 is the depot and every other node is an order. Solver indices are laid out as
/// `[visitable nodes.., vehicle starts.., vehicle ends..]`: each vehicle slot owns
/// a start index (its start node) and an end index (the depot). Nodes used as a
/// vehicle start are not visitable, and neither is the depot.
#[derive(Debug, Clone)]
pub struct IndexManager {
    nodes: Vec<StopNode>,
    index_to_node: Vec<usize>,
    node_to_index: FxHashMap<usize, usize>,
    num_visitable: usize,
    vehicles: Vec<VehicleIdx>,
}

impl IndexManager {
    /// `start_nodes[slot]` is the node vehicle `vehicles[slot]` starts from.
    pub fn new(nodes: Vec<StopNode>, start_nodes: &[usize], vehicles: Vec<VehicleIdx>) -> Self {
        debug_assert_eq!(start_nodes.len(), vehicles.len());

        let is_start = |node: usize| start_nodes.contains(&node);

        let mut index_to_node: Vec<usize> = (1..nodes.len()).filter(|&node| !is_start(node)).collect();
        let num_visitable = index_to_node.len();

        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(index, &node)| (node, index))
            .collect();

        index_to_node.extend_from_slice(start_nodes);
        index_to_node.extend(std::iter::repeat_n(0, vehicles.len()));

        IndexManager {
            nodes,
            index_to_node,
            node_to_index,
            num_visitable,
            vehicles,
        }
    }

    pub fn num_indices(&self) -> usize {
        self.index_to_node.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    pub fn num_visitable(&self) -> usize {
        self.num_visitable
    }

    pub fn visitable_indices(&self) -> std::ops::Range<usize> {
        0..self.num_visitable
    }

    pub fn start(&self, slot: usize) -> usize {
        self.num_visitable + slot
    }

    pub fn end(&self, slot: usize) -> usize {
        self.num_visitable + self.vehicles.len() + slot
    }

    pub fn is_start(&self, index: usize) -> bool {
        (self.num_visitable..self.num_visitable + self.vehicles.len()).contains(&index)
    }

    pub fn is_end(&self, index: usize) -> bool {
        index >= self.num_visitable + self.vehicles.len()
    }

    pub fn index_to_node(&self, index: usize) -> usize {
        self.index_to_node[index]
    }

    /// Only visitable nodes have an index of their own.
    pub fn node_to_index(&self, node: usize) -> Option<usize> {
        self.node_to_index.get(&node).copied()
    }

    pub fn node(&self, node: usize) -> StopNode {
        self.nodes[node]
    }

    pub fn nodes(&self) -> &[StopNode] {
        &self.nodes
    }

    pub fn stop_node(&self, index: usize) -> StopNode {
        self.nodes[self.index_to_node(index)]
    }

    pub fn vehicle(&self, slot: usize) -> VehicleIdx {
        self.vehicles[slot]
    }

    pub fn vehicles(&self) -> &[VehicleIdx] {
        &self.vehicles
    }

    pub fn slot_of(&self, vehicle: VehicleIdx) -> Option<usize> {
        self.vehicles.iter().position(|&candidate| candidate == vehicle)
    }
}
