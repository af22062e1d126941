use crate::model::{
    callbacks::CostFunction, dimension::Dimension, index_manager::IndexManager,
    search_parameters::SearchParameters,
};

/// Everything a solver needs: index space, arc costs, dimensions, disjunctions,
/// pins and an optional warm start.
pub struct RoutingModel {
    manager: IndexManager,
    arc_cost: Box<dyn CostFunction>,
    dimensions: Vec<Dimension>,
    start_cumul_equalities: Vec<(usize, usize)>,
    penalties: Vec<Option<i64>>,
    pins: Vec<Option<usize>>,
    warm_start: Vec<Vec<usize>>,
    time_dimension: Option<usize>,
    search_parameters: SearchParameters,
}

impl RoutingModel {
    pub fn new(
        manager: IndexManager,
        arc_cost: Box<dyn CostFunction>,
        search_parameters: SearchParameters,
    ) -> Self {
        let num_indices = manager.num_indices();
        let num_vehicles = manager.num_vehicles();

        RoutingModel {
            manager,
            arc_cost,
            dimensions: Vec::new(),
            start_cumul_equalities: Vec::new(),
            penalties: vec![None; num_indices],
            pins: vec![None; num_indices],
            warm_start: vec![Vec::new(); num_vehicles],
            time_dimension: None,
            search_parameters,
        }
    }

    pub fn add_dimension(&mut self, dimension: Dimension) -> usize {
        self.dimensions.push(dimension);
        self.dimensions.len() - 1
    }

    /// Both dimensions must have no slack.
    pub fn add_start_cumul_equality(&mut self, first: usize, second: usize) {
        self.start_cumul_equalities.push((first, second));
    }

    /// Lets `index` be left unperformed at `penalty`.
    pub fn add_disjunction(&mut self, index: usize, penalty: i64) {
        self.penalties[index] = Some(penalty);
    }

    /// Forces `index` onto the route of vehicle `slot`.
    pub fn pin(&mut self, index: usize, slot: usize) {
        self.pins[index] = Some(slot);
    }

    pub fn set_warm_start(&mut self, slot: usize, indices: Vec<usize>) {
        self.warm_start[slot] = indices;
    }

    /// The dimension whose cumuls are reported as arrival times.
    pub fn set_time_dimension(&mut self, dimension: usize) {
        self.time_dimension = Some(dimension);
    }

    pub fn manager(&self) -> &IndexManager {
        &self.manager
    }

    #[inline]
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        self.arc_cost.cost(from, to)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_mut(&mut self, dimension: usize) -> &mut Dimension {
        &mut self.dimensions[dimension]
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name() == name)
    }

    pub fn start_cumul_equalities(&self) -> &[(usize, usize)] {
        &self.start_cumul_equalities
    }

    pub fn penalty(&self, index: usize) -> Option<i64> {
        self.penalties[index]
    }

    pub fn pinned_slot(&self, index: usize) -> Option<usize> {
        self.pins[index]
    }

    pub fn warm_start(&self, slot: usize) -> &[usize] {
        &self.warm_start[slot]
    }

    pub fn has_warm_start(&self) -> bool {
        self.warm_start.iter().any(|hint| !hint.is_empty())
    }

    pub fn time_dimension(&self) -> Option<usize> {
        self.time_dimension
    }

    pub fn search_parameters(&self) -> &SearchParameters {
        &self.search_parameters
    }

    pub fn set_search_parameters(&mut self, search_parameters: SearchParameters) {
        self.search_parameters = search_parameters;
    }
}
