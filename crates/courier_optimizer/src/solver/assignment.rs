/// Solver output, expressed in solver indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    routes: Vec<Vec<usize>>,
    arrivals: Vec<Vec<i64>>,
    dropped: Vec<usize>,
    objective: i64,
}

impl Assignment {
    /// `routes[slot]` runs from the slot's start index to its end index.
    /// `arrivals[slot][position]` is the earliest time cumul at that position.
    pub fn new(
        routes: Vec<Vec<usize>>,
        arrivals: Vec<Vec<i64>>,
        dropped: Vec<usize>,
        objective: i64,
    ) -> Self {
        Assignment {
            routes,
            arrivals,
            dropped,
            objective,
        }
    }

    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub fn route(&self, slot: usize) -> &[usize] {
        &self.routes[slot]
    }

    /// Empty when the model has no time dimension.
    pub fn arrivals(&self, slot: usize) -> &[i64] {
        self.arrivals.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    pub fn objective(&self) -> i64 {
        self.objective
    }

    pub fn is_vehicle_used(&self, slot: usize) -> bool {
        self.routes[slot].len() > 2
    }
}
