use crate::{model::routing_model::RoutingModel, solver::{assignment::Assignment, route_evaluator::RouteEvaluator, routing_solver::SolveError}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub slot: usize,
    /// The index is placed before the element currently at `position`.
    pub position: usize,
    pub delta: i64,
}

/// Routes under construction. Every route starts with its slot's start index
/// and ends with its end index.
pub struct SearchState<'a> {
    model: &'a RoutingModel,
    evaluator: RouteEvaluator<'a>,
    routes: Vec<Vec<usize>>,
    assigned: Vec<bool>,
}

impl<'a> SearchState<'a> {
    pub fn new(model: &'a RoutingModel) -> Self {
        let manager = model.manager();
        let routes = (0..manager.num_vehicles())
            .map(|slot| vec![manager.start(slot), manager.end(slot)])
            .collect();

        SearchState {
            model,
            evaluator: RouteEvaluator::new(model),
            routes,
            assigned: vec![false; manager.num_visitable()],
        }
    }

    pub fn model(&self) -> &'a RoutingModel {
        self.model
    }

    pub fn evaluator(&self) -> &RouteEvaluator<'a> {
        &self.evaluator
    }

    pub fn num_slots(&self) -> usize {
        self.routes.len()
    }

    pub fn route(&self, slot: usize) -> &[usize] {
        &self.routes[slot]
    }

    pub fn is_assigned(&self, index: usize) -> bool {
        self.assigned[index]
    }

    pub fn unassigned(&self) -> Vec<usize> {
        self.model
            .manager()
            .visitable_indices()
            .filter(|&index| !self.assigned[index])
            .collect()
    }

    /// Slots `index` may be routed on.
    pub fn allowed_slots(&self, index: usize) -> std::ops::Range<usize> {
        match self.model.pinned_slot(index) {
            Some(slot) => slot..slot + 1,
            None => 0..self.routes.len(),
        }
    }

    pub fn insertion_delta(&self, route: &[usize], index: usize, position: usize) -> i64 {
        let prev = route[position - 1];
        let next = route[position];
        self.model.arc_cost(prev, index) + self.model.arc_cost(index, next)
            - self.model.arc_cost(prev, next)
    }

    pub fn removal_gain(&self, route: &[usize], position: usize) -> i64 {
        let prev = route[position - 1];
        let index = route[position];
        let next = route[position + 1];
        self.model.arc_cost(prev, index) + self.model.arc_cost(index, next)
            - self.model.arc_cost(prev, next)
    }

    pub fn is_feasible_with(&self, slot: usize, route: &[usize], index: usize, position: usize) -> bool {
        let mut sequence = Vec::with_capacity(route.len() + 1);
        sequence.extend_from_slice(&route[..position]);
        sequence.push(index);
        sequence.extend_from_slice(&route[position..]);
        self.evaluator.is_feasible(slot, &sequence)
    }

    /// Cheapest feasible insertion with `delta < max_delta`.
    /// `base` replaces the current route of `base_slot`, when given.
    pub fn best_insertion(
        &self,
        index: usize,
        max_delta: Option<i64>,
        base: Option<(usize, &[usize])>,
    ) -> Option<Insertion> {
        let route_of = |slot: usize| match base {
            Some((base_slot, route)) if base_slot == slot => route,
            _ => self.routes[slot].as_slice(),
        };

        let mut candidates: Vec<Insertion> = self
            .allowed_slots(index)
            .flat_map(|slot| {
                let route = route_of(slot);
                (1..route.len()).map(move |position| Insertion {
                    slot,
                    position,
                    delta: self.insertion_delta(route, index, position),
                })
            })
            .filter(|insertion| max_delta.is_none_or(|max| insertion.delta < max))
            .collect();
        candidates.sort_by_key(|insertion| insertion.delta);

        candidates.into_iter().find(|insertion| {
            self.is_feasible_with(
                insertion.slot,
                route_of(insertion.slot),
                index,
                insertion.position,
            )
        })
    }

    pub fn insert(&mut self, index: usize, slot: usize, position: usize) {
        self.routes[slot].insert(position, index);
        self.assigned[index] = true;
    }

    /// Appends before the end index when the route stays feasible.
    pub fn try_append(&mut self, index: usize, slot: usize) -> bool {
        let position = self.routes[slot].len() - 1;
        if !self.is_feasible_with(slot, &self.routes[slot], index, position) {
            return false;
        }
        self.insert(index, slot, position);
        true
    }

    pub fn remove(&mut self, slot: usize, position: usize) -> usize {
        let index = self.routes[slot].remove(position);
        self.assigned[index] = false;
        index
    }

    pub fn objective(&self) -> i64 {
        let routing: i64 = self
            .routes
            .iter()
            .map(|route| self.evaluator.route_cost(route))
            .sum();
        let penalties: i64 = self
            .unassigned()
            .into_iter()
            .filter_map(|index| self.model.penalty(index))
            .sum();
        routing + penalties
    }

    pub fn into_assignment(self) -> Result<Assignment, SolveError> {
        let objective = self.objective();
        let dropped = self.unassigned();

        let arrivals = self
            .routes
            .iter()
            .enumerate()
            .map(|(slot, route)| {
                self.evaluator.schedule(slot, route).ok_or_else(|| {
                    SolveError::NoSolution(format!("route of vehicle slot {slot} is infeasible"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Assignment::new(self.routes, arrivals, dropped, objective))
    }
}
