use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{
    model::{
        routing_model::RoutingModel,
        search_parameters::{FirstSolutionStrategy, LocalSearchMetaheuristic},
    },
    solver::{
        assignment::Assignment,
        relocate::RelocateSearch,
        routing_solver::{RoutingSolver, SolveError},
        search_state::SearchState,
    },
};

/// Built-in solver: warm start, pinned orders, then cheapest insertion in
/// decreasing order of distance from the depot, improved by relocation until
/// the time limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsertionSolver;

impl InsertionSolver {
    pub fn new() -> Self {
        InsertionSolver
    }

    fn apply_warm_start(&self, state: &mut SearchState) {
        let model = state.model();

        for slot in 0..state.num_slots() {
            for &index in model.warm_start(slot) {
                let pinned_elsewhere = model.pinned_slot(index).is_some_and(|pin| pin != slot);
                if state.is_assigned(index) || pinned_elsewhere {
                    continue;
                }

                // Only the feasible prefix of a hint is kept.
                if !state.try_append(index, slot) {
                    debug!(slot, index, "Warm start hint truncated");
                    break;
                }
            }
        }
    }

    fn insert_pinned(&self, state: &mut SearchState) -> Result<(), SolveError> {
        let model = state.model();

        for index in state.unassigned() {
            let Some(slot) = model.pinned_slot(index) else {
                continue;
            };

            let insertion = state.best_insertion(index, None, None).ok_or_else(|| {
                SolveError::NoSolution(format!(
                    "order at index {index} does not fit on its vehicle slot {slot}"
                ))
            })?;
            state.insert(index, insertion.slot, insertion.position);
        }

        Ok(())
    }

    /// Farthest orders first: they are the hardest to serve later.
    fn insertion_order(&self, state: &SearchState) -> Vec<usize> {
        let model = state.model();
        let depot = model.manager().end(0);

        let mut pending = state.unassigned();
        pending.sort_by_key(|&index| std::cmp::Reverse(model.arc_cost(depot, index)));
        pending
    }

    fn construct(&self, state: &mut SearchState) -> Result<(), SolveError> {
        for index in self.insertion_order(state) {
            let penalty = state.model().penalty(index);

            match state.best_insertion(index, penalty, None) {
                Some(insertion) => state.insert(index, insertion.slot, insertion.position),
                None if penalty.is_none() => {
                    return Err(SolveError::NoSolution(format!(
                        "mandatory order at index {index} cannot be routed"
                    )));
                }
                None => {}
            }
        }

        Ok(())
    }
}

impl RoutingSolver for InsertionSolver {
    fn solve(&self, model: &RoutingModel) -> Result<Assignment, SolveError> {
        let started = Instant::now();
        let parameters = model.search_parameters();
        let time_limit = Duration::try_from(parameters.time_limit).unwrap_or(Duration::ZERO);
        let deadline = started + time_limit;

        if model.manager().num_vehicles() == 0 {
            return Err(SolveError::NoSolution("no vehicle to route".to_owned()));
        }

        let mut state = SearchState::new(model);
        self.apply_warm_start(&mut state);
        self.insert_pinned(&mut state)?;

        match parameters.first_solution_strategy {
            FirstSolutionStrategy::AllUnperformed => {}
            FirstSolutionStrategy::Automatic
            | FirstSolutionStrategy::BestInsertion
            | FirstSolutionStrategy::ParallelCheapestInsertion
            | FirstSolutionStrategy::LocalCheapestInsertion => self.construct(&mut state)?,
            strategy => {
                debug!(?strategy, "Falling back to cheapest insertion");
                self.construct(&mut state)?;
            }
        }

        let constructed = state.objective();

        let moves = match parameters.local_search_metaheuristic {
            LocalSearchMetaheuristic::Automatic | LocalSearchMetaheuristic::GreedyDescent => {
                RelocateSearch::new(deadline).run(&mut state)
            }
            metaheuristic => {
                debug!(?metaheuristic, "Falling back to greedy descent");
                RelocateSearch::new(deadline).run(&mut state)
            }
        };

        let assignment = state.into_assignment()?;

        info!(
            constructed,
            objective = assignment.objective(),
            dropped = assignment.dropped().len(),
            moves,
            elapsed = ?started.elapsed(),
            "Search finished"
        );

        Ok(assignment)
    }
}
