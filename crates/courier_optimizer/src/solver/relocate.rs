use std::time::Instant;

use tracing::trace;

use crate::solver::search_state::{Insertion, SearchState};

/// Improvement phase: moves single orders to their cheapest feasible position
/// (on any allowed route, or out of the plan when the penalty is lower) and
/// retries dropped orders. Stops at the deadline or when no move improves.
pub struct RelocateSearch {
    deadline: Instant,
}

enum Move {
    Insert(Insertion),
    Drop,
}

impl RelocateSearch {
    pub fn new(deadline: Instant) -> Self {
        RelocateSearch { deadline }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Returns the number of moves applied.
    pub fn run(&self, state: &mut SearchState) -> usize {
        let mut moves = 0;

        loop {
            let mut improved = false;

            for slot in 0..state.num_slots() {
                let mut position = 1;
                while position + 1 < state.route(slot).len() {
                    if self.is_expired() {
                        return moves;
                    }

                    if self.try_relocate(state, slot, position) {
                        moves += 1;
                        improved = true;
                    } else {
                        position += 1;
                    }
                }
            }

            for index in state.unassigned() {
                if self.is_expired() {
                    return moves;
                }

                let Some(penalty) = state.model().penalty(index) else {
                    continue;
                };
                if let Some(insertion) = state.best_insertion(index, Some(penalty), None) {
                    trace!(index, slot = insertion.slot, "Reinserted dropped order");
                    state.insert(index, insertion.slot, insertion.position);
                    moves += 1;
                    improved = true;
                }
            }

            if !improved {
                return moves;
            }
        }
    }

    fn try_relocate(&self, state: &mut SearchState, slot: usize, position: usize) -> bool {
        let route = state.route(slot);
        let index = route[position];
        let gain = state.removal_gain(route, position);

        let mut without = route.to_vec();
        without.remove(position);
        if !state.evaluator().is_feasible(slot, &without) {
            return false;
        }

        let candidate = state
            .best_insertion(index, Some(gain), Some((slot, without.as_slice())))
            .map(Move::Insert)
            .or_else(|| {
                let penalty = state.model().penalty(index)?;
                let can_drop = state.model().pinned_slot(index).is_none() && penalty < gain;
                can_drop.then_some(Move::Drop)
            });

        match candidate {
            Some(Move::Insert(insertion)) => {
                trace!(index, from = slot, to = insertion.slot, "Relocated order");
                state.remove(slot, position);
                state.insert(index, insertion.slot, insertion.position);
            }
            Some(Move::Drop) => {
                trace!(index, slot, "Dropped order");
                state.remove(slot, position);
            }
            None => return false,
        }

        true
    }
}
