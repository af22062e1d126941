use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{
    clustering::Partitioner,
    problem::{
        order::{Order, OrderIdx, StopOutcome},
        vehicle::VehicleIdx,
    },
    session::{error::SessionError, summary::SolutionSummary, vrp_session::VrpSession},
};

/// A session shared between threads. One caller mutates it at a time; a solve
/// holds the lock for its whole time limit.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<VrpSession>>,
}

impl SharedSession {
    pub fn new(session: VrpSession) -> Self {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, VrpSession> {
        self.inner.lock()
    }

    pub fn solve(&self) -> Result<(), SessionError> {
        self.inner.lock().solve()
    }

    pub fn solve_clustered(&self, partitioner: &dyn Partitioner) -> Result<(), SessionError> {
        self.inner.lock().solve_clustered(partitioner)
    }

    pub fn advance(
        &self,
        vehicle: VehicleIdx,
        outcome: StopOutcome,
    ) -> Result<Option<OrderIdx>, SessionError> {
        self.inner.lock().advance(vehicle, outcome)
    }

    pub fn reroute(&self) -> Result<(), SessionError> {
        self.inner.lock().reroute()
    }

    pub fn add_dynamic_order(&self, order: Order) -> OrderIdx {
        self.inner.lock().add_dynamic_order(order)
    }

    pub fn summary(&self) -> SolutionSummary {
        self.inner.lock().summary()
    }
}
