use std::sync::Arc;

use courier_matrix_providers::travel_matrix_client::TravelMatrixClient;
use fxhash::FxHashSet;
use jiff::{SignedDuration, Timestamp};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument, warn};

use crate::{
    clustering::Partitioner,
    model::{
        problem_builder::{BuildMode, ProblemBuilder, ProblemInput},
        routing_model::RoutingModel,
    },
    problem::{
        depot::Depot,
        error::{InvalidOrder, OrderCollection},
        fleet::Fleet,
        ingest::RawOrder,
        location::Location,
        order::{Order, OrderIdx, OrderStatus, StopOutcome},
        stop_node::NodeKind,
        vehicle::{Vehicle, VehicleIdx},
    },
    routes::{
        route::{Route, Stop},
        routes_list::{RouteSlot, RoutesList},
    },
    session::{
        error::SessionError, session_params::SessionParams, session_state::SessionState,
        summary::SolutionSummary,
    },
    solver::{
        assignment::Assignment, insertion_solver::InsertionSolver, routing_solver::RoutingSolver,
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Solver output for one group of vehicles, in entity terms.
struct PlannedRoutes {
    routes: Vec<(VehicleIdx, Vec<Stop>)>,
    dropped: Vec<OrderIdx>,
    objective: i64,
}

/// Orders handed to one solver call and the vehicles that serve them.
struct ClusterJob {
    vehicles: Vec<VehicleIdx>,
    orders: Vec<OrderIdx>,
}

impl PlannedRoutes {
    fn from_assignment(model: &RoutingModel, assignment: &Assignment) -> Self {
        let manager = model.manager();

        let routes = (0..manager.num_vehicles())
            .map(|slot| {
                let indices = assignment.route(slot);
                let arrivals = assignment.arrivals(slot);
                let stops = indices
                    .iter()
                    .enumerate()
                    .map(|(position, &index)| {
                        let leg_distance = match position {
                            0 => 0,
                            _ => model.arc_cost(indices[position - 1], index),
                        };
                        let arrival = arrivals.get(position).copied().unwrap_or(0);
                        Stop::new(
                            manager.stop_node(index),
                            SignedDuration::from_mins(arrival),
                            leg_distance,
                        )
                    })
                    .collect();
                (manager.vehicle(slot), stops)
            })
            .collect();

        let dropped = assignment
            .dropped()
            .iter()
            .filter_map(|&index| manager.stop_node(index).order())
            .collect();

        PlannedRoutes {
            routes,
            dropped,
            objective: assignment.objective(),
        }
    }
}

/// The problem state of one dispatch day: orders, fleet, routes and the
/// session clock. Every solver call goes through here.
pub struct VrpSession {
    depot: Depot,
    orders: Vec<Order>,
    fleet: Fleet,
    routes: RoutesList,
    state: SessionState,
    params: SessionParams,
    /// Time elapsed since the shift start.
    clock: SignedDuration,
    objective: Option<i64>,
    solver: Arc<dyn RoutingSolver>,
    matrix_client: TravelMatrixClient,
}

impl VrpSession {
    pub fn new(depot: Depot, orders: Vec<Order>, vehicles: Vec<Vehicle>, params: SessionParams) -> Self {
        let fleet = Fleet::new(vehicles);

        VrpSession {
            depot,
            orders: orders.into_iter().map(Order::into_unrouted).collect(),
            routes: RoutesList::empty(fleet.len()),
            fleet,
            state: SessionState::Unsolved,
            params,
            clock: SignedDuration::ZERO,
            objective: None,
            solver: Arc::new(InsertionSolver::new()),
            matrix_client: TravelMatrixClient::new(),
        }
    }

    pub fn with_solver(mut self, solver: Arc<dyn RoutingSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_matrix_client(mut self, matrix_client: TravelMatrixClient) -> Self {
        self.matrix_client = matrix_client;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order: OrderIdx) -> Option<&Order> {
        self.orders.get(order.get())
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.fleet.vehicles()
    }

    pub fn routes(&self) -> &RoutesList {
        &self.routes
    }

    pub fn route(&self, vehicle: VehicleIdx) -> Option<&Route> {
        self.routes.get(vehicle)
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Time elapsed since the shift start.
    pub fn clock(&self) -> SignedDuration {
        self.clock
    }

    /// Objective of the last successful solve or reroute.
    pub fn objective(&self) -> Option<i64> {
        self.objective
    }

    /// When the order's vehicle is expected to reach it.
    pub fn predicted_arrival(&self, order: OrderIdx) -> Option<Timestamp> {
        let vehicle = self.order(order)?.vehicle()?;
        let stop = self
            .routes
            .get(vehicle)?
            .stops()
            .iter()
            .find(|stop| stop.order() == Some(order))?;

        self.params.shift_start.checked_add(stop.arrival()).ok()
    }

    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary::new(self)
    }

    fn ensure(&self, allowed: bool, operation: &'static str) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Cold solves rebuild every route from the depot, so they are only
    /// allowed while no vehicle has left it.
    fn ensure_cold_start(&self) -> Result<(), SessionError> {
        self.ensure(self.state.can_solve(), "solve")?;
        if self.routes.routes().any(Route::has_left_depot) {
            return Err(SessionError::ExecutionStarted);
        }
        Ok(())
    }

    /// Orders a solve may place: everything not resolved yet, except the stops
    /// vehicles are currently at, which become their route starts.
    fn candidates(&self) -> Vec<OrderIdx> {
        let current_stops: FxHashSet<OrderIdx> = self
            .fleet
            .vehicles()
            .iter()
            .filter_map(|vehicle| vehicle.current_node().order())
            .collect();

        self.orders
            .iter()
            .enumerate_idx()
            .filter_map(|(order_id, order): (OrderIdx, &Order)| {
                let is_candidate =
                    order.status().is_candidate() && !current_stops.contains(&order_id);
                is_candidate.then_some(order_id)
            })
            .collect()
    }

    fn plan(
        &self,
        vehicles: &[VehicleIdx],
        candidates: &[OrderIdx],
        mode: BuildMode,
    ) -> Result<PlannedRoutes, SessionError> {
        let model = ProblemBuilder::new(&self.params, &self.matrix_client).build(&ProblemInput {
            depot: &self.depot,
            orders: &self.orders,
            fleet: &self.fleet,
            candidates,
            vehicles,
            now: self.clock.as_mins(),
            mode,
        })?;

        let assignment = self.solver.solve(&model)?;

        Ok(PlannedRoutes::from_assignment(&model, &assignment))
    }

    fn rebuild_slot(&self, vehicle: VehicleIdx, stops: &[Stop]) -> RouteSlot {
        match self.routes.get(vehicle) {
            Some(previous) if previous.has_left_depot() => {
                RouteSlot::Route(Route::continue_from(previous, stops))
            }
            _ if stops.iter().any(|stop| stop.order().is_some()) => {
                RouteSlot::Route(Route::new(vehicle, stops.to_vec()))
            }
            _ => RouteSlot::NoRoute,
        }
    }

    /// Applies every plan to copies of the orders, fleet and routes, and only
    /// swaps them in when all of it went through.
    fn commit(&mut self, plans: Vec<PlannedRoutes>, postponed: &[OrderIdx]) -> Result<(), SessionError> {
        let mut orders = self.orders.clone();
        let mut fleet = self.fleet.clone();
        let mut slots = self.routes.slots().to_vec();

        for plan in &plans {
            for (vehicle, stops) in &plan.routes {
                // The first stop is where the vehicle stands, already scheduled on it.
                for order in stops.iter().skip(1).filter_map(Stop::order) {
                    orders[order].update_status(OrderStatus::Scheduled(*vehicle), &mut fleet)?;
                }
                slots[vehicle.get()] = self.rebuild_slot(*vehicle, stops);
            }
        }

        let dropped = plans.iter().flat_map(|plan| plan.dropped.iter());
        for &order in dropped.chain(postponed) {
            orders[order].update_status(OrderStatus::Postponed, &mut fleet)?;
        }

        fleet.update(&orders);

        self.objective = Some(plans.iter().map(|plan| plan.objective).sum());
        self.orders = orders;
        self.fleet = fleet;
        self.routes = RoutesList::from_slots(slots);

        Ok(())
    }

    /// Cold solve over every open order. Problems larger than the configured
    /// cluster size are split with the sweep partitioner.
    #[instrument(skip_all, level = "debug")]
    pub fn solve(&mut self) -> Result<(), SessionError> {
        self.ensure_cold_start()?;

        let candidates = self.candidates();
        if candidates.len() > self.params.cluster_size {
            let partitioner = self.params.sweep_partitioner();
            return self.solve_clustered(&partitioner);
        }

        let vehicles: Vec<VehicleIdx> = self.fleet.vehicle_ids().collect();
        let plan = self.plan(&vehicles, &candidates, BuildMode::Cold)?;
        self.commit(vec![plan], &[])?;
        self.state = SessionState::Solved;

        self.log_solution("Solved");
        Ok(())
    }

    /// Cold solve, one solver call per cluster.
    #[instrument(skip_all, level = "debug")]
    pub fn solve_clustered(&mut self, partitioner: &dyn Partitioner) -> Result<(), SessionError> {
        self.ensure_cold_start()?;

        let vehicles: Vec<VehicleIdx> = self.fleet.vehicle_ids().collect();
        if vehicles.is_empty() {
            return Err(SessionError::EmptyProblem("the fleet has no vehicles"));
        }
        let candidates = self.candidates();
        if candidates.is_empty() {
            return Err(SessionError::EmptyProblem("no orders to route"));
        }

        let (jobs, postponed) = self.cluster_jobs(partitioner, &vehicles, &candidates);
        let plans = self.plan_jobs(&jobs, BuildMode::Cold)?;

        self.commit(plans, &postponed)?;
        self.state = SessionState::Solved;

        self.log_solution("Solved clustered problem");
        Ok(())
    }

    /// Partitions `orders` and hands the vehicles out to the clusters in
    /// contiguous groups. Every vehicle lands in a job; orders of a cluster
    /// left without vehicles are returned to be postponed.
    fn cluster_jobs(
        &self,
        partitioner: &dyn Partitioner,
        vehicles: &[VehicleIdx],
        orders: &[OrderIdx],
    ) -> (Vec<ClusterJob>, Vec<OrderIdx>) {
        let located: Vec<(OrderIdx, Location)> = orders
            .iter()
            .map(|&order| (order, *self.orders[order].location()))
            .collect();
        let clusters = partitioner.partition(self.depot.location(), &located);

        if clusters.is_empty() {
            let job = ClusterJob {
                vehicles: vehicles.to_vec(),
                orders: vec![],
            };
            return (vec![job], vec![]);
        }

        let group_size = vehicles.len().div_ceil(clusters.len()).max(1);
        let mut groups = vehicles.chunks(group_size);

        let mut postponed = Vec::new();
        let mut jobs = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            match groups.next() {
                Some(group) => jobs.push(ClusterJob {
                    vehicles: group.to_vec(),
                    orders: cluster,
                }),
                None => postponed.extend(cluster),
            }
        }

        debug!(
            jobs = jobs.len(),
            group_size,
            postponed = postponed.len(),
            "Partitioned problem"
        );
        (jobs, postponed)
    }

    fn plan_jobs(&self, jobs: &[ClusterJob], mode: BuildMode) -> Result<Vec<PlannedRoutes>, SessionError> {
        jobs.par_iter()
            .map(|job| self.plan(&job.vehicles, &job.orders, mode))
            .collect()
    }

    /// Reports the stop outcome for the vehicle's current stop and moves it on.
    /// Returns the order that was resolved, if the stop was not the depot.
    pub fn advance(
        &mut self,
        vehicle: VehicleIdx,
        outcome: StopOutcome,
    ) -> Result<Option<OrderIdx>, SessionError> {
        self.ensure(self.state.can_execute(), "advance a vehicle")?;

        if self.fleet.get(vehicle).is_none() {
            return Err(SessionError::UnknownVehicle(vehicle));
        }
        let route = self
            .routes
            .get_mut(vehicle)
            .ok_or(SessionError::NoRoute(vehicle))?;

        let resolved = route.advance(outcome, &mut self.orders, &mut self.fleet)?;
        self.fleet.update(&self.orders);
        self.state = SessionState::Executing;

        debug!(%vehicle, ?outcome, ?resolved, "Advanced vehicle");
        Ok(resolved)
    }

    /// Re-optimizes around the executing routes: scheduled orders stay on their
    /// vehicle and the remaining plan seeds the search. On failure the current
    /// routes are kept.
    #[instrument(skip_all, level = "debug")]
    pub fn reroute(&mut self) -> Result<(), SessionError> {
        self.ensure(self.state.can_execute(), "reroute")?;

        let previous_state = self.state;
        self.state = SessionState::Rerouting;

        match self.try_reroute() {
            Ok(()) => {
                self.state = SessionState::Solved;
                self.log_solution("Rerouted");
                Ok(())
            }
            Err(error) => {
                self.state = previous_state;
                warn!(%error, "Reroute failed, keeping current routes");
                Err(error)
            }
        }
    }

    /// Above the cluster size, unassigned orders are partitioned like a cold
    /// solve and each scheduled order follows its vehicle into its job.
    fn try_reroute(&mut self) -> Result<(), SessionError> {
        let hints = self.routes.warm_start_hints(&self.orders);
        let mode = BuildMode::Reroute { hints: &hints };
        let vehicles: Vec<VehicleIdx> = self.fleet.vehicle_ids().collect();
        let candidates = self.candidates();

        if candidates.len() <= self.params.cluster_size {
            let plan = self.plan(&vehicles, &candidates, mode)?;
            return self.commit(vec![plan], &[]);
        }

        let (pinned, free): (Vec<OrderIdx>, Vec<OrderIdx>) = candidates
            .iter()
            .partition(|&&order| self.orders[order].vehicle().is_some());

        let partitioner = self.params.sweep_partitioner();
        let (mut jobs, postponed) = self.cluster_jobs(&partitioner, &vehicles, &free);
        for order in pinned {
            let vehicle = self.orders[order].vehicle();
            if let Some(job) = jobs
                .iter_mut()
                .find(|job| vehicle.is_some_and(|vehicle| job.vehicles.contains(&vehicle)))
            {
                job.orders.push(order);
            }
        }

        let plans = self.plan_jobs(&jobs, mode)?;
        self.commit(plans, &postponed)
    }

    /// Adds an order that arrived during the day. It is picked up by the next
    /// solve or reroute.
    pub fn add_dynamic_order(&mut self, order: Order) -> OrderIdx {
        let order_id = OrderIdx::new(self.orders.len());
        self.orders.push(order.into_unrouted());

        debug!(%order_id, "Added dynamic order");
        order_id
    }

    /// Like [`VrpSession::add_dynamic_order`], from a raw record. Records
    /// without a kind are pickups.
    pub fn add_dynamic_raw_order(&mut self, record: RawOrder) -> Result<OrderIdx, SessionError> {
        let expected = record.kind.unwrap_or(NodeKind::Pickup);
        let order = record
            .into_order(expected, self.params.carryforward_penalty)
            .map_err(|reason| InvalidOrder {
                collection: OrderCollection::Dynamic,
                position: self.orders.len(),
                reason,
            })?;

        Ok(self.add_dynamic_order(order))
    }

    /// Moves the session clock forward. Every stop predicted to be reached by
    /// then is completed successfully. Returns the number of orders resolved.
    pub fn skip_time(&mut self, duration: SignedDuration) -> Result<usize, SessionError> {
        let clock = self.clock.checked_add(duration).unwrap_or(SignedDuration::MAX);

        if !self.state.can_execute() {
            self.clock = clock;
            return Ok(0);
        }

        let mut orders = self.orders.clone();
        let mut fleet = self.fleet.clone();
        let mut routes = self.routes.clone();
        let mut resolved = 0;
        let mut moved = false;

        for route in routes.routes_mut() {
            while !route.is_finished() && route.current_stop().arrival() <= clock {
                if route
                    .advance(StopOutcome::Succeeded, &mut orders, &mut fleet)?
                    .is_some()
                {
                    resolved += 1;
                }
                moved = true;
            }
        }

        fleet.update(&orders);

        self.clock = clock;
        self.orders = orders;
        self.fleet = fleet;
        self.routes = routes;
        if moved {
            self.state = SessionState::Executing;
        }

        info!(clock = ?self.clock, resolved, "Skipped time");
        Ok(resolved)
    }

    fn log_solution(&self, message: &str) {
        let postponed = self
            .orders
            .iter()
            .filter(|order| order.status() == OrderStatus::Postponed)
            .count();

        info!(
            objective = self.objective,
            routes = self.routes.num_routes(),
            postponed,
            "{message}"
        );
    }
}
