use std::sync::Arc;

use courier_optimizer::{
    clustering::{Partitioner, sweep::SweepPartitioner},
    json::types::JsonDispatchProblem,
    model::routing_model::RoutingModel,
    problem::{
        generator::{GeneratorParams, generate_problem},
        order::{Order, OrderBuilder, OrderIdx, OrderStatus, StopOutcome},
        stop_node::NodeKind,
    },
    session::{
        error::SessionError, session_params::SessionParams, session_state::SessionState,
        vrp_session::VrpSession,
    },
    solver::{
        assignment::Assignment,
        routing_solver::{RoutingSolver, SolveError},
    },
};
use jiff::SignedDuration;
use rand::{SeedableRng, rngs::SmallRng};

fn params(time_limit: SignedDuration) -> SessionParams {
    SessionParams {
        time_limit,
        ..SessionParams::default()
    }
}

fn generated_session(seed: u64, generator: GeneratorParams, time_limit: SignedDuration) -> VrpSession {
    let mut rng = SmallRng::seed_from_u64(seed);
    let problem = generate_problem(&mut rng, &generator);
    VrpSession::new(problem.depot, problem.orders, problem.vehicles, params(time_limit))
}

fn assert_capacity_invariant(session: &VrpSession) {
    for vehicle in session.vehicles() {
        assert!(vehicle.available_capacity() <= vehicle.actual_capacity());
        assert!(vehicle.actual_capacity() <= vehicle.total_capacity());
    }
}

#[test]
fn test_five_hundred_orders_within_a_second() {
    let mut session = generated_session(
        11,
        GeneratorParams {
            num_orders: 500,
            num_vehicles: 20,
            vehicle_capacity: 100.0,
            ..GeneratorParams::default()
        },
        SignedDuration::from_secs(1),
    );

    session.solve().unwrap();

    assert_eq!(session.state(), SessionState::Solved);
    assert!(session.orders().iter().all(|order| matches!(
        order.status(),
        OrderStatus::Scheduled(_) | OrderStatus::Postponed
    )));
    assert_capacity_invariant(&session);
}

#[test]
fn test_solve_execute_reroute_cycle() {
    let mut session = generated_session(
        5,
        GeneratorParams {
            num_orders: 40,
            num_vehicles: 3,
            ..GeneratorParams::default()
        },
        SignedDuration::from_millis(300),
    );
    session.solve().unwrap();

    let vehicle = session
        .routes()
        .routes()
        .map(|route| route.vehicle())
        .next()
        .unwrap();
    session.advance(vehicle, StopOutcome::Succeeded).unwrap();
    session.advance(vehicle, StopOutcome::Failed).unwrap();
    session.skip_time(SignedDuration::from_mins(30)).unwrap();
    assert_eq!(session.state(), SessionState::Executing);
    assert_capacity_invariant(&session);

    let mut builder = OrderBuilder::default();
    builder
        .set_location(12.98, 77.60)
        .set_kind(NodeKind::Pickup)
        .set_volume(2.0);
    let dynamic = session.add_dynamic_order(builder.build().unwrap());

    let resolved_before: Vec<(OrderIdx, OrderStatus)> = resolved(session.orders());
    let position_before = session.route(vehicle).unwrap().current_position();

    session.reroute().unwrap();

    assert_eq!(session.state(), SessionState::Solved);
    assert_eq!(resolved(session.orders()), resolved_before);
    assert_eq!(
        session.route(vehicle).unwrap().current_position(),
        position_before
    );
    assert!(matches!(
        session.order(dynamic).unwrap().status(),
        OrderStatus::Scheduled(_) | OrderStatus::Postponed
    ));
    assert_capacity_invariant(&session);
}

fn resolved(orders: &[Order]) -> Vec<(OrderIdx, OrderStatus)> {
    orders
        .iter()
        .enumerate()
        .filter(|(_, order)| order.status().is_terminal())
        .map(|(index, order)| (OrderIdx::new(index), order.status()))
        .collect()
}

#[test]
fn test_clustered_solve_covers_every_order() {
    let mut session = generated_session(
        9,
        GeneratorParams {
            num_orders: 120,
            num_vehicles: 6,
            ..GeneratorParams::default()
        },
        SignedDuration::from_millis(300),
    );
    let partitioner = SweepPartitioner::new(40, 5.0);

    session.solve_clustered(&partitioner).unwrap();

    let routed: usize = session
        .routes()
        .routes()
        .map(|route| route.orders().count())
        .sum();
    let postponed = session
        .orders()
        .iter()
        .filter(|order| order.status() == OrderStatus::Postponed)
        .count();
    assert_eq!(routed + postponed, 120);
}

#[test]
fn test_partition_is_exact_cover() {
    let mut rng = SmallRng::seed_from_u64(21);
    let problem = generate_problem(
        &mut rng,
        &GeneratorParams {
            num_orders: 333,
            ..GeneratorParams::default()
        },
    );
    let located: Vec<_> = problem
        .orders
        .iter()
        .enumerate()
        .map(|(index, order)| (OrderIdx::new(index), *order.location()))
        .collect();

    let clusters = SweepPartitioner::new(50, 5.0).partition(problem.depot.location(), &located);

    assert_eq!(clusters.len(), 7);
    let mut members: Vec<OrderIdx> = clusters.into_iter().flatten().collect();
    members.sort();
    assert_eq!(members, (0..333).map(OrderIdx::new).collect::<Vec<_>>());
}

struct NeverSolves;

impl RoutingSolver for NeverSolves {
    fn solve(&self, _model: &RoutingModel) -> Result<Assignment, SolveError> {
        Err(SolveError::NoSolution("no incumbent".to_owned()))
    }
}

#[test]
fn test_cluster_failure_fails_the_whole_call() {
    let mut session = generated_session(
        4,
        GeneratorParams {
            num_orders: 30,
            num_vehicles: 3,
            ..GeneratorParams::default()
        },
        SignedDuration::from_millis(100),
    )
    .with_solver(Arc::new(NeverSolves));

    let result = session.solve_clustered(&SweepPartitioner::new(10, 5.0));

    assert!(matches!(result, Err(SessionError::NoSolutionFound(_))));
    assert_eq!(session.state(), SessionState::Unsolved);
    assert!(
        session
            .orders()
            .iter()
            .all(|order| order.status() == OrderStatus::Unrouted)
    );
}

#[test]
fn test_json_problem_to_solved_session() {
    let json = r#"{
        "depot": {"latitude": 12.9716, "longitude": 77.5946},
        "vehicles": [{"id": "bike-1", "capacity": 20}, {"id": "bike-2", "capacity": 20}],
        "deliveries": [
            {"externalRef": "AWB-1", "latitude": 12.975, "longitude": 77.60, "volume": 3},
            {"externalRef": "AWB-2", "latitude": 12.965, "longitude": 77.59, "volume": 2},
            {"externalRef": "AWB-3", "latitude": 12.98, "longitude": 77.58, "volume": 4,
             "timeWindow": {"earliest": "1970-01-01T01:00:00Z", "latest": "1970-01-01T03:00:00Z"}}
        ],
        "pickups": [
            {"externalRef": "AWB-4", "latitude": 12.96, "longitude": 77.61, "volume": 1}
        ],
        "params": {"time_limit": "PT0.3S", "distance_metric": "planar_approx"}
    }"#;

    let problem: JsonDispatchProblem = serde_json::from_str(json).unwrap();
    let problem = problem.build_problem().unwrap();
    assert!(problem.rejected.is_empty());
    let mut session = problem.into_session();

    session.solve().unwrap();

    let windowed = OrderIdx::new(2);
    assert!(matches!(
        session.order(windowed).unwrap().status(),
        OrderStatus::Scheduled(_)
    ));
    let arrival = session.predicted_arrival(windowed).unwrap();
    assert!(arrival >= "1970-01-01T01:00:00Z".parse().unwrap());
    assert!(arrival <= "1970-01-01T03:00:00Z".parse().unwrap());
    assert!(session.summary().total_distance > 0);
}
