use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Args;
use courier_matrix_providers::distance_metric::DistanceMetric;
use courier_optimizer::{
    json::types::JsonDispatchProblem,
    problem::{generator::random_location, order::OrderBuilder, stop_node::NodeKind},
    session::{shared_session::SharedSession, summary::SolutionSummary},
};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{info, warn};

use crate::{parsers, report::print_summary};

#[derive(Args)]
pub struct SolveArgs {
    /// Dispatch problem file (see `courier generate json-schema`)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Overrides the solver time limit of the problem file
    #[arg(short, long, value_parser = parsers::parse_duration)]
    timeout: Option<jiff::SignedDuration>,

    /// Overrides the distance metric (great_circle, planar_approx, external_graph)
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Split the orders with the sweep partitioner and solve the clusters in parallel
    #[arg(long)]
    clustered: bool,

    #[arg(long)]
    cluster_size: Option<usize>,

    /// Simulate the fleet for this long after solving, then reroute
    #[arg(long, value_parser = parsers::parse_duration)]
    simulate: Option<jiff::SignedDuration>,

    /// Random pickups arriving during the simulation
    #[arg(long, default_value_t = 0)]
    dynamic_orders: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write the final summary as JSON
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

pub async fn run(args: SolveArgs) -> anyhow::Result<()> {
    let f = File::open(&args.input)?;
    let content: JsonDispatchProblem = serde_json::from_reader(BufReader::new(f))?;
    let mut problem = content.build_problem()?;

    for rejected in &problem.rejected {
        warn!("{rejected}");
    }

    if let Some(timeout) = args.timeout {
        problem.params.time_limit = timeout;
    }
    if let Some(metric) = args.metric {
        problem.params.distance_metric = metric;
    }
    if let Some(cluster_size) = args.cluster_size {
        problem.params.cluster_size = cluster_size;
    }

    info!(
        orders = problem.orders.len(),
        vehicles = problem.vehicles.len(),
        rejected = problem.rejected.len(),
        "Loaded {}",
        args.input.display()
    );

    let partitioner = problem.params.sweep_partitioner();
    let session = SharedSession::new(problem.into_session());

    let solving = session.clone();
    let clustered = args.clustered;
    tokio::task::spawn_blocking(move || {
        if clustered {
            solving.solve_clustered(&partitioner)
        } else {
            solving.solve()
        }
    })
    .await??;

    let mut summary = session.summary();
    print_summary("Initial plan", &summary);

    if let Some(duration) = args.simulate {
        summary = simulate(&session, duration, args.dynamic_orders, args.seed).await?;
        print_summary(&format!("After {duration:#}"), &summary);
    }

    if let Some(out) = args.out {
        std::fs::write(out, serde_json::to_string_pretty(&summary)?)?;
    }

    Ok(())
}

/// Lets every vehicle follow its plan for `duration`, adds random pickups, then
/// reroutes from the current positions.
async fn simulate(
    session: &SharedSession,
    duration: jiff::SignedDuration,
    dynamic_orders: usize,
    seed: u64,
) -> anyhow::Result<SolutionSummary> {
    let completed = session.lock().skip_time(duration)?;
    info!(completed, "Skipped {duration:#}");

    let mut rng = SmallRng::seed_from_u64(seed);
    let depot = *session.lock().depot().location();
    for index in 0..dynamic_orders {
        let location = random_location(&mut rng, &depot, 5_000.0);
        let mut builder = OrderBuilder::default();
        builder
            .set_external_ref(format!("DYN-{index:04}"))
            .set_location(location.lat(), location.lon())
            .set_kind(NodeKind::Pickup)
            .set_volume(rng.random_range(1.0..=3.0_f64).round());
        session.add_dynamic_order(builder.build()?);
    }

    let rerouting = session.clone();
    tokio::task::spawn_blocking(move || rerouting.reroute()).await??;

    Ok(session.summary())
}
