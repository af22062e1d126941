use std::path::{Path, PathBuf};

use clap::Subcommand;
use courier_optimizer::{
    json::types::JsonDispatchProblem,
    problem::generator::{GeneratorParams, generate_problem},
};
use rand::{SeedableRng, rngs::SmallRng};
use tracing::info;

#[derive(Subcommand)]
pub enum GenerateSubcommands {
    /// Write the JSON schema of the dispatch problem file
    JsonSchema {
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Write a random dispatch problem around Bengaluru
    Problem {
        #[arg(long, short = 'o')]
        out: PathBuf,

        #[arg(long, short = 'n', default_value_t = 100)]
        orders: usize,

        #[arg(long, short = 'v', default_value_t = 5)]
        vehicles: usize,

        #[arg(long, default_value_t = 120.0)]
        capacity: f64,

        /// Share of pickups among the generated orders
        #[arg(long, default_value_t = 0.1)]
        pickup_ratio: f64,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn write_file(out: &Path, content: &str) -> Result<(), anyhow::Error> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(out, content)?;
    Ok(())
}

pub fn run(subcommand: GenerateSubcommands) -> Result<(), anyhow::Error> {
    match subcommand {
        GenerateSubcommands::JsonSchema { out } => {
            let schema = courier_optimizer::json::schema::generate_json_schema()?;
            write_file(&out, &schema)?;
        }
        GenerateSubcommands::Problem {
            out,
            orders,
            vehicles,
            capacity,
            pickup_ratio,
            seed,
        } => {
            let mut rng = SmallRng::seed_from_u64(seed);
            let problem = generate_problem(
                &mut rng,
                &GeneratorParams {
                    num_orders: orders,
                    num_vehicles: vehicles,
                    vehicle_capacity: capacity,
                    pickup_ratio,
                    ..GeneratorParams::default()
                },
            );

            let json = serde_json::to_string_pretty(&JsonDispatchProblem::from(&problem))?;
            write_file(&out, &json)?;
            info!(orders, vehicles, out = %out.display(), "Generated problem");
        }
    }

    Ok(())
}
