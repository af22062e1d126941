use std::str::FromStr;

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the first incumbent is built.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    #[default]
    Automatic,
    PathCheapestArc,
    PathMostConstrainedArc,
    EvaluatorStrategy,
    Savings,
    Sweep,
    Christofides,
    AllUnperformed,
    BestInsertion,
    ParallelCheapestInsertion,
    LocalCheapestInsertion,
    GlobalCheapestArc,
    LocalCheapestArc,
    FirstUnboundMinValue,
}

/// How the incumbent is improved once it exists.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearchMetaheuristic {
    #[default]
    Automatic,
    GreedyDescent,
    GuidedLocalSearch,
    SimulatedAnnealing,
    TabuSearch,
}

fn parse_snake_case<T: for<'de> Deserialize<'de>>(input: &str) -> Result<T, String> {
    let name = input.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name))
        .map_err(|_| format!("Unknown value '{input}'"))
}

impl FromStr for FirstSolutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_snake_case(s)
    }
}

impl FromStr for LocalSearchMetaheuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_snake_case(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    pub first_solution_strategy: FirstSolutionStrategy,
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    pub time_limit: SignedDuration,
}

impl Default for SearchParameters {
    fn default() -> Self {
        SearchParameters {
            first_solution_strategy: FirstSolutionStrategy::Automatic,
            local_search_metaheuristic: LocalSearchMetaheuristic::Automatic,
            time_limit: SignedDuration::from_secs(300),
        }
    }
}
