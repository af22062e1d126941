use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Haversine distance on a sphere of mean Earth radius
    #[default]
    GreatCircle,
    /// Equirectangular projection around the mean latitude of the node set
    PlanarApprox,
    /// Distances supplied by a routing graph service
    ExternalGraph,
}

impl Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DistanceMetric::GreatCircle => "great_circle",
                DistanceMetric::PlanarApprox => "planar_approx",
                DistanceMetric::ExternalGraph => "external_graph",
            }
        )
    }
}

impl FromStr for DistanceMetric {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "great_circle" | "greatcircle" | "haversine" => Ok(DistanceMetric::GreatCircle),
            "planar_approx" | "planar" | "euclidean" => Ok(DistanceMetric::PlanarApprox),
            "external_graph" | "graph" | "osrm" => Ok(DistanceMetric::ExternalGraph),
            _ => Err(MatrixError::UnsupportedMetric(s.to_owned())),
        }
    }
}
