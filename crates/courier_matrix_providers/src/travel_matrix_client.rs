use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    as_the_crow_flies::{great_circle_matrices, planar_matrices},
    distance_metric::DistanceMetric,
    error::MatrixError,
    travel_matrices::TravelMatrices,
};

/// Adapter for a routing graph service (OSRM, GraphHopper, a local contraction hierarchy...).
/// Returns distances in meters, one row per point.
pub trait GraphDistanceSource: Send + Sync {
    fn distances(&self, points: &[geo_types::Point]) -> anyhow::Result<Vec<Vec<f64>>>;
}

#[derive(Default, Clone)]
pub struct TravelMatrixClient {
    graph_source: Option<Arc<dyn GraphDistanceSource>>,
}

impl TravelMatrixClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph_source(graph_source: Arc<dyn GraphDistanceSource>) -> Self {
        Self {
            graph_source: Some(graph_source),
        }
    }

    #[instrument(skip_all, level = "debug", fields(points = points.len(), %metric))]
    pub fn build_matrix(
        &self,
        points: &[geo_types::Point],
        metric: DistanceMetric,
    ) -> Result<TravelMatrices, MatrixError> {
        let matrices = match metric {
            DistanceMetric::GreatCircle => great_circle_matrices(points),
            DistanceMetric::PlanarApprox => planar_matrices(points),
            DistanceMetric::ExternalGraph => {
                let Some(source) = &self.graph_source else {
                    return Err(MatrixError::UnsupportedMetric(format!(
                        "{metric} (no routing graph source configured)"
                    )));
                };

                let rows = source
                    .distances(points)
                    .map_err(MatrixError::GraphSource)?;

                if rows.len() != points.len() {
                    return Err(MatrixError::DimensionMismatch {
                        expected: points.len(),
                        actual: rows.len(),
                    });
                }

                TravelMatrices::from_rows(rows)?
            }
        };

        debug!(symmetric = matrices.is_symmetric(), "Built travel matrix");

        Ok(matrices)
    }
}
