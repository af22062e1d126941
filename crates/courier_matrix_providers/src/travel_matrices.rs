use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Whole meters.
pub type Distance = i64;

/// Square distance matrix stored as a flat vector.
/// To find the index for a pair of locations use `from * num_locations + to`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TravelMatrices {
    distances: Vec<Distance>,
    num_locations: usize,
    is_symmetric: bool,
}

fn is_flat_matrix_symmetric(matrix: &[Distance], num_locations: usize) -> bool {
    for i in 0..num_locations {
        for j in (i + 1)..num_locations {
            if matrix[i * num_locations + j] != matrix[j * num_locations + i] {
                return false;
            }
        }
    }
    true
}

impl TravelMatrices {
    pub(crate) fn from_symmetric_parts(distances: Vec<Distance>, num_locations: usize) -> Self {
        TravelMatrices {
            distances,
            num_locations,
            is_symmetric: true,
        }
    }

    pub fn from_flat(distances: Vec<Distance>, num_locations: usize) -> Result<Self, MatrixError> {
        let expected = num_locations * num_locations;
        if distances.len() != expected {
            return Err(MatrixError::DimensionMismatch {
                expected,
                actual: distances.len(),
            });
        }

        let is_symmetric = is_flat_matrix_symmetric(&distances, num_locations);

        Ok(TravelMatrices {
            distances,
            num_locations,
            is_symmetric,
        })
    }

    /// Rows in meters, as returned by routing services. Values are rounded up.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let num_locations = rows.len();
        let mut distances = Vec::with_capacity(num_locations * num_locations);

        for row in rows {
            if row.len() != num_locations {
                return Err(MatrixError::DimensionMismatch {
                    expected: num_locations,
                    actual: row.len(),
                });
            }
            distances.extend(row.into_iter().map(|meters| meters.ceil() as Distance));
        }

        TravelMatrices::from_flat(distances, num_locations)
    }

    #[inline(always)]
    fn index(&self, from: usize, to: usize) -> usize {
        from * self.num_locations + to
    }

    #[inline(always)]
    pub fn distance(&self, from: usize, to: usize) -> Distance {
        if from == to {
            return 0;
        }

        self.distances[self.index(from, to)]
    }

    pub fn max_distance(&self) -> Distance {
        self.distances.iter().copied().max().unwrap_or(0)
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

}
