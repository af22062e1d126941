use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::error::OrderValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Result<Self, OrderValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(OrderValidationError::NonFiniteCoordinates);
        }

        Ok(Location {
            latitude,
            longitude,
        })
    }

    pub fn lat(&self) -> f64 {
        self.latitude
    }

    pub fn lon(&self) -> f64 {
        self.longitude
    }

    pub fn point(&self) -> geo::Point<f64> {
        self.into()
    }

    /// Polar angle around `origin` in degrees, in `[0, 360)`.
    /// Measured from the latitude axis towards the longitude axis.
    pub fn polar_angle_from(&self, origin: &Location) -> f64 {
        let delta_lat = self.latitude - origin.latitude;
        let delta_lon = self.longitude - origin.longitude;

        if delta_lat == 0.0 && delta_lon == 0.0 {
            return 0.0;
        }

        let degrees = delta_lon.atan2(delta_lat).to_degrees();
        if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        }
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        geo::Point::new(location.longitude, location.latitude)
    }
}

impl From<geo::Point<f64>> for Location {
    fn from(point: geo::Point<f64>) -> Self {
        Location {
            latitude: point.y(),
            longitude: point.x(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: f64, lon: f64) -> Location {
        Location::from_lat_lon(lat, lon).unwrap()
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            Location::from_lat_lon(f64::NAN, 1.0),
            Err(OrderValidationError::NonFiniteCoordinates)
        );
        assert!(Location::from_lat_lon(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_polar_angle_quadrants() {
        let depot = location(0.0, 0.0);

        assert_eq!(location(1.0, 0.0).polar_angle_from(&depot), 0.0);
        assert!((location(0.0, 1.0).polar_angle_from(&depot) - 90.0).abs() < 1e-9);
        assert!((location(-1.0, 0.0).polar_angle_from(&depot) - 180.0).abs() < 1e-9);
        assert!((location(0.0, -1.0).polar_angle_from(&depot) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_angle_at_depot_is_zero() {
        let depot = location(12.97, 77.59);
        assert_eq!(depot.polar_angle_from(&depot), 0.0);
    }

    #[test]
    fn test_geo_point_is_lon_lat() {
        let point: geo::Point = (&location(12.0, 77.0)).into();
        assert_eq!(point.x(), 77.0);
        assert_eq!(point.y(), 12.0);
    }
}
