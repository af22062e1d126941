use geo::{Distance as _, HaversineMeasure};

use crate::travel_matrices::{Distance, TravelMatrices};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Sphere of mean Earth radius used for every great-circle distance.
const EARTH: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_METERS);

pub fn haversine_distance(from: geo_types::Point, to: geo_types::Point) -> f64 {
    EARTH.distance(from, to)
}

/// Equirectangular approximation, good enough at city scale.
pub fn planar_distance(from: geo_types::Point, to: geo_types::Point, mean_lat_rad: f64) -> f64 {
    let x = (to.x() - from.x()).to_radians() * mean_lat_rad.cos();
    let y = (to.y() - from.y()).to_radians();

    EARTH_RADIUS_METERS * (x * x + y * y).sqrt()
}

fn build_symmetric<F>(points: &[geo_types::Point], distance: F) -> TravelMatrices
where
    F: Fn(geo_types::Point, geo_types::Point) -> f64,
{
    let num_points = points.len();
    let mut distances: Vec<Distance> = vec![0; num_points * num_points];

    for (i, &from) in points.iter().enumerate() {
        for (j, &to) in points.iter().enumerate().skip(i + 1) {
            let meters = distance(from, to).ceil() as Distance;
            distances[i * num_points + j] = meters;
            distances[j * num_points + i] = meters;
        }
    }

    TravelMatrices::from_symmetric_parts(distances, num_points)
}

pub fn great_circle_matrices(points: &[geo_types::Point]) -> TravelMatrices {
    build_symmetric(points, haversine_distance)
}

pub fn planar_matrices(points: &[geo_types::Point]) -> TravelMatrices {
    let mean_lat_rad = if points.is_empty() {
        0.0
    } else {
        (points.iter().map(|point| point.y()).sum::<f64>() / points.len() as f64).to_radians()
    };

    build_symmetric(points, |from, to| planar_distance(from, to, mean_lat_rad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let from = geo_types::Point::new(0.0, 0.0);
        let to = geo_types::Point::new(0.0, 1.0);

        let distance = haversine_distance(from, to);
        // pi * R / 180
        assert!((distance - 111_194.93).abs() < 1.0);
    }

    #[test]
    fn test_haversine_symmetric_and_zero_on_same_point() {
        let bengaluru = geo_types::Point::new(77.5946, 12.9716);
        let airport = geo_types::Point::new(77.7066, 13.1986);

        assert_eq!(haversine_distance(bengaluru, bengaluru), 0.0);
        let there = haversine_distance(bengaluru, airport);
        let back = haversine_distance(airport, bengaluru);
        assert!((there - back).abs() < 1e-6);
        // ~28.0 km on a 6,371 km sphere
        assert!((there - 28_005.0).abs() < 100.0);
    }

    #[test]
    fn test_great_circle_matrix_is_symmetric_and_integral() {
        let points = vec![
            geo_types::Point::new(77.59, 12.97),
            geo_types::Point::new(77.60, 12.98),
            geo_types::Point::new(77.62, 12.95),
        ];

        let matrices = great_circle_matrices(&points);

        assert!(matrices.is_symmetric());
        assert_eq!(matrices.num_locations(), 3);
        for i in 0..3 {
            assert_eq!(matrices.distance(i, i), 0);
        }
        let exact = haversine_distance(points[0], points[1]);
        assert_eq!(matrices.distance(0, 1), exact.ceil() as i64);
    }

    #[test]
    fn test_planar_close_to_haversine_at_city_scale() {
        let points = vec![
            geo_types::Point::new(77.59, 12.97),
            geo_types::Point::new(77.65, 13.01),
        ];

        let planar = planar_matrices(&points).distance(0, 1) as f64;
        let great_circle = great_circle_matrices(&points).distance(0, 1) as f64;

        assert!((planar - great_circle).abs() / great_circle < 0.01);
    }
}
