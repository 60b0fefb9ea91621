//! Projection of zone coordinates into planar metres

use geo::Point;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the local projection
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// How centroid coordinates become distances in metres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Coordinates are already projected metres
    #[default]
    Planar,
    /// Degrees of longitude/latitude, projected equirectangularly around the
    /// mean latitude of the input points
    LonLat,
}

impl Projection {
    pub fn project(&self, points: &[Point<f64>]) -> Vec<Point<f64>> {
        match self {
            Projection::Planar => points.to_vec(),
            Projection::LonLat => {
                if points.is_empty() {
                    return Vec::new();
                }
                let mean_lat = points.iter().map(|p| p.y()).sum::<f64>() / points.len() as f64;
                let scale_x = mean_lat.to_radians().cos();
                points
                    .iter()
                    .map(|p| {
                        Point::new(
                            EARTH_RADIUS_M * p.x().to_radians() * scale_x,
                            EARTH_RADIUS_M * p.y().to_radians(),
                        )
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_is_identity() {
        let pts = vec![Point::new(1.0, 2.0), Point::new(-3.0, 4.5)];
        assert_eq!(Projection::Planar.project(&pts), pts);
    }

    #[test]
    fn test_lon_lat_degree_lengths() {
        // One degree apart at the equator is about 111 km both ways
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        let projected = Projection::LonLat.project(&pts);
        let dx = projected[1].x() - projected[0].x();
        let dy = projected[2].y() - projected[0].y();
        assert!((dx - 111_000.0).abs() < 1_000.0, "dx = {dx}");
        assert!((dy - 111_000.0).abs() < 1_000.0, "dy = {dy}");
    }

    #[test]
    fn test_lon_lat_shrinks_longitude_away_from_equator() {
        let pts = vec![Point::new(-58.0, -60.0), Point::new(-57.0, -60.0)];
        let projected = Projection::LonLat.project(&pts);
        let dx = projected[1].x() - projected[0].x();
        assert!((dx - 55_600.0).abs() < 500.0, "dx = {dx}");
    }

    #[test]
    fn test_parses_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            projection: Projection,
        }
        let w: Wrapper = toml::from_str("projection = \"lon_lat\"").unwrap();
        assert_eq!(w.projection, Projection::LonLat);
    }
}
