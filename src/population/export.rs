//! GeoJSON export of the zones a run used

use geo::{Point, Polygon};
use serde_json::{json, Value};
use std::path::Path;

use super::model::PopulationModel;
use crate::core::error::Result;

fn polygon_geometry(polygon: &Polygon<f64>) -> Value {
    let ring: Vec<[f64; 2]> = polygon.exterior().coords().map(|c| [c.x, c.y]).collect();
    json!({ "type": "Polygon", "coordinates": [ring] })
}

fn point_geometry(point: &Point<f64>) -> Value {
    json!({ "type": "Point", "coordinates": [point.x(), point.y()] })
}

/// Zones in zone-index order, in their input coordinates
pub fn zones_feature_collection(model: &PopulationModel) -> Value {
    let features: Vec<Value> = model
        .zones
        .iter()
        .enumerate()
        .map(|(index, zone)| {
            let geometry = zone
                .polygon
                .as_ref()
                .map_or_else(|| point_geometry(&zone.centroid), polygon_geometry);
            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "zone": index,
                    "area_id": zone.area_id.0,
                    "province_id": zone.province_id.0,
                    "households": zone.households,
                    "population": zone.population,
                    "area": zone.surface,
                    "density": model.nearest_densities.get(index).copied(),
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

pub fn write_geojson(model: &PopulationModel, path: &Path) -> Result<()> {
    let content = serde_json::to_string(&zones_feature_collection(model))?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AreaId, ProvinceId};
    use crate::geography::Zone;
    use geo::LineString;

    #[test]
    fn test_feature_per_zone_in_order() {
        let square = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            vec![],
        );
        let zones = vec![
            Zone {
                area_id: AreaId(5),
                province_id: ProvinceId(1),
                households: 3,
                population: 9.0,
                surface: 1.0,
                centroid: Point::new(0.5, 0.5),
                polygon: Some(square),
                source_row: 4,
            },
            Zone {
                area_id: AreaId(6),
                province_id: ProvinceId(1),
                households: 0,
                population: 0.0,
                surface: 2.0,
                centroid: Point::new(7.0, 8.0),
                polygon: None,
                source_row: 0,
            },
        ];
        let model = PopulationModel::new(zones, 0);
        let fc = zones_feature_collection(&model);

        assert_eq!(fc["type"], "FeatureCollection");
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
        // closed ring
        assert_eq!(features[0]["geometry"]["coordinates"][0].as_array().unwrap().len(), 5);
        assert_eq!(features[1]["geometry"]["coordinates"], json!([7.0, 8.0]));
        assert_eq!(features[1]["properties"]["zone"], 1);
        assert_eq!(features[1]["properties"]["area_id"], 6);
    }
}
