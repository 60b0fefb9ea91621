//! Shared fixtures: a small category schema, two census areas and a grid of
//! zones over them

#![allow(dead_code)]

use geo::Point;
use synthpop::census::{Area, CategorySchema, CensusTable};
use synthpop::core::types::{AreaId, ProvinceId};
use synthpop::core::GenerationConfig;
use synthpop::geography::{Zone, ZoneTable};

pub const MAX_FIXTURE_AGE: u8 = 60;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn schema() -> CategorySchema {
    CategorySchema {
        family_sizes: strings(&["1", "2", "3", "4 o más"]),
        open_family_size: "4 o más".into(),
        kinship_roles: strings(&["Jefe(a)", "Cónyuge o pareja", "Hijo(a) / Hijastro(a)"]),
        ages: (0..=MAX_FIXTURE_AGE).map(|a| a.to_string()).collect(),
        ..Default::default()
    }
}

pub fn config(seed: u64) -> GenerationConfig {
    GenerationConfig {
        seed: Some(seed),
        large_family_min: 4,
        large_family_max: 7,
        progress_interval: 5,
        categories: schema(),
        ..Default::default()
    }
}

/// Counts shaped like a real department: adult heads and spouses, children
/// up to 40, school attendance concentrated under 18, 70% employment
pub fn area(id: u32, school_urban: Option<f64>, school_rural: Option<f64>) -> Area {
    let schema = schema();
    let mut area = Area::new(AreaId(id)).with_school_means(school_rural, school_urban);

    for (label, n) in [("1", 3), ("2", 4), ("3", 3), ("4 o más", 2)] {
        area.set_count(label, n);
    }
    for (label, n) in [("Rural agrupado", 1), ("Rural disperso", 1), ("Urbano", 8)] {
        area.set_count(label, n);
    }

    let size_roles: [(&str, [u64; 3]); 4] = [
        ("1", [10, 0, 0]),
        ("2", [5, 4, 1]),
        ("3", [3, 2, 4]),
        ("4 o más", [2, 2, 6]),
    ];
    for (size, counts) in size_roles {
        for (role, n) in schema.kinship_roles.iter().zip(counts) {
            area.set_count(format!("{}.{}", size, role), n);
        }
    }

    for (r, role) in schema.kinship_roles.iter().enumerate() {
        for age in 0..=MAX_FIXTURE_AGE {
            let n = match r {
                0 if age >= 18 => 10,
                1 if age >= 18 => 8,
                2 if age <= 40 => 12,
                _ => 0,
            };
            area.set_count(format!("{}.{}", role, age), n);
        }
        let (women, men) = if r == 0 { (3, 7) } else { (5, 5) };
        area.set_count(format!("{}.Mujer", role), women);
        area.set_count(format!("{}.Varón", role), men);
    }

    for age in 3..=MAX_FIXTURE_AGE {
        let counts = if age <= 17 { [9, 1, 0] } else { [1, 8, 1] };
        for (label, n) in schema.attendance.iter().zip(counts) {
            area.set_count(format!("{}.{}", age, label), n);
        }
    }
    for age in 14..=MAX_FIXTURE_AGE {
        for (label, n) in schema.employment.iter().zip([1, 2, 7]) {
            area.set_count(format!("{}.{}", age, label), n);
        }
    }
    area
}

pub fn census() -> CensusTable {
    CensusTable::from_areas(vec![area(1, Some(30.0), Some(10.0)), area(2, None, Some(12.4))])
}

pub fn zone(row: usize, area: u32, province: u32, households: u32, x: f64, y: f64) -> Zone {
    Zone {
        area_id: AreaId(area),
        province_id: ProvinceId(province),
        households,
        population: households as f64 * 2.5,
        surface: 0.25,
        centroid: Point::new(x, y),
        polygon: None,
        source_row: row,
    }
}

/// Twelve zones on a 600 m grid; the last area-1 zone is empty
pub fn zones() -> ZoneTable {
    let zones = (0..12)
        .map(|i| {
            let (area, province) = if i % 3 == 0 { (2, 7) } else { (1, 3) };
            let households = if i == 10 { 0 } else { 15 + (i as u32 * 7) % 20 };
            zone(i, area, province, households, (i % 4) as f64 * 600.0, (i / 4) as f64 * 600.0)
        })
        .collect();
    ZoneTable::from_zones(zones)
}
