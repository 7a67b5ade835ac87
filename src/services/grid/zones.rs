//! ERCOT weather zone classification.
//!
//! Zones are approximated by bounding boxes checked in a fixed order; the
//! first box containing the point wins. Points outside every box fall back
//! to the nearest zone centroid.

use crate::utils::planar_distance;

pub const FAR_WEST: &str = "Far West";
pub const WEST: &str = "West";
pub const NORTH: &str = "North";
pub const NORTH_CENTRAL: &str = "North Central";
pub const EAST: &str = "East";
pub const SOUTH_CENTRAL: &str = "South Central";
pub const SOUTHERN: &str = "Southern";
pub const COAST: &str = "Coast";

#[derive(Debug, Clone, Copy)]
struct ZoneBox {
    name: &'static str,
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl ZoneBox {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

const ZONE_BOXES: [ZoneBox; 8] = [
    ZoneBox { name: FAR_WEST, lat_min: 29.0, lat_max: 33.0, lon_min: -106.5, lon_max: -101.0 },
    ZoneBox { name: WEST, lat_min: 30.0, lat_max: 33.5, lon_min: -101.5, lon_max: -98.5 },
    ZoneBox { name: NORTH, lat_min: 33.0, lat_max: 36.5, lon_min: -103.0, lon_max: -95.5 },
    ZoneBox { name: NORTH_CENTRAL, lat_min: 31.5, lat_max: 33.5, lon_min: -98.0, lon_max: -95.5 },
    ZoneBox { name: EAST, lat_min: 30.0, lat_max: 34.0, lon_min: -96.0, lon_max: -93.5 },
    ZoneBox { name: SOUTH_CENTRAL, lat_min: 29.0, lat_max: 32.0, lon_min: -99.0, lon_max: -96.5 },
    ZoneBox { name: SOUTHERN, lat_min: 25.5, lat_max: 29.0, lon_min: -100.0, lon_max: -97.0 },
    ZoneBox { name: COAST, lat_min: 27.5, lat_max: 30.5, lon_min: -97.5, lon_max: -93.5 },
];

/// Zone centroids, alphabetical so ties resolve deterministically.
const ZONE_CENTROIDS: [(&str, f64, f64); 8] = [
    (COAST, 28.75, -95.75),
    (EAST, 32.0, -94.75),
    (FAR_WEST, 31.0, -103.75),
    (NORTH, 34.75, -99.25),
    (NORTH_CENTRAL, 32.5, -96.75),
    (SOUTH_CENTRAL, 30.5, -97.75),
    (SOUTHERN, 27.25, -98.5),
    (WEST, 31.75, -100.0),
];

/// Map a coordinate to its ERCOT weather zone.
pub fn classify_weather_zone(lat: f64, lon: f64) -> &'static str {
    if let Some(zone) = ZONE_BOXES.iter().find(|z| z.contains(lat, lon)) {
        return zone.name;
    }

    let mut best = SOUTH_CENTRAL;
    let mut best_dist = f64::INFINITY;
    for (name, clat, clon) in ZONE_CENTROIDS {
        let d = planar_distance(lat, lon, clat, clon);
        if d < best_dist {
            best_dist = d;
            best = name;
        }
    }
    best
}

/// All zone names in classification order.
pub fn all_weather_zones() -> impl Iterator<Item = &'static str> {
    ZONE_BOXES.iter().map(|z| z.name)
}
