use crate::constants::dispatch::EARTH_RADIUS_KM;

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Euclidean distance in degrees, good enough for nearest-neighbour picks
/// inside a single state.
pub fn planar_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    (lat1 - lat2).hypot(lon1 - lon2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_houston_dallas() {
        // Houston -> Dallas is roughly 360 km
        let d = haversine_km(29.76, -95.37, 32.78, -96.80);
        assert!((d - 362.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_haversine_zero() {
        assert_eq!(haversine_km(30.0, -97.0, 30.0, -97.0), 0.0);
    }

    #[test]
    fn test_planar_distance() {
        assert_eq!(planar_distance(0.0, 0.0, 3.0, 4.0), 5.0);
    }
}
