// Rounding and geodesy helpers shared by the grid services.

pub mod geo;
pub mod rounding;

pub use geo::{haversine_km, planar_distance};
pub use rounding::round_to;
