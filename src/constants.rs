//! Application constants and configuration values.
//!
//! Grid physics thresholds, dispatch tuning and scenario defaults live here
//! so services share one source of truth.

/// API metadata constants
pub mod api {
    /// Version reported in response metadata
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Region served by the bundled grid model
    pub const GRID_REGION: &str = "ERCOT";
}

/// Forecast window constants
pub mod forecast {
    /// Default forecast hour (peak of the Uri scenario)
    pub const DEFAULT_FORECAST_HOUR: u32 = 36;

    /// Hour shown by operator views outside the storm
    pub const NORMAL_DISPLAY_HOUR: u32 = 12;

    /// Largest forecast hour accepted by the grid endpoints
    pub const MAX_FORECAST_HOUR: u32 = 48;

    /// Number of hourly points in a price forecast
    pub const PRICE_HORIZON_HOURS: usize = 48;
}

/// Load classification thresholds (percent of capacity)
pub mod load {
    pub const STRESSED_PCT: f64 = 80.0;
    pub const CRITICAL_PCT: f64 = 95.0;
    pub const MEDIUM_RISK_PCT: f64 = 60.0;
    pub const FAILED_PCT: f64 = 100.0;
}

/// Cascade simulation constants
pub mod cascade {
    /// Upper bound on propagation rounds
    pub const MAX_ITERATIONS: usize = 20;

    /// Share of a failed node's load pushed onto live neighbours
    pub const REDISTRIBUTION_FACTOR: f64 = 0.70;

    /// A node trips once load exceeds capacity by this factor
    pub const FAILURE_THRESHOLD: f64 = 1.05;

    /// Seed for the cold-weather trip draw
    pub const RNG_SEED: u64 = 42;

    /// Below this temperature (F) generation trips at the severe rate
    pub const SEVERE_COLD_F: f64 = 20.0;
    pub const SEVERE_COLD_TRIP_RATE: f64 = 0.40;

    /// Below this temperature (F) generation trips at the freezing rate
    pub const FREEZING_F: f64 = 32.0;
    pub const FREEZING_TRIP_RATE: f64 = 0.15;

    /// Large units (MW) trip twice as often in the cold
    pub const LARGE_UNIT_MW: f64 = 500.0;

    /// Load scaling applied by the controlled-blackout mitigation
    pub const MITIGATION_LOAD_FACTOR: f64 = 0.88;
}

/// Crew dispatch constants
pub mod dispatch {
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Average road speed for crew trucks
    pub const DRIVE_SPEED_KMH: f64 = 80.0;

    /// Road speed multiplier during storm conditions
    pub const STORM_SPEED_FACTOR: f64 = 0.65;

    pub const EXACT_MATCH_SCORE: f64 = 2.0;
    pub const PARTIAL_MATCH_SCORE: f64 = 1.0;
    pub const MISMATCH_SCORE: f64 = 0.3;

    /// Voltage (kV) at or above which a bus is treated as transmission
    pub const TRANSMISSION_KV: f64 = 200.0;

    /// Voltage (kV) at or above which a bus is treated as a substation
    pub const SUBSTATION_KV: f64 = 69.0;

    /// Minimum generator capacity (MW) for a bus to be treated as a plant
    pub const GENERATOR_MIN_MW: f64 = 200.0;
}

/// Economic impact constants
pub mod impact {
    /// Customers affected per MW of unserved load
    pub const CUSTOMERS_PER_MW: f64 = 500.0;

    /// Wholesale cap reached during the Uri event ($/MWh)
    pub const URI_PRICE_CAP: f64 = 9000.0;

    /// Baseline wholesale price outside the storm ($/MWh)
    pub const NORMAL_PRICE: f64 = 35.0;

    /// Outage duration without mitigation (hours)
    pub const BASE_OUTAGE_HOURS: f64 = 48.0;
}

/// Orchestration pipeline constants
pub mod orchestrate {
    /// Sessions kept in memory; the oldest is evicted beyond this
    pub const MAX_SESSIONS: usize = 50;

    /// Wholesale peak ($/MWh) that raises a price spike alert
    pub const PRICE_SPIKE_MWH: f64 = 100.0;

    /// Wholesale peak ($/MWh) that makes a price spike critical
    pub const CRITICAL_PRICE_MWH: f64 = 1000.0;

    /// Wholesale peak ($/MWh) that makes load shifting worth an alert
    pub const LOAD_SHIFT_MWH: f64 = 50.0;

    /// Household load (kWh) assumed by the load shifting estimate
    pub const SHIFTABLE_KWH: f64 = 30.0;

    /// Shed load (MW) that raises a load shed alert
    pub const LOAD_SHED_ALERT_MW: f64 = 500.0;
}

/// Event stream constants
pub mod events {
    /// Delay between streamed timeline events
    pub const STREAM_INTERVAL_MS: u64 = 2000;
}
