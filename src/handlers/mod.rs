// HTTP handlers grouped by API area; each area exposes a `*_routes()` builder.

pub mod consumer;
pub mod dispatch;
pub mod extractors;
pub mod forecast;
pub mod grid;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orchestrate;
pub mod response;
pub mod simulate;
pub mod utility;

pub use consumer::consumer_routes;
pub use extractors::{ApiQuery, ValidatedJson};
pub use forecast::forecast_routes;
pub use grid::grid_routes;
pub use notifications::notification_routes;
pub use orchestrate::orchestrate_routes;
pub use response::{ApiResponse, Created, ResponseMeta};
pub use simulate::simulate_routes;
pub use utility::utility_routes;
