// Business logic services

pub mod cascade;
pub mod consumer;
pub mod crew_dispatch;
pub mod crews;
pub mod demand;
pub mod device_alerts;
pub mod events;
pub mod grid;
pub mod grid_status;
pub mod hotspot;
pub mod notification;
pub mod orchestrator;
pub mod outcome;
pub mod overview;
pub mod price;
pub mod simulate;
pub mod weather;

pub use consumer::ConsumerService;
pub use crew_dispatch::DispatchService;
pub use grid::GridGraph;
pub use notification::NotificationService;
pub use orchestrator::OrchestratorService;
pub use price::PriceService;
pub use weather::WeatherService;
