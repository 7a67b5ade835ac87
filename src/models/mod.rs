// Data models and DTOs

pub mod alerts;
pub mod consumer;
pub mod dispatch;
pub mod grid;
pub mod notification;
pub mod orchestrate;
pub mod price;
pub mod scenario;
pub mod simulate;
pub mod utility;

pub use scenario::Scenario;
