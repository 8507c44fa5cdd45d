pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use router::record_routes;
pub use services::{RecordService, Visibility};
