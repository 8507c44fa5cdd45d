pub mod handlers;
pub mod router;
pub mod services;

pub use router::admin_routes;
pub use services::{AdminService, SystemOverview};
