pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use router::referral_routes;
pub use services::ReferralService;
