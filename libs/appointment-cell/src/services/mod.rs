pub mod booking;
pub mod lifecycle;
pub mod no_show;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use no_show::NoShowSweep;
