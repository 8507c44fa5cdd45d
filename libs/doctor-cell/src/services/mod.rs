pub mod availability;
pub mod capacity;
pub mod doctor;

pub use availability::AvailabilityService;
pub use capacity::CapacityService;
pub use doctor::DoctorService;
