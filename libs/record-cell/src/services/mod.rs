pub mod records;
pub mod visibility;

pub use records::RecordService;
pub use visibility::Visibility;
