pub mod account;
pub mod password;
pub mod users;

pub use account::{AccountService, Session};
pub use users::UserService;
