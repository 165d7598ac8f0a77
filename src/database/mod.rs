pub mod manager;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use users::{PgUserDirectory, User, UserDirectory};
