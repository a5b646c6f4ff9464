pub mod list;

pub use list::{ListManagersError, ListManagersQuery};
