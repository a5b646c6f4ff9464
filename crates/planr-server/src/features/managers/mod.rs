//! Manager registrations on todos
//!
//! Registering a manager is the audited operation; listing and removal are
//! not audited.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{
    DeleteManagerCommand, DeleteManagerError, DeleteManagerResponse, SaveManagerError,
    SaveManagerRequest, SaveManagerResponse,
};
pub use queries::{ListManagersError, ListManagersQuery};
pub use routes::managers_routes;
pub use types::{ManagerResponse, UserResponse};
