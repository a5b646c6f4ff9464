//! Todos owned by a user
//!
//! Creation and lookup of single todos. Managers registered on a todo live in
//! the `managers` feature.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{SaveTodoError, SaveTodoRequest};
pub use queries::{GetTodoError, GetTodoQuery};
pub use routes::todos_routes;
pub use types::TodoResponse;
