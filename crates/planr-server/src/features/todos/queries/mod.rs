pub mod get;

pub use get::{GetTodoError, GetTodoQuery};
