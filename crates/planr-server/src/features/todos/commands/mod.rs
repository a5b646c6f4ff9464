pub mod save;

pub use save::{SaveTodoError, SaveTodoRequest};
