pub mod delete;
pub mod save;

pub use delete::{DeleteManagerCommand, DeleteManagerError, DeleteManagerResponse};
pub use save::{SaveManagerError, SaveManagerRequest, SaveManagerResponse};
