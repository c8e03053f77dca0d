pub use super::task::Entity as Task;
