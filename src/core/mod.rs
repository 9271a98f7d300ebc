pub mod loader;
pub mod processor;

pub use crate::domain::model::Record;
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
pub use loader::DataLoader;
pub use processor::{DataProcessor, FieldStats};
