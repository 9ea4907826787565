//! Dataset loading.

pub mod loader;

pub use loader::{load_dataset, DataSource, LoadOptions, DEFAULT_DATASET_URL};
