//! Utility functions and types

pub mod data_loader;
pub mod stats;

pub use data_loader::{DataLoader, has_column, numeric_column, parse_number, string_column};
