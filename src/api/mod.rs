pub mod client;
pub mod models;

pub use client::{ApiError, ConversionClient, Result};
pub use models::{ClientConfig, ConvertResponse};
