pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    CompletedConversion, ConversionRequest, ConversionResult, CredentialFile, OutputFormat,
    ProgressTick, UiState,
};
