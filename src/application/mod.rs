pub mod conversion_controller;
pub mod download_coordinator;
pub mod progress_simulator;

pub use conversion_controller::{
    ConversionController, FormState, Resolution, RunId, StatusDisplay, Submission,
};
pub use download_coordinator::{DownloadCoordinator, DownloadEvent};
pub use progress_simulator::{CancelHandle, ProgressSimulator};
