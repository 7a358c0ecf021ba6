//! WizardConvert desktop client.
//!
//! Validates a YouTube URL, submits it to a WizardConvert service for MP3/MP4
//! conversion, animates progress while waiting, and saves the result.

pub mod api;
pub mod app;
pub mod application;
pub mod domain;
pub mod ui;
pub mod utils;
