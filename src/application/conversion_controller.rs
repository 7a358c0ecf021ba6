//! Request lifecycle for a single conversion form.
//!
//! The controller owns every piece of state the form shows and decides each
//! transition; it never performs I/O itself. Callers carry out what a
//! [`Submission`] or [`Resolution`] asks for (send the request, pump the
//! tick stream, wait out the grace delay) and report back with the matching
//! [`RunId`] so late messages from an earlier run are dropped.

use std::time::Duration;

use futures::stream::BoxStream;

use super::progress_simulator::{CancelHandle, ProgressSimulator};
use crate::domain::{
    AppError, CompletedConversion, ConversionRequest, ConversionResult, CredentialFile,
    OutputFormat, ProgressTick, UiState,
};
use crate::utils::validate_url;

pub const GRACE_DELAY: Duration = Duration::from_millis(1500);

const COMPLETED_LABEL: &str = "Conversion completed successfully!";
const SUCCESS_NOTICE: &str = "Your file is ready for download.";

/// Identifies one submission; bumped every time a conversion starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunId(u64);

/// Values entered in the form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub url: String,
    pub format: OutputFormat,
    pub credential: Option<CredentialFile>,
    /// Inline error shown under the URL field; `Some` marks the field invalid.
    pub url_error: Option<String>,
}

/// Everything outside the form inputs that the view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusDisplay {
    pub progress_visible: bool,
    pub percent: f32,
    pub phase_label: String,
    pub success_notice: Option<String>,
    pub error_notice: Option<String>,
    /// Title on the download affordance; `Some` reveals it.
    pub download_title: Option<String>,
}

pub enum Submission {
    /// Another conversion is still running.
    Busy,
    /// URL failed validation; the field is marked invalid.
    Invalid,
    Started {
        run: RunId,
        request: ConversionRequest,
        ticks: BoxStream<'static, ProgressTick>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Result belonged to a run that is no longer current.
    Stale,
    /// Back to idle already.
    Settled,
    /// Call [`ConversionController::finish_grace`] after this delay.
    GraceDelay(RunId, Duration),
}

pub struct ConversionController {
    state: UiState,
    run: RunId,
    form: FormState,
    display: StatusDisplay,
    completed: Option<CompletedConversion>,
    pending_format: OutputFormat,
    simulator: ProgressSimulator,
    progress: Option<CancelHandle>,
    grace_delay: Duration,
}

impl Default for ConversionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionController {
    pub fn new() -> Self {
        Self::with_grace_delay(GRACE_DELAY)
    }

    pub fn with_grace_delay(grace_delay: Duration) -> Self {
        Self {
            state: UiState::Idle,
            run: RunId::default(),
            form: FormState::default(),
            display: StatusDisplay::default(),
            completed: None,
            pending_format: OutputFormat::default(),
            simulator: ProgressSimulator::new(),
            progress: None,
            grace_delay,
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    /// Form controls accept input only while idle.
    pub fn controls_enabled(&self) -> bool {
        self.state == UiState::Idle
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn display(&self) -> &StatusDisplay {
        &self.display
    }

    pub fn conversion_id(&self) -> Option<&str> {
        self.completed.as_ref().map(|c| c.conversion_id.as_str())
    }

    pub fn edit_url(&mut self, value: String) {
        if !self.controls_enabled() {
            return;
        }
        self.form.url = value;
        if self.form.url_error.take().is_some() {
            tracing::debug!("cleared URL validation error");
        }
    }

    pub fn select_format(&mut self, format: OutputFormat) {
        if self.controls_enabled() {
            self.form.format = format;
        }
    }

    pub fn attach_credential(&mut self, credential: Option<CredentialFile>) {
        if self.controls_enabled() {
            self.form.credential = credential;
        }
    }

    pub fn submit(&mut self) -> Submission {
        if !self.controls_enabled() {
            tracing::debug!(state = ?self.state, "ignoring submit while a conversion is running");
            return Submission::Busy;
        }

        self.clear_outcome();

        let source_url = self.form.url.trim().to_string();
        if !validate_url(&source_url) {
            tracing::debug!(url = %source_url, "rejected source URL");
            self.form.url_error = Some(AppError::InvalidUrl.to_string());
            return Submission::Invalid;
        }

        self.run = RunId(self.run.0 + 1);
        self.state = UiState::InProgress;
        self.display.progress_visible = true;
        self.pending_format = self.form.format;

        let (ticks, handle) = self.simulator.ticks();
        self.progress = Some(handle);

        tracing::debug!(run = self.run.0, "conversion started");

        Submission::Started {
            run: self.run,
            request: ConversionRequest {
                source_url,
                output_format: self.form.format,
                credential_file: self.form.credential.clone(),
            },
            ticks,
        }
    }

    pub fn apply_tick(&mut self, run: RunId, tick: ProgressTick) {
        if run != self.run || self.state != UiState::InProgress {
            return;
        }
        self.display.percent = tick.percent;
        self.display.phase_label = tick.phase_label.to_string();
    }

    pub fn resolve(&mut self, run: RunId, result: ConversionResult) -> Resolution {
        if run != self.run || self.state != UiState::InProgress {
            tracing::debug!(run = run.0, "dropping result for a finished run");
            return Resolution::Stale;
        }

        self.stop_progress();

        match result {
            ConversionResult::Success {
                conversion_id,
                title,
            } => {
                self.state = UiState::Succeeded;
                self.display.percent = 100.0;
                self.display.phase_label = COMPLETED_LABEL.to_string();
                self.display.download_title = Some(title.clone());
                self.display.success_notice = Some(SUCCESS_NOTICE.to_string());
                self.completed = Some(CompletedConversion {
                    conversion_id,
                    title,
                    format: self.pending_format,
                });
                tracing::debug!(run = run.0, "conversion succeeded");
                Resolution::GraceDelay(run, self.grace_delay)
            }
            ConversionResult::Failure(error) => {
                self.state = UiState::Failed;
                tracing::debug!(run = run.0, state = ?self.state, error = %error, "conversion failed");
                self.display.percent = 0.0;
                self.display.progress_visible = false;
                self.display.error_notice = Some(error.to_string());
                self.state = UiState::Idle;
                Resolution::Settled
            }
        }
    }

    /// Hide the finished progress bar and hand the form back to the user.
    pub fn finish_grace(&mut self, run: RunId) {
        if run != self.run || self.state != UiState::Succeeded {
            return;
        }
        self.display.progress_visible = false;
        self.state = UiState::Idle;
    }

    /// Conversion to fetch, if one finished since the last submit.
    pub fn download(&self) -> Option<&CompletedConversion> {
        self.completed.as_ref()
    }

    pub fn reset(&mut self) {
        if self.state == UiState::InProgress {
            return;
        }
        self.stop_progress();
        self.clear_outcome();
        self.form.url_error = None;
        self.state = UiState::Idle;
    }

    fn stop_progress(&mut self) {
        if let Some(handle) = self.progress.take() {
            handle.cancel();
        }
    }

    fn clear_outcome(&mut self) {
        self.display = StatusDisplay::default();
        self.form.url_error = None;
        self.completed = None;
    }
}
