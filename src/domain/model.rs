#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Audio,
    Video,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Audio, OutputFormat::Video];

    /// Token understood by the `format` field of the convert endpoint.
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Audio => "mp3",
            OutputFormat::Video => "mp4",
        }
    }

    pub fn extension(self) -> &'static str {
        self.token()
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Audio => "MP3 (audio)",
            OutputFormat::Video => "MP4 (video)",
        }
    }
}

/// Cookies file uploaded alongside a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source_url: String,
    pub output_format: OutputFormat,
    pub credential_file: Option<CredentialFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Success { conversion_id: String, title: String },
    Failure(super::AppError),
}

/// A finished conversion kept around so it can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedConversion {
    pub conversion_id: String,
    pub title: String,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    InProgress,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTick {
    pub percent: f32,
    pub phase_label: &'static str,
}
