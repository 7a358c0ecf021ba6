use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::{
    api::ConversionClient,
    domain::{AppError, CompletedConversion},
    utils::sanitize_filename,
};

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(f32),
    Completed(PathBuf),
    Failed(AppError),
}

/// Saves converted files to disk.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: ConversionClient,
}

impl DownloadCoordinator {
    pub fn new(client: ConversionClient) -> Self {
        Self { client }
    }

    pub fn reference(&self, completed: &CompletedConversion) -> Url {
        self.client.download_reference(&completed.conversion_id)
    }

    pub fn suggested_filename(completed: &CompletedConversion) -> String {
        let stem = sanitize_filename(&completed.title);
        let stem = stem.trim_matches(|c| c == '.' || c == ' ');
        let stem = if stem.is_empty() { "converted" } else { stem };
        format!("{}.{}", stem, completed.format.extension())
    }

    pub async fn choose_save_path(suggested_filename: String) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_file_name(&suggested_filename)
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    pub fn download_stream(&self, url: Url, path: PathBuf) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            DownloadRuntimeState::Start {
                client: self.client.clone(),
                url,
                path,
            },
            |state| async move {
                match state {
                    DownloadRuntimeState::Start { client, url, path } => {
                        tracing::info!(%url, path = %path.display(), "saving converted file");

                        let file = match tokio::fs::File::create(&path).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    DownloadRuntimeState::Finished,
                                ));
                            }
                        };

                        match client.download_file_stream(&url).await {
                            Ok((total_size, stream)) => Some((
                                DownloadEvent::Progress(0.0),
                                DownloadRuntimeState::Downloading {
                                    file,
                                    stream: stream.boxed(),
                                    downloaded: 0,
                                    total: total_size,
                                    path,
                                },
                            )),
                            Err(e) => {
                                tracing::warn!(error = %e, "download request failed");
                                Some((
                                    DownloadEvent::Failed(AppError::Transport),
                                    DownloadRuntimeState::Finished,
                                ))
                            }
                        }
                    }
                    DownloadRuntimeState::Downloading {
                        mut file,
                        mut stream,
                        mut downloaded,
                        total,
                        path,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    DownloadRuntimeState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;

                            let progress = match total {
                                Some(total_size) if total_size > 0 => {
                                    downloaded as f32 / total_size as f32
                                }
                                _ => 0.0,
                            };

                            Some((
                                DownloadEvent::Progress(progress),
                                DownloadRuntimeState::Downloading {
                                    file,
                                    stream,
                                    downloaded,
                                    total,
                                    path,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "download interrupted");
                            Some((
                                DownloadEvent::Failed(AppError::Transport),
                                DownloadRuntimeState::Finished,
                            ))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to sync file: {}",
                                        e
                                    ))),
                                    DownloadRuntimeState::Finished,
                                ));
                            }

                            Some((
                                DownloadEvent::Completed(path),
                                DownloadRuntimeState::Finished,
                            ))
                        }
                    },
                    DownloadRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum DownloadRuntimeState {
    Start {
        client: ConversionClient,
        url: Url,
        path: PathBuf,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        downloaded: u64,
        total: Option<u64>,
        path: PathBuf,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use crate::domain::OutputFormat;

    fn completed(title: &str, format: OutputFormat) -> CompletedConversion {
        CompletedConversion {
            conversion_id: "abc123".to_string(),
            title: title.to_string(),
            format,
        }
    }

    fn coordinator_for(server: &mockito::ServerGuard) -> DownloadCoordinator {
        DownloadCoordinator::new(ConversionClient::new(ClientConfig {
            base_url: Url::parse(&server.url()).unwrap(),
            request_timeout: None,
        }))
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            DownloadCoordinator::suggested_filename(&completed("Song", OutputFormat::Audio)),
            "Song.mp3"
        );
        assert_eq!(
            DownloadCoordinator::suggested_filename(&completed("AC/DC: Live.", OutputFormat::Video)),
            "AC_DC_ Live.mp4"
        );
        assert_eq!(
            DownloadCoordinator::suggested_filename(&completed("", OutputFormat::Audio)),
            "converted.mp3"
        );
    }

    #[tokio::test]
    async fn test_reference_contains_conversion_id() {
        let server = mockito::Server::new_async().await;
        let coordinator = coordinator_for(&server);
        let url = coordinator.reference(&completed("Song", OutputFormat::Audio));
        assert!(url.path().ends_with("/download/abc123"));
    }

    #[tokio::test]
    async fn test_download_stream_writes_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/download/abc123")
            .with_status(200)
            .with_body("converted bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Song.mp3");
        let coordinator = coordinator_for(&server);
        let url = coordinator.reference(&completed("Song", OutputFormat::Audio));

        let events: Vec<DownloadEvent> = coordinator.download_stream(url, path.clone()).collect().await;

        mock.assert_async().await;
        assert!(matches!(events.first(), Some(DownloadEvent::Progress(p)) if *p == 0.0));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(p)) if *p == path));
        assert_eq!(std::fs::read(&path).unwrap(), b"converted bytes");
    }

    #[tokio::test]
    async fn test_download_stream_reports_missing_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/download/abc123")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator_for(&server);
        let url = coordinator.reference(&completed("Song", OutputFormat::Audio));

        let events: Vec<DownloadEvent> = coordinator
            .download_stream(url, dir.path().join("Song.mp3"))
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DownloadEvent::Failed(AppError::Transport)));
    }
}
