use crate::api::{ClientConfig, ConversionClient};
use crate::application::{
    ConversionController, DownloadCoordinator, DownloadEvent, Resolution, RunId, Submission,
};
use crate::domain::{ConversionResult, CredentialFile, ProgressTick};
use crate::ui::{self, FormMessage};
use iced::Task;
use std::path::PathBuf;
use url::Url;

pub struct ConvertApp {
    controller: ConversionController,
    client: ConversionClient,
    downloads: DownloadCoordinator,
    download_status: Option<String>,
}

impl Default for ConvertApp {
    fn default() -> Self {
        Self::new(ClientConfig::from_env())
    }
}

impl ConvertApp {
    pub fn new(config: ClientConfig) -> Self {
        let client = ConversionClient::new(config);

        Self {
            controller: ConversionController::new(),
            downloads: DownloadCoordinator::new(client.clone()),
            client,
            download_status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Form(FormMessage),
    CredentialsLoaded(Option<CredentialFile>),
    ProgressTick(RunId, ProgressTick),
    ConversionFinished(RunId, ConversionResult),
    GraceElapsed(RunId),
    /// (Selected Path, Download URL)
    SavePathSelected(Option<PathBuf>, Url),
    Download(DownloadEvent),
}

pub fn update(app: &mut ConvertApp, message: Message) -> Task<Message> {
    match message {
        Message::Form(form_msg) => return handle_form(app, form_msg),
        Message::CredentialsLoaded(credential) => {
            app.controller.attach_credential(credential);
        }
        Message::ProgressTick(run, tick) => {
            app.controller.apply_tick(run, tick);
        }
        Message::ConversionFinished(run, result) => {
            if let Resolution::GraceDelay(run, delay) = app.controller.resolve(run, result) {
                return Task::perform(tokio::time::sleep(delay), move |_| {
                    Message::GraceElapsed(run)
                });
            }
        }
        Message::GraceElapsed(run) => {
            app.controller.finish_grace(run);
        }
        Message::SavePathSelected(path_opt, url) => match path_opt {
            Some(path) => {
                app.download_status = Some(format!("Downloading to: {}", path.display()));
                return Task::run(app.downloads.download_stream(url, path), Message::Download);
            }
            None => {
                app.download_status = Some("Download cancelled".to_string());
            }
        },
        Message::Download(event) => {
            app.download_status = Some(match event {
                DownloadEvent::Progress(progress) if progress >= 1.0 => {
                    "Download complete, finalizing...".to_string()
                }
                DownloadEvent::Progress(progress) => {
                    format!("Downloading: {:.1}%", progress * 100.0)
                }
                DownloadEvent::Completed(path) => format!("Saved: {}", path.display()),
                DownloadEvent::Failed(e) => format!("Download failed: {}", e),
            });
        }
    }
    Task::none()
}

fn handle_form(app: &mut ConvertApp, message: FormMessage) -> Task<Message> {
    match message {
        FormMessage::UrlChanged(value) => app.controller.edit_url(value),
        FormMessage::FormatSelected(format) => app.controller.select_format(format),
        FormMessage::ClearCredentials => app.controller.attach_credential(None),
        FormMessage::PickCredentials => {
            if app.controller.controls_enabled() {
                return Task::perform(pick_credentials(), Message::CredentialsLoaded);
            }
        }
        FormMessage::ConvertPressed => {
            if let Submission::Started {
                run,
                request,
                ticks,
            } = app.controller.submit()
            {
                app.download_status = None;
                let client = app.client.clone();

                // Ticks and the result arrive independently; the controller
                // drops whatever no longer applies.
                return Task::batch([
                    Task::run(ticks, move |tick| Message::ProgressTick(run, tick)),
                    Task::perform(
                        async move { client.submit(&request).await },
                        move |result| Message::ConversionFinished(run, result),
                    ),
                ]);
            }
        }
        FormMessage::DownloadPressed => {
            if let Some(completed) = app.controller.download() {
                let url = app.downloads.reference(completed);
                let suggested = DownloadCoordinator::suggested_filename(completed);
                app.download_status = Some("Please select save location...".to_string());

                return Task::perform(
                    async move {
                        let path = DownloadCoordinator::choose_save_path(suggested).await;
                        (path, url)
                    },
                    |(path, url)| Message::SavePathSelected(path, url),
                );
            }
        }
        FormMessage::ResetPressed => {
            app.controller.reset();
            app.download_status = None;
        }
    }
    Task::none()
}

async fn pick_credentials() -> Option<CredentialFile> {
    let handle = rfd::AsyncFileDialog::new()
        .add_filter("Cookies (Netscape format)", &["txt"])
        .pick_file()
        .await?;

    match tokio::fs::read(handle.path()).await {
        Ok(bytes) => Some(CredentialFile {
            file_name: handle.file_name(),
            bytes,
        }),
        Err(e) => {
            tracing::warn!(path = %handle.path().display(), error = %e, "could not read cookies file");
            None
        }
    }
}

pub fn view(app: &ConvertApp) -> iced::Element<'_, Message> {
    ui::view(&app.controller, app.download_status.as_deref()).map(Message::Form)
}
