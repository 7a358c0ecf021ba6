use iced::{
    widget::{button, column, progress_bar, radio, row, text, text_input, Space},
    Element, Length,
};

use crate::application::ConversionController;
use crate::domain::OutputFormat;

#[derive(Debug, Clone)]
pub enum FormMessage {
    UrlChanged(String),
    FormatSelected(OutputFormat),
    PickCredentials,
    ClearCredentials,
    ConvertPressed,
    DownloadPressed,
    ResetPressed,
}

/// Render the conversion form from the controller's current state.
///
/// Inputs lose their handlers while a conversion runs, which is how iced
/// shows them disabled.
pub fn view<'a>(
    controller: &'a ConversionController,
    download_status: Option<&'a str>,
) -> Element<'a, FormMessage> {
    let enabled = controller.controls_enabled();
    let form = controller.form();
    let display = controller.display();

    let url_input = text_input("https://www.youtube.com/watch?v=...", &form.url)
        .on_input_maybe(enabled.then_some(FormMessage::UrlChanged))
        .on_submit(FormMessage::ConvertPressed)
        .padding(10);

    let formats = OutputFormat::ALL.iter().fold(row![].spacing(20), |formats, format| {
        formats.push(radio(
            format.label(),
            *format,
            Some(form.format),
            FormMessage::FormatSelected,
        ))
    });

    let credential_label = match &form.credential {
        Some(file) => format!("Cookies: {}", file.file_name),
        None => "No cookies file".to_string(),
    };

    let mut credentials = row![
        button("Choose cookies file...")
            .on_press_maybe(enabled.then_some(FormMessage::PickCredentials))
            .padding([6, 12]),
        text(credential_label).size(14),
    ]
    .spacing(10);
    if form.credential.is_some() {
        credentials = credentials.push(
            button("Clear")
                .on_press_maybe(enabled.then_some(FormMessage::ClearCredentials))
                .padding([6, 12]),
        );
    }

    let mut content = column![
        text("WizardConvert").size(32),
        Space::new().height(Length::Fixed(20.0)),
        text("YouTube URL:").size(16),
        url_input,
    ]
    .padding(20)
    .spacing(10);

    if let Some(error) = &form.url_error {
        content = content.push(text(error).size(14).style(text::danger));
    }

    content = content.push(formats).push(credentials).push(
        row![
            button("Convert")
                .on_press_maybe(enabled.then_some(FormMessage::ConvertPressed))
                .padding([10, 20]),
            button("Reset")
                .on_press_maybe(enabled.then_some(FormMessage::ResetPressed))
                .padding([10, 20]),
        ]
        .spacing(10),
    );

    if display.progress_visible {
        content = content
            .push(Space::new().height(Length::Fixed(10.0)))
            .push(progress_bar(0.0..=100.0, display.percent))
            .push(text(&display.phase_label).size(14));
    }

    if let Some(notice) = &display.success_notice {
        content = content.push(text(notice).size(14).style(text::success));
    }

    if let Some(notice) = &display.error_notice {
        content = content.push(text(notice).size(14).style(text::danger));
    }

    if let Some(title) = &display.download_title {
        content = content.push(
            row![
                text(title).size(16),
                button("Download").on_press(FormMessage::DownloadPressed).padding([10, 20]),
            ]
            .spacing(10),
        );
    }

    if let Some(status) = download_status {
        content = content.push(text(status).size(14));
    }

    content.into()
}
