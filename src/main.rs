use iced::window;
use wizard_convert::app;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> iced::Result {
    // Load .env file if present (before reading any configuration)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wizard_convert=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not decode window icon");
            None
        }
    };

    iced::application(app::ConvertApp::default, app::update, app::view)
        .title("WizardConvert")
        .window(window::Settings {
            icon,
            ..Default::default()
        })
        .run()
}
