use pictopick::core::settings::SettingsData;
use tracing::{
    error,
    info,
};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pictopick=info")),
        )
        .init();

    let settings = SettingsData::load();
    info!(
        vocabulary = %settings.vocabulary_path.display(),
        flaticon = settings.flaticon_api_key.is_some(),
        "Starting PictoPick"
    );

    let result = pictopick::gui::run(settings);
    if let Err(e) = &result {
        error!("Application error: {e}");
    }
    result
}
