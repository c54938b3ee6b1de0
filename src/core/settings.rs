use std::{
    path::PathBuf,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const FLATICON_KEY_ENV: &str = "FREEPIK_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub vocabulary_path: PathBuf,
    pub phrase_column: String,

    pub mulberry_index: PathBuf,
    pub mulberry_dir: PathBuf,
    pub openmoji_dir: PathBuf,
    pub selected_symbols_dir: PathBuf,

    pub results_per_source: usize,
    pub request_timeout_secs: u64,
    pub autosave: bool,

    pub arasaac_base_url: String,
    pub arasaac_language: String,
    pub flaticon_base_url: String,

    // May be set by hand in the settings file; never written back.
    // `FREEPIK_API_KEY` wins when it is set.
    #[serde(default, skip_serializing)]
    pub flaticon_api_key: Option<String>,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            vocabulary_path: PathBuf::from("vocabulary.csv"),
            phrase_column: "english".to_string(),
            mulberry_index: PathBuf::from("symbol-info.csv"),
            mulberry_dir: PathBuf::from("mulberry-symbols"),
            openmoji_dir: PathBuf::from("openmoji-618x618-color"),
            selected_symbols_dir: PathBuf::from("selected_symbols"),
            results_per_source: 4,
            request_timeout_secs: 10,
            autosave: true,
            arasaac_base_url: "https://api.arasaac.org".to_string(),
            arasaac_language: "en".to_string(),
            flaticon_base_url: "https://api.freepik.com".to_string(),
            flaticon_api_key: None,
        }
    }
}

impl SettingsData {
    pub fn load() -> Self {
        let first_run = !crate::persistence::get_data_file_path(SETTINGS_FILE).exists();
        let mut settings = crate::persistence::load_json_or_default::<SettingsData>(SETTINGS_FILE);

        // Write the defaults out once so there is a file to edit.
        if first_run {
            if let Err(e) = settings.save() {
                tracing::warn!("Could not write default settings: {e}");
            }
        }

        settings.apply_env();
        settings
    }

    pub fn save(&self) -> Result<(), crate::core::PickerError> {
        crate::persistence::save_json(self, SETTINGS_FILE)
    }

    pub fn apply_env(&mut self) {
        self.override_api_key(std::env::var(FLATICON_KEY_ENV).ok());
    }

    fn override_api_key(&mut self, from_env: Option<String>) {
        let clean = |key: String| Some(key.trim().to_string()).filter(|k| !k.is_empty());
        if let Some(key) = from_env.and_then(clean) {
            self.flaticon_api_key = Some(key);
        } else {
            self.flaticon_api_key = self.flaticon_api_key.take().and_then(clean);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
