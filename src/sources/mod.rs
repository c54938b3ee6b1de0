pub mod arasaac;
pub mod flaticon;
pub mod fuzzy;
pub mod local;

pub use arasaac::ArasaacClient;
pub use flaticon::FlaticonClient;
pub use local::{
    LocalLibraries,
    LocalLibrary,
};
use reqwest::Client;

use crate::core::{
    settings::SettingsData,
    PickerError,
    SourceKind,
    SymbolCandidate,
};

/// A symbol source queried over HTTP on a background thread.
#[derive(Debug, Clone)]
pub enum RemoteSource {
    Arasaac(ArasaacClient),
    Flaticon(FlaticonClient),
}

impl RemoteSource {
    pub fn arasaac(settings: &SettingsData) -> Self {
        RemoteSource::Arasaac(ArasaacClient::new(
            settings.arasaac_base_url.clone(),
            settings.arasaac_language.clone(),
            settings.results_per_source,
        ))
    }

    pub fn flaticon(settings: &SettingsData) -> Self {
        RemoteSource::Flaticon(FlaticonClient::new(
            settings.flaticon_base_url.clone(),
            settings.flaticon_api_key.clone(),
            settings.results_per_source,
        ))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            RemoteSource::Arasaac(_) => SourceKind::Arasaac,
            RemoteSource::Flaticon(_) => SourceKind::Flaticon,
        }
    }

    /// Candidate metadata only; images are fetched by the caller.
    pub async fn search(
        &self,
        client: &Client,
        query: &str,
    ) -> Result<Vec<SymbolCandidate>, PickerError> {
        match self {
            RemoteSource::Arasaac(arasaac) => arasaac.search(client, query).await,
            RemoteSource::Flaticon(flaticon) => flaticon.search(client, query).await,
        }
    }
}
