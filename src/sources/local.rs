use std::path::{
    Path,
    PathBuf,
};

use rayon::prelude::*;
use tracing::{
    debug,
    info,
};

use super::fuzzy::token_sort_ratio;
use crate::core::{
    settings::SettingsData,
    utils::{
        cell,
        ensure_exists,
        find_column,
    },
    PickerError,
    SourceKind,
    SymbolCandidate,
};

#[derive(Debug, Clone)]
struct LibraryEntry {
    name: String,
    search_text: String,
    path: PathBuf,
}

/// A symbol collection on disk indexed by a metadata CSV.
#[derive(Debug, Clone)]
pub struct LocalLibrary {
    kind: SourceKind,
    entries: Vec<LibraryEntry>,
}

impl LocalLibrary {
    /// Mulberry: one row per symbol, `symbol-en` names the SVG file.
    pub fn load_mulberry(index: &Path, symbols_dir: &Path) -> Result<Self, PickerError> {
        ensure_exists(index)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(index)?;
        let name_idx = find_column(reader.headers()?, "symbol-en", index)?;

        let svg_dir = symbols_dir.join("EN-symbols");
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(name) = cell(&record, name_idx) else {
                continue;
            };
            entries.push(LibraryEntry {
                name: name.to_string(),
                search_text: name.replace('_', " "),
                path: svg_dir.join(format!("{name}.svg")),
            });
        }

        info!("Loaded {} Mulberry symbols from {}", entries.len(), index.display());
        Ok(Self { kind: SourceKind::Mulberry, entries })
    }

    /// OpenMoji: searched on annotation plus tags, files named by hexcode.
    pub fn load_openmoji(dir: &Path) -> Result<Self, PickerError> {
        let index = dir.join("metadata.csv");
        ensure_exists(&index)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&index)?;
        let headers = reader.headers()?.clone();
        let annotation_idx = find_column(&headers, "annotation", &index)?;
        let tags_idx = find_column(&headers, "tags", &index)?;
        let hexcode_idx = find_column(&headers, "hexcode", &index)?;

        let emoji_dir = dir.join("emojis");
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(hexcode) = cell(&record, hexcode_idx) else {
                continue;
            };
            let annotation = cell(&record, annotation_idx).unwrap_or_default();
            let tags = cell(&record, tags_idx).unwrap_or_default();
            let name = if annotation.is_empty() { hexcode } else { annotation };

            entries.push(LibraryEntry {
                name: name.to_string(),
                search_text: format!("{annotation} {tags}"),
                path: emoji_dir.join(format!("{hexcode}.png")),
            });
        }

        info!("Loaded {} OpenMoji symbols from {}", entries.len(), index.display());
        Ok(Self { kind: SourceKind::OpenMoji, entries })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best `limit` matches for `query`, highest score first. Equal scores
    /// keep index order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SymbolCandidate> {
        let mut scored: Vec<(usize, u8)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(idx, entry)| (idx, token_sort_ratio(query, &entry.search_text)))
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let results: Vec<SymbolCandidate> = scored
            .into_iter()
            .take(limit)
            .map(|(idx, _)| {
                let entry = &self.entries[idx];
                SymbolCandidate::local(&entry.name, self.kind, entry.path.clone())
            })
            .collect();

        debug!(source = %self.kind, query, hits = results.len(), "local search");
        results
    }
}

/// Both local libraries, loaded together before the picker opens.
#[derive(Debug, Clone)]
pub struct LocalLibraries {
    pub mulberry: LocalLibrary,
    pub openmoji: LocalLibrary,
}

impl LocalLibraries {
    pub fn load(settings: &SettingsData) -> Result<Self, PickerError> {
        Ok(Self {
            mulberry: LocalLibrary::load_mulberry(
                &settings.mulberry_index,
                &settings.mulberry_dir,
            )?,
            openmoji: LocalLibrary::load_openmoji(&settings.openmoji_dir)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalLibrary> {
        [&self.mulberry, &self.openmoji].into_iter()
    }
}
