use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use tracing::info;

use crate::{
    core::{
        http::{
            blocking_client,
            download_bytes,
        },
        terms::{
            clean_symbol_name,
            sanitize_word,
        },
        ChosenSymbol,
        PickerError,
        SourceKind,
        SymbolCandidate,
        SymbolLocation,
    },
    persistence::write_atomic,
};

/// Directory holding a copy of every symbol picked for a deck.
#[derive(Debug, Clone)]
pub struct SymbolStore {
    dir: PathBuf,
    timeout: Duration,
}

impl SymbolStore {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { dir: dir.into(), timeout }
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn ensure_dir(&self) -> Result<(), PickerError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// `{word}_{source}_...` name the picked symbol is saved under.
    pub fn file_name_for(
        candidate: &SymbolCandidate,
        base_word: &str,
        entry_index: usize,
    ) -> Result<String, PickerError> {
        let word = sanitize_word(base_word, entry_index);
        let source = candidate.source.label();

        match &candidate.location {
            SymbolLocation::Local(path) => {
                let original = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                    PickerError::Custom(format!("Invalid symbol path: {}", path.display()))
                })?;
                Ok(format!("{word}_{source}_{original}"))
            }
            SymbolLocation::Remote(url) if candidate.source == SourceKind::Arasaac => {
                let id = url.rsplit('/').next().unwrap_or_default();
                let name = clean_symbol_name(&candidate.name);
                Ok(format!("{word}_{source}_{name}_{id}.png"))
            }
            SymbolLocation::Remote(url) => {
                let without_query = url.split('?').next().unwrap_or_default();
                let mut base = without_query.rsplit('/').next().unwrap_or_default().to_string();
                if Path::new(&base).extension().is_none() {
                    base.push_str(".png");
                }
                Ok(format!("{word}_{source}_{base}"))
            }
        }
    }

    /// Copies or writes the candidate's image into the store. Remote
    /// candidates reuse their preview bytes and are only downloaded again
    /// when no preview is held.
    pub fn store(
        &self,
        candidate: &SymbolCandidate,
        base_word: &str,
        entry_index: usize,
    ) -> Result<ChosenSymbol, PickerError> {
        self.ensure_dir()?;
        let filename = Self::file_name_for(candidate, base_word, entry_index)?;
        let target = self.path_of(&filename);

        match &candidate.location {
            SymbolLocation::Local(path) => {
                fs::copy(path, &target).map_err(|e| {
                    PickerError::Custom(format!("Could not copy {}: {}", path.display(), e))
                })?;
            }
            SymbolLocation::Remote(url) => {
                let bytes = match &candidate.preview {
                    Some(bytes) => bytes.to_vec(),
                    None => download_bytes(&blocking_client(self.timeout)?, url)?,
                };
                write_atomic(&target, &bytes)?;
            }
        }

        info!(source = %candidate.source, "Stored symbol {}", target.display());
        Ok(ChosenSymbol {
            filename,
            name: candidate.name.clone(),
            source: Some(candidate.source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_file_names_keep_original_basename() {
        let candidate = SymbolCandidate::local(
            "red_apple",
            SourceKind::Mulberry,
            PathBuf::from("mulberry-symbols/EN-symbols/red_apple.svg"),
        );
        assert_eq!(
            SymbolStore::file_name_for(&candidate, "ice cream", 0).unwrap(),
            "icecream_Mulberry_red_apple.svg"
        );
    }

    #[test]
    fn arasaac_file_names_include_clean_name_and_id() {
        let candidate = SymbolCandidate::remote(
            "apple tree!",
            SourceKind::Arasaac,
            "https://api.arasaac.org/api/pictograms/2462",
        );
        assert_eq!(
            SymbolStore::file_name_for(&candidate, "?!", 5).unwrap(),
            "entry5_ARASAAC_apple_tree_2462.png"
        );
    }

    #[test]
    fn remote_file_names_strip_query_and_add_extension() {
        let with_ext = SymbolCandidate::remote(
            "apple",
            SourceKind::Flaticon,
            "https://cdn.example.com/icons/apple-42.png?token=abc",
        );
        assert_eq!(
            SymbolStore::file_name_for(&with_ext, "apple", 0).unwrap(),
            "apple_Flaticon_apple-42.png"
        );

        let without_ext =
            SymbolCandidate::remote("apple", SourceKind::Flaticon, "https://cdn.example.com/dl/42?x=1");
        assert_eq!(
            SymbolStore::file_name_for(&without_ext, "apple", 0).unwrap(),
            "apple_Flaticon_42.png"
        );
    }

    #[test]
    fn stores_local_copy_and_remote_preview() {
        let dir = tempfile::tempdir().unwrap();
        let source_file = dir.path().join("1F436.png");
        fs::write(&source_file, b"png-bytes").unwrap();
        let store = SymbolStore::new(dir.path().join("selected_symbols"), Duration::from_secs(1));

        let local = SymbolCandidate::local("dog face", SourceKind::OpenMoji, source_file);
        let chosen = store.store(&local, "dog", 0).unwrap();
        assert_eq!(chosen.filename, "dog_OpenMoji_1F436.png");
        assert_eq!(chosen.name, "dog face");
        assert_eq!(fs::read(store.path_of(&chosen.filename)).unwrap(), b"png-bytes");

        let remote = SymbolCandidate::remote(
            "dog",
            SourceKind::Arasaac,
            "https://api.arasaac.org/api/pictograms/7",
        )
        .with_preview(b"remote".to_vec());
        let chosen = store.store(&remote, "dog", 0).unwrap();
        assert_eq!(chosen.filename, "dog_ARASAAC_dog_7.png");
        assert_eq!(fs::read(store.path_of(&chosen.filename)).unwrap(), b"remote");
    }

    #[test]
    fn missing_local_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SymbolStore::new(dir.path(), Duration::from_secs(1));
        let candidate =
            SymbolCandidate::local("ghost", SourceKind::Mulberry, dir.path().join("ghost.svg"));
        assert!(store.store(&candidate, "ghost", 0).is_err());
    }
}
