use std::{
    fmt,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::PickerError;

/// The symbol providers, in the order their results are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Mulberry,
    OpenMoji,
    #[serde(rename = "ARASAAC")]
    Arasaac,
    Flaticon,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] =
        [SourceKind::Mulberry, SourceKind::OpenMoji, SourceKind::Arasaac, SourceKind::Flaticon];

    /// Label written to the `symbol_source` column and used in filenames.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Mulberry => "Mulberry",
            SourceKind::OpenMoji => "OpenMoji",
            SourceKind::Arasaac => "ARASAAC",
            SourceKind::Flaticon => "Flaticon",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceKind::Arasaac | SourceKind::Flaticon)
    }

    pub fn display_rank(&self) -> usize {
        SourceKind::ALL.iter().position(|s| s == self).unwrap_or(SourceKind::ALL.len())
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceKind {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| PickerError::Custom(format!("Unknown symbol source: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolLocation {
    Local(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone)]
pub struct SymbolCandidate {
    pub name: String,
    pub source: SourceKind,
    pub location: SymbolLocation,
    pub preview: Option<Arc<[u8]>>, // Downloaded image bytes for remote candidates
}

impl SymbolCandidate {
    pub fn local(name: impl Into<String>, source: SourceKind, path: PathBuf) -> Self {
        Self { name: name.into(), source, location: SymbolLocation::Local(path), preview: None }
    }

    pub fn remote(name: impl Into<String>, source: SourceKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source,
            location: SymbolLocation::Remote(url.into()),
            preview: None,
        }
    }

    pub fn with_preview(mut self, bytes: Vec<u8>) -> Self {
        self.preview = Some(Arc::from(bytes));
        self
    }
}

/// A symbol recorded against a vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenSymbol {
    pub filename: String,
    pub name: String,
    /// None for rows saved with a filename but no source label.
    pub source: Option<SourceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub index: usize,
    pub phrase: Option<String>,
    pub symbol: Option<ChosenSymbol>,
}

impl VocabEntry {
    pub fn is_complete(&self) -> bool {
        self.symbol.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.label().parse::<SourceKind>().unwrap(), kind);
        }
        assert!("Noun Project".parse::<SourceKind>().is_err());
        assert!("arasaac".parse::<SourceKind>().is_err());
    }

    #[test]
    fn display_rank_follows_display_order() {
        assert!(SourceKind::Mulberry.display_rank() < SourceKind::OpenMoji.display_rank());
        assert!(SourceKind::OpenMoji.display_rank() < SourceKind::Arasaac.display_rank());
        assert!(SourceKind::Arasaac.display_rank() < SourceKind::Flaticon.display_rank());
        assert!(SourceKind::Flaticon.is_remote());
        assert!(!SourceKind::OpenMoji.is_remote());
    }
}
