pub mod store;

use std::path::{
    Path,
    PathBuf,
};

use tracing::info;

pub use store::SymbolStore;

use crate::{
    core::{
        utils::ensure_exists,
        ChosenSymbol,
        PickerError,
        SourceKind,
        VocabEntry,
    },
    persistence::write_atomic,
};

pub const SYMBOL_FILENAME: &str = "symbol_filename";
pub const SYMBOL_NAME: &str = "symbol_name";
pub const SYMBOL_SOURCE: &str = "symbol_source";

/// A spreadsheet read as-is: header row plus string cells, each row padded
/// to the header width. Rows wider than the header are rejected. Blank cells
/// are treated as missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl VocabTable {
    pub fn read(path: &Path) -> Result<Self, PickerError> {
        ensure_exists(path)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                let line = record.position().map_or(rows.len() + 2, |p| p.line() as usize);
                return Err(PickerError::Custom(format!(
                    "Line {} of {} has {} cells but the header has {}",
                    line,
                    path.display(),
                    record.len(),
                    headers.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    fn to_csv(&self) -> Result<Vec<u8>, PickerError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| PickerError::Custom(format!("CSV flush failed: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub total: usize,
    pub completed: usize,
    pub start_index: usize,
    pub is_complete: bool,
}

impl LoadSummary {
    pub fn message(&self) -> String {
        if self.is_complete {
            format!("Deck is complete with {} symbols! Loading last entry.", self.completed)
        } else {
            format!(
                "Loaded {} entries. {} items have symbols.\n\nStarting at entry {}.",
                self.total,
                self.completed,
                self.start_index + 1
            )
        }
    }
}

#[derive(Debug)]
pub struct PickOutcome {
    pub autosave_error: Option<PickerError>,
    pub reached_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveCheck {
    /// Autosave is on and everything is on disk.
    Saved { filename: String },
    /// Autosave is off and there are picks not yet written.
    NeedsConfirmation { filename: String },
    Clean,
}

/// The vocabulary being annotated: rows, the row under edit and the file
/// progress is written to.
#[derive(Debug, Clone)]
pub struct Deck {
    table: VocabTable,
    phrase_idx: usize,
    filename_idx: usize,
    name_idx: usize,
    source_idx: usize,
    output_path: PathBuf,
    current: usize,
    autosave: bool,
    dirty: bool,
}

impl Deck {
    pub fn output_path_for(dir: &Path, deck_name: &str) -> Result<PathBuf, PickerError> {
        let name = deck_name.trim();
        if name.is_empty() {
            return Err(PickerError::Custom("Deck name cannot be empty".to_string()));
        }
        Ok(dir.join(format!("{name}.csv")))
    }

    /// A fresh deck over a copy of `vocabulary`. Nothing is written until
    /// the first save.
    pub fn start_new(
        vocabulary: &VocabTable,
        phrase_column: &str,
        output_path: PathBuf,
        autosave: bool,
    ) -> Result<Self, PickerError> {
        let deck = Self::from_table(vocabulary.clone(), phrase_column, output_path, autosave)?;
        info!("Started deck {} with {} entries", deck.output_path.display(), deck.len());
        Ok(deck)
    }

    pub fn load(
        path: &Path,
        phrase_column: &str,
        autosave: bool,
    ) -> Result<(Self, LoadSummary), PickerError> {
        let table = VocabTable::read(path)?;
        let mut deck = Self::from_table(table, phrase_column, path.to_path_buf(), autosave)?;
        deck.validate_sources()?;

        let total = deck.len();
        let completed = deck.completed_count();
        let first_incomplete = (0..total).find(|&i| !deck.is_row_complete(i));

        let summary = match first_incomplete {
            Some(start_index) => {
                LoadSummary { total, completed, start_index, is_complete: false }
            }
            None => LoadSummary { total, completed, start_index: total - 1, is_complete: true },
        };
        deck.current = summary.start_index;

        info!("Loaded deck {}: {}/{} complete", path.display(), completed, total);
        Ok((deck, summary))
    }

    fn from_table(
        mut table: VocabTable,
        phrase_column: &str,
        output_path: PathBuf,
        autosave: bool,
    ) -> Result<Self, PickerError> {
        let phrase_idx = table.column(phrase_column).ok_or_else(|| PickerError::MissingColumn {
            column: phrase_column.to_string(),
            file: output_path.display().to_string(),
        })?;
        if table.is_empty() {
            return Err(PickerError::EmptyDeck(output_path.display().to_string()));
        }

        let filename_idx = table.ensure_column(SYMBOL_FILENAME);
        let name_idx = table.ensure_column(SYMBOL_NAME);
        let source_idx = table.ensure_column(SYMBOL_SOURCE);

        Ok(Self {
            table,
            phrase_idx,
            filename_idx,
            name_idx,
            source_idx,
            output_path,
            current: 0,
            autosave,
            dirty: false,
        })
    }

    fn validate_sources(&self) -> Result<(), PickerError> {
        for (i, row) in self.table.rows.iter().enumerate() {
            let source = row[self.source_idx].trim();
            if source.is_empty() {
                continue;
            }
            if source.parse::<SourceKind>().is_err() {
                return Err(PickerError::UnknownSource { label: source.to_string(), row: i + 1 });
            }
        }
        Ok(())
    }

    fn value(&self, row: usize, col: usize) -> Option<&str> {
        let value = self.table.rows.get(row)?.get(col)?.trim();
        (!value.is_empty()).then_some(value)
    }

    fn is_row_complete(&self, row: usize) -> bool {
        self.value(row, self.filename_idx).is_some()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_row_complete(i)).count()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn entry(&self, index: usize) -> Option<VocabEntry> {
        if index >= self.len() {
            return None;
        }

        let symbol = self.value(index, self.filename_idx).map(|filename| ChosenSymbol {
            filename: filename.to_string(),
            name: self.value(index, self.name_idx).unwrap_or_default().to_string(),
            source: self.value(index, self.source_idx).and_then(|s| s.parse().ok()),
        });

        Some(VocabEntry {
            index,
            phrase: self.value(index, self.phrase_idx).map(str::to_string),
            symbol,
        })
    }

    pub fn current_entry(&self) -> VocabEntry {
        // `current` is always kept within bounds of a non-empty deck.
        self.entry(self.current).unwrap_or(VocabEntry {
            index: self.current,
            phrase: None,
            symbol: None,
        })
    }

    /// Advances one row. Returns false when already on the last row.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to a 1-based entry number typed by the user.
    pub fn go_to(&mut self, input: &str) -> Result<usize, PickerError> {
        let number: usize = input
            .trim()
            .parse()
            .map_err(|_| PickerError::Custom("Please enter a valid number.".to_string()))?;

        if number == 0 || number > self.len() {
            return Err(PickerError::IndexOutOfRange { index: number, total: self.len() });
        }

        self.current = number - 1;
        Ok(self.current)
    }

    /// Records `symbol` for the current row, overwriting any earlier pick,
    /// autosaves when enabled, then moves to the next row.
    pub fn record_pick(&mut self, symbol: ChosenSymbol) -> PickOutcome {
        let row = &mut self.table.rows[self.current];
        row[self.filename_idx] = symbol.filename;
        row[self.name_idx] = symbol.name;
        row[self.source_idx] = symbol.source.map(|s| s.label()).unwrap_or_default().to_string();
        self.dirty = true;

        let autosave_error = if self.autosave { self.save().err() } else { None };
        let reached_end = !self.next();

        PickOutcome { autosave_error, reached_end }
    }

    pub fn save(&mut self) -> Result<(), PickerError> {
        let bytes = self.table.to_csv()?;
        write_atomic(&self.output_path, &bytes)?;
        self.dirty = false;
        info!("Saved progress to {}", self.output_path.display());
        Ok(())
    }

    /// Writes to `path` and makes it the output file. The previous output
    /// file stays current if the write fails.
    pub fn save_as(&mut self, path: PathBuf) -> Result<(), PickerError> {
        let bytes = self.table.to_csv()?;
        write_atomic(&path, &bytes)?;
        self.output_path = path;
        self.dirty = false;
        info!("Saved progress to {}", self.output_path.display());
        Ok(())
    }

    pub fn prepare_leave(&mut self) -> Result<LeaveCheck, PickerError> {
        let filename = self.output_filename();
        if self.autosave {
            if self.dirty {
                self.save()?;
            }
            Ok(LeaveCheck::Saved { filename })
        } else if self.dirty {
            Ok(LeaveCheck::NeedsConfirmation { filename })
        } else {
            Ok(LeaveCheck::Clean)
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_filename(&self) -> String {
        self.output_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("deck.csv")
            .to_string()
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const VOCAB: &str = "esperanto,english,notes\nhundo,dog,\nkato,cat (feline),pet\npomo,,fruit\n";

    fn vocab_file(dir: &Path) -> PathBuf {
        let path = dir.join("vocab.csv");
        fs::write(&path, VOCAB).unwrap();
        path
    }

    fn chosen(filename: &str, source: SourceKind) -> ChosenSymbol {
        ChosenSymbol {
            filename: filename.to_string(),
            name: "a name".to_string(),
            source: Some(source),
        }
    }

    #[test]
    fn new_deck_adds_symbol_columns_and_preserves_others() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let output = Deck::output_path_for(dir.path(), " animals ").unwrap();
        assert_eq!(output, dir.path().join("animals.csv"));

        let mut deck = Deck::start_new(&vocab, "english", output.clone(), true).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.current_index(), 0);
        assert!(!output.exists());

        deck.save().unwrap();
        let written = fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "esperanto,english,notes,symbol_filename,symbol_name,symbol_source"
        );
        assert_eq!(lines.next().unwrap(), "hundo,dog,,,,");
        assert_eq!(lines.next().unwrap(), "kato,cat (feline),pet,,,");
    }

    #[test]
    fn empty_deck_name_is_rejected() {
        assert!(Deck::output_path_for(Path::new("."), "  ").is_err());
    }

    #[test]
    fn missing_phrase_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let err = Deck::start_new(&vocab, "french", dir.path().join("x.csv"), true).unwrap_err();
        assert!(matches!(err, PickerError::MissingColumn { .. }));
    }

    #[test]
    fn pick_autosaves_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let output = dir.path().join("deck.csv");
        let mut deck = Deck::start_new(&vocab, "english", output.clone(), true).unwrap();

        let outcome = deck.record_pick(chosen("dog_Mulberry_dog.svg", SourceKind::Mulberry));
        assert!(outcome.autosave_error.is_none());
        assert!(!outcome.reached_end);
        assert_eq!(deck.current_index(), 1);
        assert!(!deck.is_dirty());

        let (reloaded, summary) = Deck::load(&output, "english", true).unwrap();
        assert_eq!(summary, LoadSummary { total: 3, completed: 1, start_index: 1, is_complete: false });
        assert_eq!(
            reloaded.entry(0).unwrap().symbol,
            Some(chosen("dog_Mulberry_dog.svg", SourceKind::Mulberry))
        );
        assert_eq!(reloaded.entry(2).unwrap().phrase, None);
    }

    #[test]
    fn repick_overwrites_previous_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let mut deck = Deck::start_new(&vocab, "english", dir.path().join("d.csv"), false).unwrap();

        deck.record_pick(chosen("first.png", SourceKind::OpenMoji));
        deck.prev();
        deck.record_pick(chosen("second.png", SourceKind::Arasaac));

        let entry = deck.entry(0).unwrap();
        assert_eq!(entry.symbol.unwrap().filename, "second.png");
        assert_eq!(deck.completed_count(), 1);
    }

    #[test]
    fn complete_deck_resumes_on_last_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.csv");
        fs::write(
            &path,
            "english,symbol_filename,symbol_name,symbol_source\n\
             dog,dog.svg,dog,Mulberry\ncat,cat.png,cat,Flaticon\n",
        )
        .unwrap();

        let (deck, summary) = Deck::load(&path, "english", true).unwrap();
        assert!(summary.is_complete);
        assert_eq!(deck.current_index(), 1);
        assert_eq!(summary.message(), "Deck is complete with 2 symbols! Loading last entry.");
    }

    #[test]
    fn unknown_source_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "english,symbol_filename,symbol_name,symbol_source\ndog,,,\ncat,cat.png,cat,Noun Project\n",
        )
        .unwrap();

        let err = Deck::load(&path, "english", true).unwrap_err();
        assert!(matches!(err, PickerError::UnknownSource { row: 2, .. }));
    }

    #[test]
    fn rows_wider_than_header_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "english,notes\ndog,a,EXTRA\ncat,b\n").unwrap();

        let err = Deck::load(&path, "english", true).unwrap_err();
        assert!(err.to_string().contains("Line 2"), "{err}");
        assert!(VocabTable::read(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "english,notes\ndog,a,EXTRA\ncat,b\n");
    }

    #[test]
    fn short_rows_are_padded_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "english,notes,extra\ndog,a\n").unwrap();

        let (mut deck, _) = Deck::load(&path, "english", true).unwrap();
        deck.save().unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().nth(1).unwrap(), "dog,a,,,,");
    }

    #[test]
    fn row_with_file_but_no_source_loads_as_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            "english,symbol_filename,symbol_name,symbol_source\ndog,dog.png,dog,\ncat,,,\n",
        )
        .unwrap();

        let (deck, summary) = Deck::load(&path, "english", true).unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(deck.current_index(), 1);

        let symbol = deck.entry(0).unwrap().symbol.unwrap();
        assert_eq!(symbol.filename, "dog.png");
        assert_eq!(symbol.source, None);
    }

    #[test]
    fn navigation_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let mut deck = Deck::start_new(&vocab, "english", dir.path().join("d.csv"), true).unwrap();

        assert!(!deck.prev());
        assert_eq!(deck.go_to(" 3 ").unwrap(), 2);
        assert!(!deck.next());
        assert!(matches!(deck.go_to("4"), Err(PickerError::IndexOutOfRange { index: 4, total: 3 })));
        assert!(deck.go_to("0").is_err());
        assert!(deck.go_to("two").is_err());
        assert_eq!(deck.current_index(), 2);
    }

    #[test]
    fn failed_save_as_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let original = dir.path().join("d.csv");
        let mut deck = Deck::start_new(&vocab, "english", original.clone(), false).unwrap();
        deck.record_pick(chosen("dog.png", SourceKind::OpenMoji));

        let bad = dir.path().join("no_such_dir").join("d.csv");
        assert!(deck.save_as(bad).is_err());
        assert_eq!(deck.output_path(), original.as_path());
        assert!(deck.is_dirty());

        let renamed = dir.path().join("renamed.csv");
        deck.save_as(renamed.clone()).unwrap();
        assert_eq!(deck.output_filename(), "renamed.csv");
        assert!(!deck.is_dirty());
    }

    #[test]
    fn leaving_without_autosave_needs_confirmation_only_when_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = VocabTable::read(&vocab_file(dir.path())).unwrap();
        let mut deck = Deck::start_new(&vocab, "english", dir.path().join("d.csv"), false).unwrap();
        assert_eq!(deck.prepare_leave().unwrap(), LeaveCheck::Clean);

        deck.record_pick(chosen("dog.png", SourceKind::OpenMoji));
        assert_eq!(
            deck.prepare_leave().unwrap(),
            LeaveCheck::NeedsConfirmation { filename: "d.csv".to_string() }
        );

        deck.set_autosave(true);
        assert_eq!(deck.prepare_leave().unwrap(), LeaveCheck::Saved { filename: "d.csv".to_string() });
        assert!(dir.path().join("d.csv").exists());
    }
}
