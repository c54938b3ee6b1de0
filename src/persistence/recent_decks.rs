use std::{
    collections::VecDeque,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};

pub const RECENT_DECKS_FILE: &str = "recent_decks.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDeckEntry {
    pub file_path: String,
    pub title: String,
    pub last_opened: chrono::DateTime<chrono::Utc>,
    pub entry_count: usize,
    pub completed_count: usize,
}

impl RecentDeckEntry {
    pub fn new(file_path: String, entry_count: usize, completed_count: usize) -> Self {
        let title = Path::new(&file_path)
            .file_stem()
            .and_then(|name| name.to_str())
            .unwrap_or("Unknown")
            .to_string();

        Self { file_path, title, last_opened: chrono::Utc::now(), entry_count, completed_count }
    }

    pub fn file_exists(&self) -> bool {
        Path::new(&self.file_path).exists()
    }

    pub fn format_last_opened(&self) -> String {
        let local_time = self.last_opened.with_timezone(&chrono::Local);
        local_time.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn format_progress(&self) -> String {
        format!("{}/{} symbols", self.completed_count, self.entry_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDecks {
    decks: VecDeque<RecentDeckEntry>,
    max_entries: usize,
}

impl Default for RecentDecks {
    fn default() -> Self {
        Self::new(10)
    }
}

impl RecentDecks {
    pub fn new(max_entries: usize) -> Self {
        Self { decks: VecDeque::new(), max_entries }
    }

    pub fn load() -> Self {
        super::load_json_or_default(RECENT_DECKS_FILE)
    }

    pub fn save(&self) -> Result<(), crate::core::PickerError> {
        super::save_json(self, RECENT_DECKS_FILE)
    }

    /// Moves `file_path` to the front, dropping the oldest entry when full.
    pub fn record(&mut self, file_path: String, entry_count: usize, completed_count: usize) {
        self.decks.retain(|entry| entry.file_path != file_path);

        self.decks.push_front(RecentDeckEntry::new(file_path, entry_count, completed_count));

        while self.decks.len() > self.max_entries {
            self.decks.pop_back();
        }
    }

    pub fn get_valid_decks(&self) -> Vec<&RecentDeckEntry> {
        self.decks.iter().filter(|entry| entry.file_exists()).collect()
    }

    pub fn remove(&mut self, file_path: &str) {
        self.decks.retain(|entry| entry.file_path != file_path);
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_moves_existing_to_front_and_caps_length() {
        let mut recent = RecentDecks::new(2);
        recent.record("a.csv".to_string(), 10, 1);
        recent.record("b.csv".to_string(), 10, 2);
        recent.record("a.csv".to_string(), 10, 5);

        assert_eq!(recent.len(), 2);
        assert_eq!(recent.decks[0].file_path, "a.csv");
        assert_eq!(recent.decks[0].completed_count, 5);
        assert_eq!(recent.decks[0].title, "a");

        recent.record("c.csv".to_string(), 3, 0);
        assert_eq!(recent.len(), 2);
        assert!(recent.decks.iter().all(|d| d.file_path != "b.csv"));
    }

    #[test]
    fn valid_decks_skip_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.csv");
        std::fs::write(&present, "english\n").unwrap();

        let mut recent = RecentDecks::default();
        recent.record(present.display().to_string(), 1, 0);
        recent.record(dir.path().join("gone.csv").display().to_string(), 1, 0);

        let valid = recent.get_valid_decks();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].title, "present");
        assert_eq!(valid[0].format_progress(), "0/1 symbols");
    }
}
