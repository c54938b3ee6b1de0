//! Picking session: the deck, the result board and the sources behind it.
//!
//! The session decides what to search for the current entry, runs the local
//! libraries inline, hands remote sources to a [`SearchDispatcher`] and
//! folds whatever comes back into the [`ResultBoard`].

use std::{
    sync::Arc,
    time::Duration,
};

use tracing::{
    debug,
    warn,
};

use crate::{
    core::{
        settings::SettingsData,
        tasks::{
            SearchGeneration,
            TaskManager,
            TaskResult,
        },
        terms::SearchTerms,
        ChosenSymbol,
        PickerError,
        SourceKind,
        VocabEntry,
    },
    deck::{
        Deck,
        SymbolStore,
    },
    search::ResultBoard,
    sources::{
        LocalLibraries,
        RemoteSource,
    },
};

/// Runs remote searches somewhere off the caller's thread.
pub trait SearchDispatcher {
    fn generation(&self) -> &SearchGeneration;

    fn dispatch(&self, source: RemoteSource, query: String, generation: u64, timeout: Duration);
}

impl SearchDispatcher for TaskManager {
    fn generation(&self) -> &SearchGeneration {
        TaskManager::generation(self)
    }

    fn dispatch(&self, source: RemoteSource, query: String, generation: u64, timeout: Duration) {
        self.search_remote(source, query, generation, timeout);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView {
    /// The current entry already has a symbol; searching waits until the
    /// user asks to replace it.
    Existing(ChosenSymbol),
    Results,
}

#[derive(Debug)]
pub struct PickReport {
    pub chosen: ChosenSymbol,
    pub autosave_error: Option<PickerError>,
    pub reached_end: bool,
}

pub struct PickerSession {
    deck: Deck,
    libraries: Arc<LocalLibraries>,
    store: SymbolStore,
    board: ResultBoard,
    terms: SearchTerms,
    active_term: String,
    custom_query: String,
    view: PickerView,
    settings: SettingsData,
}

impl PickerSession {
    pub fn new(deck: Deck, libraries: Arc<LocalLibraries>, settings: SettingsData) -> Self {
        let store =
            SymbolStore::new(settings.selected_symbols_dir.clone(), settings.request_timeout());
        let terms = SearchTerms::from_phrase(deck.current_entry().phrase.as_deref());
        let active_term = terms.base_word().to_string();

        Self {
            deck,
            libraries,
            store,
            board: ResultBoard::new(),
            terms,
            active_term,
            custom_query: String::new(),
            view: PickerView::Results,
            settings,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    pub fn board(&self) -> &ResultBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut ResultBoard {
        &mut self.board
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    pub fn terms(&self) -> &SearchTerms {
        &self.terms
    }

    pub fn active_term(&self) -> &str {
        &self.active_term
    }

    pub fn view(&self) -> &PickerView {
        &self.view
    }

    pub fn current_entry(&self) -> VocabEntry {
        self.deck.current_entry()
    }

    pub fn set_custom_query(&mut self, query: impl Into<String>) {
        self.custom_query = query.into();
    }

    /// The custom query when one is typed, otherwise the active term.
    pub fn query(&self) -> String {
        let custom = self.custom_query.trim();
        if custom.is_empty() {
            self.active_term.clone()
        } else {
            custom.to_string()
        }
    }

    /// Loads the current entry: shows its stored symbol when it has one,
    /// otherwise starts a search.
    pub fn open_current(&mut self, dispatcher: &impl SearchDispatcher) {
        let entry = self.deck.current_entry();
        self.terms = SearchTerms::from_phrase(entry.phrase.as_deref());
        self.active_term = self.terms.base_word().to_string();
        self.custom_query.clear();

        match entry.symbol {
            Some(symbol) => {
                // Invalidate anything still in flight for the previous entry.
                let generation = dispatcher.generation().advance();
                self.board.begin(generation, "");
                self.view = PickerView::Existing(symbol);
            }
            None => self.refresh(dispatcher),
        }
    }

    /// New search for the current query: local libraries inline, ARASAAC
    /// in the background. Results of earlier searches are discarded.
    pub fn refresh(&mut self, dispatcher: &impl SearchDispatcher) {
        self.view = PickerView::Results;
        let generation = dispatcher.generation().advance();

        if self.custom_query.trim().is_empty() && self.terms.is_unsearchable() {
            self.board.begin(generation, "");
            debug!(entry = self.deck.current_index(), "entry has no phrase; skipping search");
            return;
        }

        let query = self.query();
        self.board.begin(generation, query.clone());

        let limit = self.settings.results_per_source;
        for library in self.libraries.iter() {
            self.board.add_local(library.kind(), library.search(&query, limit));
        }

        self.board.mark_pending(SourceKind::Arasaac);
        dispatcher.dispatch(
            RemoteSource::arasaac(&self.settings),
            query,
            generation,
            self.settings.request_timeout(),
        );
    }

    /// Refresh using whatever is currently typed in the custom search box.
    pub fn refresh_with_query(&mut self, custom: &str, dispatcher: &impl SearchDispatcher) {
        self.set_custom_query(custom);
        self.refresh(dispatcher);
    }

    pub fn switch_term(&mut self, term: &str, dispatcher: &impl SearchDispatcher) {
        if let Some(term) = self.terms.terms().iter().find(|t| t.as_str() == term) {
            self.active_term = term.clone();
            self.refresh(dispatcher);
        }
    }

    pub fn can_request_flaticon(&self) -> bool {
        self.view == PickerView::Results
            && !self.board.query().is_empty()
            && !self.board.is_requested(SourceKind::Flaticon)
    }

    /// Flaticon is only searched on demand, once per refresh.
    pub fn request_flaticon(&mut self, dispatcher: &impl SearchDispatcher) -> Result<(), PickerError> {
        if !self.can_request_flaticon() {
            return Ok(());
        }

        if self.settings.flaticon_api_key.is_none() {
            let err = PickerError::MissingApiKey("Flaticon");
            self.board.fail(SourceKind::Flaticon, err.to_string());
            return Err(err);
        }

        self.board.mark_pending(SourceKind::Flaticon);
        dispatcher.dispatch(
            RemoteSource::flaticon(&self.settings),
            self.board.query().to_string(),
            self.board.generation(),
            self.settings.request_timeout(),
        );
        Ok(())
    }

    /// Folds a background result into the board. Returns false for stale or
    /// unrelated results.
    pub fn apply(&mut self, result: TaskResult) -> bool {
        match result {
            TaskResult::Symbol { generation, candidate } => {
                self.board.push_remote(generation, candidate)
            }
            TaskResult::SourceFinished { generation, source, error } => {
                self.board.finish(generation, source, error)
            }
            TaskResult::LibrariesLoaded(_) => false,
        }
    }

    /// Saves candidate `index` for the current entry and moves on.
    pub fn pick(
        &mut self,
        index: usize,
        dispatcher: &impl SearchDispatcher,
    ) -> Result<PickReport, PickerError> {
        let candidate = self
            .board
            .candidate(index)
            .cloned()
            .ok_or_else(|| PickerError::Custom(format!("No symbol at position {}", index + 1)))?;

        let chosen =
            self.store.store(&candidate, self.terms.base_word(), self.deck.current_index())?;
        let outcome = self.deck.record_pick(chosen.clone());
        if let Some(e) = &outcome.autosave_error {
            warn!("Autosave failed: {e}");
        }

        // At the end the deck stays on the last row, which now shows the pick.
        self.open_current(dispatcher);

        Ok(PickReport {
            chosen,
            autosave_error: outcome.autosave_error,
            reached_end: outcome.reached_end,
        })
    }

    pub fn pick_selected(
        &mut self,
        dispatcher: &impl SearchDispatcher,
    ) -> Result<PickReport, PickerError> {
        let index = self
            .board
            .selected_index()
            .ok_or_else(|| PickerError::Custom("No symbol selected".to_string()))?;
        self.pick(index, dispatcher)
    }

    /// Returns false at the end of the list.
    pub fn next(&mut self, dispatcher: &impl SearchDispatcher) -> bool {
        let moved = self.deck.next();
        if moved {
            self.open_current(dispatcher);
        }
        moved
    }

    pub fn prev(&mut self, dispatcher: &impl SearchDispatcher) -> bool {
        let moved = self.deck.prev();
        if moved {
            self.open_current(dispatcher);
        }
        moved
    }

    pub fn go_to(&mut self, input: &str, dispatcher: &impl SearchDispatcher) -> Result<(), PickerError> {
        self.deck.go_to(input)?;
        self.open_current(dispatcher);
        Ok(())
    }
}
