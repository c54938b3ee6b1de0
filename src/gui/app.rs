use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
    time::Duration,
};

use eframe::egui;
use tracing::{
    info,
    warn,
};

use super::{
    confirm_modal::{
        ConfirmChoice,
        ConfirmModal,
    },
    notice_modal::NoticeModal,
    picker_page::{
        PickerAction,
        PickerPage,
    },
    start_page::{
        LibrariesStatus,
        StartAction,
        StartContext,
        StartPage,
    },
};
use crate::{
    core::{
        settings::SettingsData,
        tasks::{
            TaskManager,
            TaskResult,
        },
        PickerError,
    },
    deck::{
        Deck,
        LeaveCheck,
        VocabTable,
    },
    persistence::recent_decks::RecentDecks,
    picker::PickerSession,
    sources::LocalLibraries,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

enum Prompt {
    OverwriteDeck(PathBuf),
    LeaveUnsaved,
}

enum Libraries {
    Loading,
    Ready(Arc<LocalLibraries>),
    Failed(String),
}

pub struct PickerApp {
    settings: SettingsData,
    task_manager: TaskManager,
    libraries: Libraries,
    vocabulary: Option<VocabTable>,
    recent: RecentDecks,

    session: Option<PickerSession>,
    start_page: StartPage,
    picker_page: PickerPage,

    notices: NoticeModal,
    confirm: ConfirmModal<Prompt>,
}

impl PickerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: SettingsData) -> Result<Self, PickerError> {
        let task_manager = TaskManager::new()?;
        task_manager.load_libraries(settings.clone());

        let mut notices = NoticeModal::new();
        let vocabulary = match VocabTable::read(&settings.vocabulary_path) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("Base vocabulary unavailable: {e}");
                notices.error(
                    "Vocabulary not found",
                    format!(
                        "Could not read {}. Starting a new deck is disabled.",
                        settings.vocabulary_path.display()
                    ),
                    Some(e.to_string()),
                );
                None
            }
        };

        Ok(Self {
            settings,
            task_manager,
            libraries: Libraries::Loading,
            vocabulary,
            recent: RecentDecks::load(),
            session: None,
            start_page: StartPage::default(),
            picker_page: PickerPage::default(),
            notices,
            confirm: ConfirmModal::new(),
        })
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::LibrariesLoaded(Ok(libraries)) => {
                info!(
                    mulberry = libraries.mulberry.len(),
                    openmoji = libraries.openmoji.len(),
                    "Symbol libraries ready"
                );
                self.libraries = Libraries::Ready(Arc::new(libraries));
            }
            TaskResult::LibrariesLoaded(Err(e)) => {
                self.notices.error(
                    "Symbol libraries unavailable",
                    "The local symbol libraries could not be loaded, so the picker cannot open.",
                    Some(e.clone()),
                );
                self.libraries = Libraries::Failed(e);
            }
            other => {
                if let Some(session) = &mut self.session {
                    session.apply(other);
                }
            }
        }
    }

    fn handle_start_action(&mut self, action: StartAction) {
        match action {
            StartAction::NewDeck(name) => {
                let dir = deck_dir(&self.settings.vocabulary_path);
                match Deck::output_path_for(dir, &name) {
                    Ok(path) if path.exists() => self.confirm.ask(
                        Prompt::OverwriteDeck(path.clone()),
                        "Overwrite deck?",
                        format!("{} already exists. Start over and replace it?", path.display()),
                    ),
                    Ok(path) => self.start_deck(path),
                    Err(e) => self.notices.info("Invalid name", e.to_string()),
                }
            }
            StartAction::LoadDeck(path) => self.load_deck(&path),
            StartAction::ForgetRecent(path) => {
                self.recent.remove(&path);
                self.save_recent();
            }
        }
    }

    fn start_deck(&mut self, path: PathBuf) {
        let Some(vocabulary) = &self.vocabulary else {
            return;
        };

        match Deck::start_new(
            vocabulary,
            &self.settings.phrase_column,
            path,
            self.settings.autosave,
        ) {
            Ok(deck) => {
                self.open_session(deck);
            }
            Err(e) => self.notices.error("Could not start deck", e.to_string(), None::<String>),
        }
    }

    fn load_deck(&mut self, path: &Path) {
        match Deck::load(path, &self.settings.phrase_column, self.settings.autosave) {
            Ok((deck, summary)) => {
                if self.open_session(deck) {
                    self.notices.info("Deck loaded", summary.message());
                }
            }
            Err(e) => {
                self.notices.error(
                    "Could not load deck",
                    format!("{} could not be opened.", path.display()),
                    Some(e.to_string()),
                );
            }
        }
    }

    fn open_session(&mut self, deck: Deck) -> bool {
        let libraries = match &self.libraries {
            Libraries::Ready(libraries) => libraries.clone(),
            Libraries::Loading => {
                self.notices.info("Please wait", "Symbol libraries are still loading.");
                return false;
            }
            Libraries::Failed(e) => {
                self.notices.error(
                    "Picker unavailable",
                    "The local symbol libraries failed to load.",
                    Some(e.clone()),
                );
                return false;
            }
        };

        self.remember(&deck);
        let mut session = PickerSession::new(deck, libraries, self.settings.clone());
        session.open_current(&self.task_manager);
        self.session = Some(session);
        true
    }

    fn remember(&mut self, deck: &Deck) {
        self.recent.record(
            deck.output_path().display().to_string(),
            deck.len(),
            deck.completed_count(),
        );
        self.save_recent();
    }

    fn save_recent(&self) {
        if let Err(e) = self.recent.save() {
            warn!("Failed to save recent decks: {e}");
        }
    }

    fn handle_picker_action(&mut self, action: PickerAction) {
        match action {
            PickerAction::SavedAs(path) => {
                info!("Deck saved as {}", path.display());
                if let Some(session) = self.session.take() {
                    self.remember(session.deck());
                    self.session = Some(session);
                }
            }
            PickerAction::Home => self.leave_picker(),
        }
    }

    fn leave_picker(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };

        match session.deck_mut().prepare_leave() {
            Ok(LeaveCheck::Saved { filename }) => {
                self.notices.info("Progress saved", format!("Your progress was saved to {filename}."));
                self.close_session();
            }
            Ok(LeaveCheck::NeedsConfirmation { filename }) => self.confirm.ask_with_cancel(
                Prompt::LeaveUnsaved,
                "Unsaved changes",
                format!("Save your progress to {filename} before leaving?"),
            ),
            Ok(LeaveCheck::Clean) => self.close_session(),
            Err(e) => self.notices.error(
                "Save failed",
                "Your progress could not be saved, so the deck stays open.",
                Some(e.to_string()),
            ),
        }
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            // Results still in flight belong to a deck that is gone.
            self.task_manager.generation().advance();
            self.remember(session.deck());
        }
        self.picker_page = PickerPage::default();
    }

    fn handle_prompt(&mut self, prompt: Prompt, choice: ConfirmChoice) {
        match (prompt, choice) {
            (Prompt::OverwriteDeck(path), ConfirmChoice::Yes) => self.start_deck(path),
            (Prompt::OverwriteDeck(_), _) => {}
            (Prompt::LeaveUnsaved, ConfirmChoice::Yes) => {
                let saved = self.session.as_mut().map(|s| s.deck_mut().save());
                match saved {
                    Some(Err(e)) => self.notices.error(
                        "Save failed",
                        "Your progress could not be saved, so the deck stays open.",
                        Some(e.to_string()),
                    ),
                    _ => self.close_session(),
                }
            }
            (Prompt::LeaveUnsaved, ConfirmChoice::No) => self.close_session(),
            (Prompt::LeaveUnsaved, ConfirmChoice::Cancel) => {}
        }
    }
}

/// New decks are written next to the base vocabulary.
fn deck_dir(vocabulary_path: &Path) -> &Path {
    vocabulary_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."))
}

impl eframe::App for PickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.task_manager.poll_results() {
            self.handle_task_result(result);
        }

        let mut start_action = None;
        let mut picker_action = None;

        egui::CentralPanel::default().show(ctx, |ui| match &mut self.session {
            Some(session) => {
                picker_action =
                    self.picker_page.show(ui, session, &self.task_manager, &mut self.notices);
            }
            None => {
                let libraries_status = match &self.libraries {
                    Libraries::Loading => LibrariesStatus::Loading,
                    Libraries::Ready(_) => LibrariesStatus::Ready,
                    Libraries::Failed(e) => LibrariesStatus::Failed(e),
                };
                start_action = self.start_page.show(
                    ui,
                    StartContext {
                        recent: &self.recent,
                        vocabulary_ready: self.vocabulary.is_some(),
                        libraries_status,
                    },
                );
            }
        });

        if let Some(action) = start_action {
            self.handle_start_action(action);
        }
        if let Some(action) = picker_action {
            self.handle_picker_action(action);
        }

        if let Some((prompt, choice)) = self.confirm.show(ctx) {
            self.handle_prompt(prompt, choice);
        }
        self.notices.show(ctx);

        let waiting = matches!(self.libraries, Libraries::Loading)
            || self.session.as_ref().is_some_and(|s| s.board().is_pending());
        if waiting {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
