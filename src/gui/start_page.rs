use std::path::PathBuf;

use eframe::egui;
use rfd::FileDialog;

use crate::persistence::recent_decks::RecentDecks;

pub enum StartAction {
    NewDeck(String),
    LoadDeck(PathBuf),
    ForgetRecent(String),
}

/// What the start page needs to know about the rest of the app.
pub struct StartContext<'a> {
    pub recent: &'a RecentDecks,
    pub vocabulary_ready: bool,
    pub libraries_status: LibrariesStatus<'a>,
}

pub enum LibrariesStatus<'a> {
    Loading,
    Ready,
    Failed(&'a str),
}

#[derive(Default)]
pub struct StartPage {
    deck_name: String,
}

impl StartPage {
    pub fn show(&mut self, ui: &mut egui::Ui, context: StartContext<'_>) -> Option<StartAction> {
        let mut action = None;

        ui.heading("PictoPick");
        ui.label("Choose a symbol for every entry of a vocabulary list.");
        ui.add_space(8.0);

        match context.libraries_status {
            LibrariesStatus::Loading => {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label("Loading symbol libraries...");
                });
            }
            LibrariesStatus::Ready => {}
            LibrariesStatus::Failed(error) => {
                ui.colored_label(egui::Color32::RED, format!("Symbol libraries unavailable: {error}"));
            }
        }
        ui.separator();

        ui.strong("Start a new deck");
        ui.horizontal(|ui| {
            ui.label("Deck name:");
            let response = ui.add_enabled(
                context.vocabulary_ready,
                egui::TextEdit::singleline(&mut self.deck_name).hint_text("my_deck"),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let can_start = context.vocabulary_ready && !self.deck_name.trim().is_empty();

            if (ui.add_enabled(can_start, egui::Button::new("Start")).clicked() || submitted)
                && can_start
            {
                action = Some(StartAction::NewDeck(self.deck_name.trim().to_string()));
            }
        });
        if !context.vocabulary_ready {
            ui.weak("The base vocabulary could not be read; check the vocabulary path in settings.");
        }

        ui.add_space(12.0);
        ui.strong("Continue a deck");
        if ui.button("Load deck…").clicked() {
            if let Some(path) =
                FileDialog::new().add_filter("CSV files", &["csv"]).pick_file()
            {
                action = Some(StartAction::LoadDeck(path));
            }
        }

        let recent = context.recent.get_valid_decks();
        if !recent.is_empty() {
            ui.add_space(12.0);
            ui.strong("Recent decks");
            egui::Grid::new("recent_decks").striped(true).num_columns(4).show(ui, |ui| {
                for entry in recent {
                    if ui.link(&entry.title).on_hover_text(&entry.file_path).clicked() {
                        action = Some(StartAction::LoadDeck(PathBuf::from(&entry.file_path)));
                    }
                    ui.label(entry.format_progress());
                    ui.weak(entry.format_last_opened());
                    if ui.small_button("✕").on_hover_text("Remove from list").clicked() {
                        action = Some(StartAction::ForgetRecent(entry.file_path.clone()));
                    }
                    ui.end_row();
                }
            });
        }

        action
    }
}
