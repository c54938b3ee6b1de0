use std::{
    mem,
    path::PathBuf,
};

use eframe::egui;
use rfd::FileDialog;
use tracing::info;

use super::notice_modal::NoticeModal;
use crate::{
    core::{
        tasks::TaskManager,
        SourceKind,
        SymbolCandidate,
        SymbolLocation,
    },
    picker::{
        PickerSession,
        PickerView,
    },
    search::SourceBucket,
};

const THUMBNAIL: f32 = 120.0;

pub enum PickerAction {
    Home,
    SavedAs(PathBuf),
}

enum Intent {
    SwitchTerm(String),
    Refresh,
    Flaticon,
    Select(usize),
    Pick(usize),
    Prev,
    Next,
    GoTo,
    Save,
    SaveAs,
    Home,
}

/// URIs handed to the image loaders while showing one search generation.
#[derive(Default)]
struct LoadedImages {
    generation: u64,
    uris: Vec<String>,
}

impl LoadedImages {
    /// Switches to `generation` and returns the URIs loaded for the previous
    /// one, which the caller should evict.
    fn advance(&mut self, generation: u64) -> Vec<String> {
        if generation == self.generation {
            return Vec::new();
        }
        self.generation = generation;
        mem::take(&mut self.uris)
    }

    fn track(&mut self, uri: String) -> String {
        if !self.uris.contains(&uri) {
            self.uris.push(uri.clone());
        }
        uri
    }
}

/// Text fields of the picker page. Cleared whenever the entry changes.
#[derive(Default)]
pub struct PickerPage {
    shown_entry: Option<usize>,
    custom_query: String,
    go_to: String,
    images: LoadedImages,
}

impl PickerPage {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        session: &mut PickerSession,
        tasks: &TaskManager,
        notices: &mut NoticeModal,
    ) -> Option<PickerAction> {
        let index = session.deck().current_index();
        if self.shown_entry != Some(index) {
            self.shown_entry = Some(index);
            self.custom_query.clear();
            self.go_to = (index + 1).to_string();
        }

        // Stored picks reuse their filename, so cached textures must go too.
        for uri in self.images.advance(session.board().generation()) {
            ui.ctx().forget_image(&uri);
        }

        let mut intent = None;

        egui::TopBottomPanel::bottom("picker_navigation").show_inside(ui, |ui| {
            ui.add_space(4.0);
            self.navigation_bar(ui, session, &mut intent);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show_inside(ui, |ui| {
            self.search_header(ui, session, &mut intent);
            ui.separator();

            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                match session.view() {
                    PickerView::Existing(symbol) => {
                        let path = session.store().path_of(&symbol.filename);
                        let uri = self.images.track(format!("file://{}", path.display()));
                        ui.label("Current symbol:");
                        ui.add(
                            egui::Image::new(uri)
                                .fit_to_exact_size(egui::vec2(THUMBNAIL * 1.5, THUMBNAIL * 1.5)),
                        );
                        ui.label(format!("Name: {}", symbol.name));
                        let source = symbol.source.map_or("unknown", |s| s.label());
                        ui.label(format!("Source: {source}"));
                        ui.weak(&symbol.filename);
                        ui.add_space(8.0);
                        if ui.button("Update symbol").clicked() {
                            intent = Some(Intent::Refresh);
                        }
                    }
                    PickerView::Results => result_grid(ui, session, &mut self.images, &mut intent),
                }
            });
        });

        match intent? {
            Intent::SwitchTerm(term) => session.switch_term(&term, tasks),
            Intent::Refresh => session.refresh_with_query(&self.custom_query, tasks),
            Intent::Flaticon => {
                if let Err(e) = session.request_flaticon(tasks) {
                    notices.info(
                        "Flaticon unavailable",
                        format!("{e}. Set the FREEPIK_API_KEY environment variable or flaticon_api_key in settings.json."),
                    );
                }
            }
            Intent::Select(i) => {
                session.board_mut().select(i);
            }
            Intent::Pick(i) => match session.pick(i, tasks) {
                Ok(report) => {
                    if let Some(e) = report.autosave_error {
                        notices.error(
                            "Autosave failed",
                            "The symbol was recorded but the deck could not be written.",
                            Some(e.to_string()),
                        );
                    }
                    if report.reached_end {
                        notices.info("End of list", "That was the last entry in the deck.");
                    }
                }
                Err(e) => {
                    notices.error("Could not save symbol", e.to_string(), None::<String>);
                }
            },
            Intent::Prev => {
                session.prev(tasks);
            }
            Intent::Next => {
                if !session.next(tasks) {
                    notices.info("End of list", "You are at the last entry.");
                }
            }
            Intent::GoTo => {
                if let Err(e) = session.go_to(&self.go_to, tasks) {
                    notices.info("Invalid entry", e.to_string());
                }
            }
            Intent::Save => match session.deck_mut().save() {
                Ok(()) => notices.info(
                    "Saved",
                    format!("Progress saved to {}.", session.deck().output_filename()),
                ),
                Err(e) => notices.error("Save failed", e.to_string(), None::<String>),
            },
            Intent::SaveAs => {
                let Some(path) = FileDialog::new()
                    .add_filter("CSV files", &["csv"])
                    .set_file_name(session.deck().output_filename())
                    .save_file()
                else {
                    return None;
                };
                match session.deck_mut().save_as(path.clone()) {
                    Ok(()) => return Some(PickerAction::SavedAs(path)),
                    Err(e) => notices.error("Save failed", e.to_string(), None::<String>),
                }
            }
            Intent::Home => return Some(PickerAction::Home),
        }

        None
    }

    fn search_header(&mut self, ui: &mut egui::Ui, session: &PickerSession, intent: &mut Option<Intent>) {
        let entry = session.current_entry();
        ui.heading(entry.phrase.as_deref().unwrap_or(crate::core::terms::NO_WORD));

        let terms = session.terms();
        if terms.has_alternatives() {
            ui.horizontal_wrapped(|ui| {
                ui.label("Search for:");
                for term in terms.terms() {
                    let active = term == session.active_term();
                    if ui.selectable_label(active, term).clicked() && !active {
                        *intent = Some(Intent::SwitchTerm(term.clone()));
                    }
                }
            });
        }

        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.custom_query)
                    .hint_text("Custom search")
                    .desired_width(220.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Search").clicked() || submitted {
                *intent = Some(Intent::Refresh);
            }
            if ui.button("Refresh").clicked() {
                *intent = Some(Intent::Refresh);
            }
            if ui
                .add_enabled(session.can_request_flaticon(), egui::Button::new("Get Flaticon results"))
                .clicked()
            {
                *intent = Some(Intent::Flaticon);
            }
            if session.board().is_pending() {
                ui.add(egui::Spinner::new());
            }
        });
    }

    fn navigation_bar(&mut self, ui: &mut egui::Ui, session: &mut PickerSession, intent: &mut Option<Intent>) {
        ui.horizontal(|ui| {
            if ui.button("⏴ Prev").clicked() {
                *intent = Some(Intent::Prev);
            }

            let response =
                ui.add(egui::TextEdit::singleline(&mut self.go_to).desired_width(48.0));
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.label(format!("/ {}", session.deck().len()));
            if ui.button("Go").clicked() || submitted {
                *intent = Some(Intent::GoTo);
            }

            if ui.button("Next ⏵").clicked() {
                *intent = Some(Intent::Next);
            }

            ui.separator();
            ui.label(format!(
                "{} of {} done",
                session.deck().completed_count(),
                session.deck().len()
            ));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Home").clicked() {
                    *intent = Some(Intent::Home);
                }
                if ui.button("Save As…").clicked() {
                    *intent = Some(Intent::SaveAs);
                }
                if ui.button("Save").clicked() {
                    *intent = Some(Intent::Save);
                }

                let mut autosave = session.deck().autosave();
                if ui.checkbox(&mut autosave, "Autosave").changed() {
                    info!(autosave, "Autosave toggled");
                    session.deck_mut().set_autosave(autosave);
                }
                if session.deck().is_dirty() {
                    ui.weak("unsaved changes");
                }
            });
        });
    }
}

fn result_grid(
    ui: &mut egui::Ui,
    session: &PickerSession,
    images: &mut LoadedImages,
    intent: &mut Option<Intent>,
) {
    let board = session.board();
    if board.query().is_empty() {
        ui.label("This entry has no phrase to search for.");
        return;
    }
    if board.buckets().is_empty() {
        ui.label("No symbols found.");
        return;
    }

    let selected = board.selected_index();
    let mut offset = 0;
    for bucket in board.buckets() {
        bucket_header(ui, bucket);

        ui.horizontal_wrapped(|ui| {
            for (position, candidate) in bucket.candidates.iter().enumerate() {
                let index = offset + position;
                let uri = image_uri(board.generation(), position, candidate).map(|u| images.track(u));
                let response = candidate_button(ui, uri, candidate, selected == Some(index));
                if response.double_clicked() {
                    *intent = Some(Intent::Pick(index));
                } else if response.clicked() {
                    *intent = Some(Intent::Select(index));
                }
            }
        });
        offset += bucket.candidates.len();
        ui.add_space(6.0);
    }

    ui.separator();
    ui.horizontal(|ui| {
        let chosen = board.selected();
        if let Some(candidate) = chosen {
            ui.label(format!("Selected: {} ({})", candidate.name, candidate.source));
        }
        if ui.add_enabled(chosen.is_some(), egui::Button::new("Use this symbol")).clicked() {
            if let Some(index) = selected {
                *intent = Some(Intent::Pick(index));
            }
        }
    });
}

fn bucket_header(ui: &mut egui::Ui, bucket: &SourceBucket) {
    ui.horizontal(|ui| {
        ui.strong(bucket.source.label());
        if bucket.pending {
            ui.add(egui::Spinner::new().size(12.0));
        }
        if let Some(error) = &bucket.error {
            ui.colored_label(egui::Color32::RED, error);
        } else if !bucket.pending && bucket.candidates.is_empty() {
            ui.weak("no results");
        }
    });
}

/// Loader URI for a candidate's thumbnail, if it has anything to show.
fn image_uri(generation: u64, position: usize, candidate: &SymbolCandidate) -> Option<String> {
    match (&candidate.location, &candidate.preview) {
        (SymbolLocation::Local(path), _) => Some(format!("file://{}", path.display())),
        (SymbolLocation::Remote(_), Some(_)) => {
            Some(preview_uri(generation, candidate.source, position))
        }
        (SymbolLocation::Remote(_), None) => None,
    }
}

fn candidate_button(
    ui: &mut egui::Ui,
    uri: Option<String>,
    candidate: &SymbolCandidate,
    selected: bool,
) -> egui::Response {
    let size = egui::vec2(THUMBNAIL, THUMBNAIL);
    let image = uri.map(|uri| match &candidate.preview {
        Some(bytes) => egui::Image::from_bytes(uri, bytes.clone()),
        None => egui::Image::new(uri),
    });

    ui.vertical(|ui| {
        ui.set_width(THUMBNAIL + 8.0);
        let response = match image {
            Some(image) => ui.add(
                egui::Button::image(image.fit_to_exact_size(size)).selected(selected),
            ),
            None => ui.add_sized(size, egui::Button::new("…").selected(selected)),
        };
        ui.add(egui::Label::new(egui::RichText::new(&candidate.name).small()).truncate());
        response
    })
    .inner
    .on_hover_text(&candidate.name)
}

/// Remote previews are registered with the image loader under a URI that
/// is unique per search and ends in `.png` so the right decoder is chosen.
fn preview_uri(generation: u64, source: SourceKind, position: usize) -> String {
    format!("bytes://{generation}/{}/{position}.png", source.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_uris_differ_between_searches() {
        let first = preview_uri(1, SourceKind::Arasaac, 0);
        let second = preview_uri(2, SourceKind::Arasaac, 0);
        assert_ne!(first, second);
        assert!(first.ends_with(".png"));
        assert_eq!(preview_uri(3, SourceKind::Flaticon, 2), "bytes://3/Flaticon/2.png");
    }

    #[test]
    fn previous_generation_images_are_released() {
        let mut images = LoadedImages::default();
        assert!(images.advance(1).is_empty());
        images.track(preview_uri(1, SourceKind::Arasaac, 0));
        images.track("file://selected_symbols/dog_Mulberry_dog.svg".to_string());
        images.track("file://selected_symbols/dog_Mulberry_dog.svg".to_string());

        // Redrawing the same search keeps everything loaded.
        assert!(images.advance(1).is_empty());

        let stale = images.advance(2);
        assert_eq!(
            stale,
            vec![
                "bytes://1/ARASAAC/0.png".to_string(),
                "file://selected_symbols/dog_Mulberry_dog.svg".to_string(),
            ]
        );
        assert!(images.advance(3).is_empty());
    }

    #[test]
    fn remote_candidates_without_preview_have_no_image() {
        let remote = SymbolCandidate::remote("dog", SourceKind::Flaticon, "https://cdn.example/1.png");
        assert_eq!(image_uri(4, 0, &remote), None);
        assert_eq!(
            image_uri(4, 1, &remote.with_preview(vec![1, 2, 3])).as_deref(),
            Some("bytes://4/Flaticon/1.png")
        );
    }
}
