use std::collections::VecDeque;

use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct Notice {
    kind: NoticeKind,
    title: String,
    message: String,
    details: Option<String>,
}

/// Queue of messages shown one at a time in a modal dialog.
pub struct NoticeModal {
    queue: VecDeque<Notice>,
}

impl NoticeModal {
    pub fn new() -> Self {
        Self { queue: VecDeque::new() }
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.queue.push_back(Notice {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
            details: None,
        });
    }

    pub fn error(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        details: Option<impl Into<String>>,
    ) {
        self.queue.push_back(Notice {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
            details: details.map(|d| d.into()),
        });
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.queue.front() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("notice_modal")).show(ctx, |ui| {
            ui.set_width(420.0);

            ui.horizontal(|ui| {
                let (icon, color) = match notice.kind {
                    NoticeKind::Info => ("ℹ", ui.visuals().hyperlink_color),
                    NoticeKind::Error => ("⚠", egui::Color32::RED),
                };
                ui.label(egui::RichText::new(icon).size(22.0).color(color));
                ui.label(egui::RichText::new(&notice.title).size(18.0).strong());
            });

            ui.add_space(10.0);
            ui.label(&notice.message);

            if let Some(details) = &notice.details {
                ui.add_space(10.0);
                ui.collapsing("Details", |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut details.as_str())
                            .desired_width(f32::INFINITY)
                            .desired_rows(4)
                            .code_editor(),
                    );
                });
            }

            ui.add_space(15.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("OK").clicked() {
                    ui.close();
                }
            });
        });

        if modal.should_close() {
            self.queue.pop_front();
        }
    }
}

impl Default for NoticeModal {
    fn default() -> Self {
        Self::new()
    }
}
