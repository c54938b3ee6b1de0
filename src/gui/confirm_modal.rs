use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Yes,
    No,
    Cancel,
}

struct Prompt<T> {
    purpose: T,
    title: String,
    message: String,
    with_cancel: bool,
}

/// A single pending question. `T` tells the caller what the answer is for.
pub struct ConfirmModal<T> {
    prompt: Option<Prompt<T>>,
}

impl<T> ConfirmModal<T> {
    pub fn new() -> Self {
        Self { prompt: None }
    }

    /// Yes/No question.
    pub fn ask(&mut self, purpose: T, title: impl Into<String>, message: impl Into<String>) {
        self.prompt = Some(Prompt {
            purpose,
            title: title.into(),
            message: message.into(),
            with_cancel: false,
        });
    }

    /// Yes/No/Cancel question.
    pub fn ask_with_cancel(
        &mut self,
        purpose: T,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.prompt = Some(Prompt {
            purpose,
            title: title.into(),
            message: message.into(),
            with_cancel: true,
        });
    }

    /// Returns the answer once the user has given one. Closing the dialog
    /// any other way counts as Cancel (or No without a Cancel button).
    pub fn show(&mut self, ctx: &egui::Context) -> Option<(T, ConfirmChoice)> {
        let prompt = self.prompt.as_ref()?;
        let mut choice = None;

        let modal = egui::Modal::new(egui::Id::new("confirm_modal")).show(ctx, |ui| {
            ui.set_width(400.0);
            ui.label(egui::RichText::new(&prompt.title).size(18.0).strong());
            ui.add_space(10.0);
            ui.label(&prompt.message);
            ui.add_space(15.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if prompt.with_cancel && ui.button("Cancel").clicked() {
                    choice = Some(ConfirmChoice::Cancel);
                }
                if ui.button("No").clicked() {
                    choice = Some(ConfirmChoice::No);
                }
                if ui.button("Yes").clicked() {
                    choice = Some(ConfirmChoice::Yes);
                }
            });
        });

        if choice.is_none() && modal.should_close() {
            choice =
                Some(if prompt.with_cancel { ConfirmChoice::Cancel } else { ConfirmChoice::No });
        }

        let choice = choice?;
        self.prompt.take().map(|prompt| (prompt.purpose, choice))
    }
}

impl<T> Default for ConfirmModal<T> {
    fn default() -> Self {
        Self::new()
    }
}
