mod app;
mod confirm_modal;
mod notice_modal;
mod picker_page;
mod start_page;

use eframe::egui;

pub use app::PickerApp;

use crate::core::settings::SettingsData;

pub fn run(settings: SettingsData) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PictoPick")
            .with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PictoPick",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(PickerApp::new(cc, settings)?))
        }),
    )
}
