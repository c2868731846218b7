//! Search bar rendering

use eframe::egui::{self, Key, TextEdit};

use crate::app::DexApp;

/// Render the input row: the live text field plus a Search button.
/// Pressing Enter in the field submits as well.
pub fn render_search_bar(app: &mut DexApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        let response = ui.add(
            TextEdit::singleline(&mut app.input)
                .hint_text("pokemon name")
                .desired_width(220.0),
        );

        let submitted_via_enter =
            response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        let submitted = ui.button("Search").clicked() || submitted_via_enter;

        if submitted {
            app.submit_search();
        }
        if submitted_via_enter {
            // Keep the keyboard workflow going
            response.request_focus();
        }
    });
}
