//! Result view rendering.
//!
//! Maps the fetch state to mutually exclusive views: a prompt, a loading
//! indicator, an error line, or the entry itself (name, artwork over the
//! diagonal background, badge row, and an updating notice while refetching).

use eframe::egui::{
    self, Align2, Color32, FontId, Rect, RichText, Sense, Shape, Stroke, TextureHandle, Vec2, pos2,
};

use crate::api::Lookup;
use crate::app::DexApp;
use crate::category::Category;
use crate::fetch::FetchState;

/// Artwork box edge, matching the original 400x400 layout
const ARTWORK_SIZE: f32 = 400.0;

/// Pick the two diagonal background colors for a category list in slot
/// order. One tag fills both fields; zero tags leave both transparent.
pub fn background_pair(categories: &[Category]) -> (Color32, Color32) {
    match categories {
        [] => (Color32::TRANSPARENT, Color32::TRANSPARENT),
        [only] => (only.color(), only.color()),
        [first, second, ..] => (first.color(), second.color()),
    }
}

/// Render the view for the current fetch state
pub fn render_result(app: &DexApp, ui: &mut egui::Ui) {
    match app.controller.state() {
        FetchState::Uninitialized => {
            ui.label("Enter the name of a pokemon to start");
        }
        FetchState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Looking for Pokemon");
            });
        }
        FetchState::Failed { error } => {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Error!").strong());
                ui.label(error.to_string());
            });
        }
        FetchState::Succeeded { value } => render_entry(value, app.artwork.as_ref(), false, ui),
        FetchState::Refetching { previous } => render_entry(previous, app.artwork.as_ref(), true, ui),
    }
}

fn render_entry(lookup: &Lookup, artwork: Option<&TextureHandle>, refetching: bool, ui: &mut egui::Ui) {
    let categories = lookup.entry.categories();

    ui.label(RichText::new(&lookup.entry.name).size(20.0).strong());
    ui.add_space(6.0);

    // Artwork square over two diagonal color fields
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(ARTWORK_SIZE), Sense::hover());
    let painter = ui.painter_at(rect);
    let (upper, lower) = background_pair(&categories);
    painter.add(Shape::convex_polygon(
        vec![rect.left_top(), rect.right_top(), rect.left_bottom()],
        upper,
        Stroke::NONE,
    ));
    painter.add(Shape::convex_polygon(
        vec![rect.right_top(), rect.right_bottom(), rect.left_bottom()],
        lower,
        Stroke::NONE,
    ));
    if let Some(texture) = artwork {
        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    // One badge per category, in slot order
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        for category in &categories {
            render_badge(*category, ui);
        }
    });

    // Fixed-height notice slot so toggling it never shifts the layout
    let (notice_rect, _) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), 18.0), Sense::hover());
    if refetching {
        ui.painter().text(
            notice_rect.center(),
            Align2::CENTER_CENTER,
            "Updating Results...",
            FontId::proportional(13.0),
            ui.visuals().weak_text_color(),
        );
    }
}

fn render_badge(category: Category, ui: &mut egui::Ui) {
    egui::Frame::new()
        .fill(category.color())
        .corner_radius(3)
        .inner_margin(egui::Margin::symmetric(6, 3))
        .show(ui, |ui| {
            ui.label(
                RichText::new(category.name())
                    .color(Color32::WHITE)
                    .size(13.0),
            );
        });
}
