//! Main application state

use std::time::Duration;

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

use crate::api::{self, CatalogClient, Lookup};
use crate::fetch::{FetchController, FetchState};
use crate::ui;

/// Artificial pre-request delay. A development aid that makes loading and
/// refetching states observable; not load-bearing, tests run without it.
const NETWORK_DELAY: Duration = Duration::from_millis(1000);

/// Main application state
pub struct DexApp {
    /// Live text being typed
    pub input: String,
    /// Committed search term, updated only on submit
    term: String,
    /// Catalog API client
    client: CatalogClient,
    /// Lookup lifecycle state machine
    pub(crate) controller: FetchController<Lookup>,
    /// Uploaded sprite texture for the held entry
    pub(crate) artwork: Option<TextureHandle>,
    /// Entry name the texture belongs to
    artwork_key: Option<String>,
}

impl DexApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            input: String::new(),
            term: String::new(),
            client: CatalogClient::default(),
            controller: FetchController::new(NETWORK_DELAY),
            artwork: None,
            artwork_key: None,
        }
    }

    /// Commit the live input as the search term and re-evaluate the lookup
    pub fn submit_search(&mut self) {
        self.term = self.input.clone();
        tracing::info!("Search submitted: {:?}", self.term);

        let locator = api::locator_for(&self.term);
        let client = self.client.clone();
        self.controller
            .set_locator(&locator, move |url| async move { client.lookup(url).await });
    }

    /// Keep the uploaded sprite texture in sync with the held entry
    fn sync_artwork(&mut self, ctx: &egui::Context) {
        let Some(lookup) = self.controller.state().value() else {
            self.artwork = None;
            self.artwork_key = None;
            return;
        };

        if self.artwork_key.as_deref() == Some(lookup.entry.name.as_str()) {
            return;
        }
        self.artwork_key = Some(lookup.entry.name.clone());
        self.artwork = lookup
            .artwork
            .as_deref()
            .and_then(decode_artwork)
            .map(|img| ctx.load_texture("artwork", img, TextureOptions::LINEAR));
    }
}

impl eframe::App for DexApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll the outstanding lookup
        if self.controller.poll()
            && matches!(self.controller.state(), FetchState::Succeeded { .. })
        {
            // Convenience from the original: a fresh result clears the box
            self.input.clear();
        }
        if self.controller.in_flight() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.sync_artwork(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui::render_search_bar(self, ui);
                ui.add_space(16.0);
                ui::render_result(self, ui);
            });
        });
    }
}

/// Decode sprite bytes into an egui image. PNG is what the catalog serves;
/// anything that fails to decode just renders without artwork.
fn decode_artwork(bytes: &[u8]) -> Option<ColorImage> {
    let image = match image::load_from_memory(bytes) {
        Ok(image) => image.into_rgba8(),
        Err(e) => {
            tracing::debug!("Artwork decode failed: {e}");
            return None;
        }
    };
    let size = [image.width() as usize, image.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_artwork_handles_a_valid_png() {
        let mut png = Vec::new();
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        image
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageFormat::Png,
            )
            .unwrap();

        let decoded = decode_artwork(&png).unwrap();
        assert_eq!(decoded.size, [2, 2]);
    }

    #[test]
    fn decode_artwork_rejects_garbage_quietly() {
        assert!(decode_artwork(b"definitely not a png").is_none());
    }
}
