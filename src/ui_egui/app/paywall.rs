//! Upgrade prompt shown in place of Pro-only features.

use super::TimeboxApp;
use crate::models::user::UserSession;
use crate::services::billing::checkout_url;
use egui::RichText;

impl TimeboxApp {
    pub(super) fn render_paywall(&mut self, ui: &mut egui::Ui, session: &UserSession) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("🔒 Note content is a Pro feature").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Upgrade to write and keep notes for every time block.").weak());
                ui.add_space(8.0);
                if ui.button("Upgrade to Pro").clicked() {
                    self.open_checkout(session);
                }
                ui.add_space(8.0);
            });
        });
    }

    fn open_checkout(&mut self, session: &UserSession) {
        let url = match checkout_url(&self.config.billing.checkout_url, session) {
            Ok(url) => url,
            Err(err) => {
                log::error!("Cannot build checkout URL: {:#}", err);
                self.toasts.error(format!("Checkout unavailable: {}", err));
                return;
            }
        };
        log::info!("Opening checkout for user {}", session.id);
        if let Err(err) = webbrowser::open(&url) {
            log::error!("Failed to open browser: {}", err);
            self.toasts.error("Could not open the browser");
        }
    }
}
