//! Top bar with the signed-in user and plan badge.

use super::TimeboxApp;
use crate::models::user::UserSession;
use crate::services::billing::has_pro_access;
use egui::{Color32, RichText};

impl TimeboxApp {
    pub(super) fn render_header(&mut self, ctx: &egui::Context, session: &UserSession) {
        let is_pro = has_pro_access(self.store.subscription(&session.id));
        let mut sign_out = false;

        egui::TopBottomPanel::top("header")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(RichText::new("Timebox Notes").strong().size(16.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.auth.is_some() && ui.button("Sign out").clicked() {
                            sign_out = true;
                        }
                        if is_pro {
                            ui.label(
                                RichText::new(" PRO ")
                                    .strong()
                                    .color(Color32::WHITE)
                                    .background_color(Color32::from_rgb(124, 58, 237)),
                            );
                        }
                        ui.label(format!("Hi, {}", session.display_name()));
                    });
                });
            });

        if sign_out {
            self.sign_out();
        }
    }
}
