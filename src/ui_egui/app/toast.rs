//! Short-lived status messages in the bottom-right corner.

use egui::{Color32, Context, Pos2, RichText};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

impl ToastLevel {
    fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Success => "✓",
            ToastLevel::Info => "ℹ",
            ToastLevel::Error => "✗",
        }
    }

    fn colors(&self, dark: bool) -> (Color32, Color32) {
        match (self, dark) {
            (ToastLevel::Success, true) => (Color32::from_rgb(30, 70, 40), Color32::from_rgb(100, 220, 120)),
            (ToastLevel::Info, true) => (Color32::from_rgb(30, 50, 80), Color32::from_rgb(100, 180, 255)),
            (ToastLevel::Error, true) => (Color32::from_rgb(80, 30, 30), Color32::from_rgb(255, 120, 120)),
            (ToastLevel::Success, false) => (Color32::from_rgb(220, 255, 220), Color32::from_rgb(30, 120, 50)),
            (ToastLevel::Info, false) => (Color32::from_rgb(220, 235, 255), Color32::from_rgb(30, 80, 150)),
            (ToastLevel::Error, false) => (Color32::from_rgb(255, 220, 220), Color32::from_rgb(180, 40, 40)),
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    level: ToastLevel,
    created_at: Instant,
}

const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toasts.push(Toast {
            message: message.into(),
            level,
            created_at: Instant::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.add(message, ToastLevel::Success);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(message, ToastLevel::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(message, ToastLevel::Error);
    }

    pub fn render(&mut self, ctx: &Context) {
        self.toasts.retain(|t| t.created_at.elapsed() < TOAST_LIFETIME);
        if self.toasts.is_empty() {
            return;
        }
        ctx.request_repaint_after(Duration::from_millis(250));

        let dark = ctx.style().visuals.dark_mode;
        let screen = ctx.screen_rect();
        let (width, height, margin) = (300.0, 40.0, 10.0);

        for (i, toast) in self.toasts.iter().enumerate() {
            let pos = Pos2::new(
                screen.right() - width - margin,
                screen.bottom() - (height + 5.0) * (i as f32 + 1.0) - margin,
            );
            let (bg, fg) = toast.level.colors(dark);

            egui::Area::new(egui::Id::new(("toast", i)))
                .fixed_pos(pos)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(bg)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                        .show(ui, |ui| {
                            ui.set_min_width(width - 24.0);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(toast.level.icon()).color(fg).strong());
                                ui.label(RichText::new(&toast.message).color(fg));
                            });
                        });
                });
        }
    }
}
