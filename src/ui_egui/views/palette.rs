use egui::Color32;

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Colors for the day schedule canvas, derived from the active visuals.
#[derive(Clone, Copy)]
pub(crate) struct SchedulePalette {
    pub grid_bg: Color32,
    pub hour_line: Color32,
    pub half_hour_line: Color32,
    pub hour_label: Color32,
    pub block_fill: Color32,
    pub block_border: Color32,
    pub block_text: Color32,
    pub selected_border: Color32,
    pub ghost_fill: Color32,
    pub preview_fill: Color32,
    pub preview_border: Color32,
    pub conflict_fill: Color32,
    pub conflict_border: Color32,
    pub now_line: Color32,
}

impl SchedulePalette {
    pub fn from_ui(ui: &egui::Ui) -> Self {
        let visuals = ui.visuals();
        let accent = visuals.selection.bg_fill;
        let conflict = Color32::from_rgb(220, 70, 70);

        if visuals.dark_mode {
            Self {
                grid_bg: visuals.extreme_bg_color,
                hour_line: Color32::from_gray(70),
                half_hour_line: Color32::from_gray(45),
                hour_label: Color32::from_gray(150),
                block_fill: Color32::from_rgb(45, 80, 140),
                block_border: Color32::from_rgb(90, 140, 220),
                block_text: Color32::from_gray(235),
                selected_border: Color32::from_rgb(250, 200, 80),
                ghost_fill: with_alpha(Color32::from_rgb(45, 80, 140), 70),
                preview_fill: with_alpha(accent, 150),
                preview_border: accent,
                conflict_fill: with_alpha(conflict, 110),
                conflict_border: conflict,
                now_line: Color32::from_rgb(240, 90, 90),
            }
        } else {
            Self {
                grid_bg: Color32::from_gray(252),
                hour_line: Color32::from_gray(210),
                half_hour_line: Color32::from_gray(235),
                hour_label: Color32::from_gray(110),
                block_fill: Color32::from_rgb(210, 228, 252),
                block_border: Color32::from_rgb(80, 130, 210),
                block_text: Color32::from_rgb(25, 40, 70),
                selected_border: Color32::from_rgb(210, 140, 20),
                ghost_fill: with_alpha(Color32::from_rgb(210, 228, 252), 110),
                preview_fill: with_alpha(accent, 120),
                preview_border: accent,
                conflict_fill: with_alpha(conflict, 70),
                conflict_border: conflict,
                now_line: Color32::from_rgb(220, 50, 50),
            }
        }
    }
}
