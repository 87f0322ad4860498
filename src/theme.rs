use egui::{Color32, CornerRadius, Stroke};

/// Colours for one light/dark mode.
pub struct AppTheme {
    pub background: Color32,
    pub card_background: Color32,
    pub comment_background: Color32,
    pub text: Color32,
    pub secondary_text: Color32,
    pub highlight: Color32,
    pub separator: Color32,
    pub error: Color32,
    button: Color32,
    button_hovered: Color32,
    // Score tiers: >= 300, >= 100, below.
    scores: [Color32; 3],
}

impl AppTheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(22, 22, 24),
            card_background: Color32::from_rgb(34, 34, 37),
            comment_background: Color32::from_rgb(44, 44, 48),
            text: Color32::from_rgb(236, 236, 236),
            secondary_text: Color32::from_rgb(168, 168, 172),
            highlight: Color32::from_rgb(255, 102, 0),
            separator: Color32::from_rgb(64, 64, 68),
            error: Color32::from_rgb(239, 83, 80),
            button: Color32::from_rgb(58, 58, 62),
            button_hovered: Color32::from_rgb(76, 76, 82),
            scores: [
                Color32::from_rgb(102, 187, 106),
                Color32::from_rgb(255, 202, 40),
                Color32::from_rgb(150, 150, 150),
            ],
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(246, 246, 239),
            card_background: Color32::WHITE,
            comment_background: Color32::from_rgb(240, 240, 232),
            text: Color32::from_rgb(24, 24, 24),
            secondary_text: Color32::from_rgb(110, 110, 110),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(214, 214, 206),
            error: Color32::from_rgb(198, 40, 40),
            button: Color32::from_rgb(232, 232, 226),
            button_hovered: Color32::from_rgb(214, 214, 206),
            scores: [
                Color32::from_rgb(46, 125, 50),
                Color32::from_rgb(191, 134, 0),
                Color32::from_rgb(96, 96, 96),
            ],
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;

        visuals.panel_fill = self.background;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);
        visuals.selection.bg_fill = self.highlight;

        for (widget, fill) in [
            (&mut visuals.widgets.inactive, self.button),
            (&mut visuals.widgets.hovered, self.button_hovered),
            (&mut visuals.widgets.active, self.highlight),
        ] {
            widget.bg_fill = fill;
            widget.weak_bg_fill = fill;
            widget.fg_stroke = Stroke::new(1.0, self.text);
            widget.corner_radius = CornerRadius::same(4);
        }

        ctx.set_style(style);
    }

    pub fn score_color(&self, score: i64) -> Color32 {
        let tier = match score {
            s if s >= 300 => 0,
            s if s >= 100 => 1,
            _ => 2,
        };
        self.scores[tier]
    }
}
