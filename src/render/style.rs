use serde::{Deserialize, Serialize};

/// 8-bit RGB color, independent of any drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Gray at `level` in [0, 1], 0 black and 1 white.
    pub fn gray(level: f64) -> Rgb {
        let v = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb(v, v, v)
    }
}

impl From<Rgb> for plotters::style::RGBColor {
    fn from(c: Rgb) -> Self {
        plotters::style::RGBColor(c.0, c.1, c.2)
    }
}

/// Visual settings for one figure.
///
/// Passed to every draw call instead of being set process-wide, so two figures in
/// the same process can differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureStyle {
    pub dpi: f64,
    pub font_family: String,
    pub background: Rgb,
    /// Painted under every cell; shows through where a value is missing
    pub missing_fill: Rgb,
    pub light_text: Rgb,
    pub dark_text: Rgb,
    pub tick_font_pt: f64,
    pub title_font_pt: f64,
    pub title_line_spacing: f64,
    /// Cell label size when the largest value needs three or more digits
    pub wide_value_font_pt: f64,
    pub value_font_pt: f64,
    pub x_ticks_on_top: bool,
}

impl FigureStyle {
    /// Style for the annotated heatmap.
    pub fn heatmap() -> Self {
        Self {
            dpi: 130.0,
            font_family: "sans-serif".to_string(),
            background: Rgb::WHITE,
            missing_fill: Rgb::gray(0.7),
            light_text: Rgb::WHITE,
            dark_text: Rgb::BLACK,
            tick_font_pt: 9.0,
            title_font_pt: 11.0,
            title_line_spacing: 1.5,
            wide_value_font_pt: 9.0,
            value_font_pt: 10.0,
            x_ticks_on_top: true,
        }
    }

    /// Style for the plain mesh: default figure resolution, ticks at the bottom.
    pub fn mesh() -> Self {
        Self {
            dpi: 100.0,
            x_ticks_on_top: false,
            ..Self::heatmap()
        }
    }

    /// Convert typographic points to pixels at this figure's resolution.
    pub fn px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self::heatmap()
    }
}
