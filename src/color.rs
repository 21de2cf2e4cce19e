use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Histogram colours
// ---------------------------------------------------------------------------

pub const MEAN_COLOR: Color32 = Color32::from_rgb(220, 50, 47);
pub const MEDIAN_COLOR: Color32 = Color32::from_rgb(60, 170, 80);

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// `n` bar colours running from light to deep blue, so higher booking
/// counts read darker.
pub fn bucket_gradient(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let span = (n - 1).max(1) as f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / span;
            hsl_to_color32(205.0 + 20.0 * t, 0.70, 0.72 - 0.32 * t)
        })
        .collect()
}

/// Stands apart from the gradient.
pub fn overflow_color() -> Color32 {
    hsl_to_color32(28.0, 0.85, 0.55)
}
