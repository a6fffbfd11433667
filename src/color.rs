use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale for correlation heatmaps
// ---------------------------------------------------------------------------

/// Map a correlation coefficient in [-1, 1] to a blue → white → red scale.
/// NaN (degenerate pairs) renders gray.
pub fn correlation_color(r: f64) -> Color32 {
    if r.is_nan() {
        return Color32::GRAY;
    }
    let r = r.clamp(-1.0, 1.0) as f32;

    let blue = LinSrgb::new(0.13_f32, 0.28, 0.76);
    let white = LinSrgb::new(1.0_f32, 1.0, 1.0);
    let red = LinSrgb::new(0.79_f32, 0.11, 0.14);

    let mixed = if r < 0.0 {
        white.mix(blue, -r)
    } else {
        white.mix(red, r)
    };
    let srgb: Srgb = Srgb::from_linear(mixed);
    Color32::from_rgb(
        (srgb.red * 255.0).round() as u8,
        (srgb.green * 255.0).round() as u8,
        (srgb.blue * 255.0).round() as u8,
    )
}

/// Text colour readable on top of a heatmap cell: dark on the pale middle of
/// the scale, light towards the saturated ends.
pub fn correlation_text_color(r: f64) -> Color32 {
    if r.is_nan() || r.abs() < 0.6 {
        Color32::DARK_GRAY
    } else {
        Color32::WHITE
    }
}
