//! Conversions from WordprocessingML's native units.
//!
//! The decoder stores raw values; these helpers are for consumers (and for
//! the few places where the model exposes normalized values, such as border
//! widths and font sizes in points).

/// Twentieths of a point per point.
pub const TWIPS_PER_POINT: f64 = 20.0;
/// Twips per inch.
pub const TWIPS_PER_INCH: f64 = 1440.0;
/// English Metric Units per inch.
pub const EMUS_PER_INCH: f64 = 914_400.0;
/// English Metric Units per point.
pub const EMUS_PER_POINT: f64 = 12_700.0;
/// English Metric Units per centimetre.
pub const EMUS_PER_CM: f64 = 360_000.0;
/// English Metric Units per CSS pixel (96 DPI).
pub const EMUS_PER_PIXEL: f64 = 9_525.0;

/// Twips (1/20 pt) to points.
pub fn twips_to_points(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_POINT
}

/// Twips to inches.
pub fn twips_to_inches(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_INCH
}

/// Points to twips, rounded to the nearest twip.
pub fn points_to_twips(points: f64) -> i64 {
    (points * TWIPS_PER_POINT).round() as i64
}

/// Half-points (font sizes) to points.
pub fn half_points_to_points(half_points: u32) -> f64 {
    half_points as f64 / 2.0
}

/// Eighths of a point (border widths) to points.
pub fn eighth_points_to_points(eighths: u32) -> f64 {
    eighths as f64 / 8.0
}

/// EMUs to points.
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_POINT
}

/// EMUs to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH
}

/// EMUs to centimetres.
pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_CM
}

/// EMUs to pixels at 96 DPI.
pub fn emu_to_pixels(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PIXEL
}

/// Fiftieths of a percent (`pct` widths) to percent.
pub fn fiftieths_to_percent(fiftieths: i64) -> f64 {
    fiftieths as f64 / 50.0
}
