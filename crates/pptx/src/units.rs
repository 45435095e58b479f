//! Unit conversion into DrawingML integers.

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// English Metric Units per point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Convert a position in inches to EMU.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Convert an extent in inches to EMU. Extents are never negative.
pub fn extent_to_emu(inches: f64) -> i64 {
    inches_to_emu(inches).max(0)
}

/// Convert a line thickness in points to EMU.
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT).round().max(0.0) as i64
}

/// Font size in hundredths of a point, clamped to the range DrawingML accepts.
pub fn font_size_to_centipoints(points: f64) -> u32 {
    (points * 100.0).round().clamp(100.0, 400_000.0) as u32
}

/// Baseline shift in thousandths of a percent.
pub fn baseline_to_drawingml(percent: i32) -> i32 {
    percent.saturating_mul(1000)
}
