//! English Metric Units and the fixed 4:3 slide size.

/// Length in English Metric Units.
pub type Emu = i64;

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_PT: i64 = 12_700;

/// 10 in wide.
pub const SLIDE_WIDTH: Emu = 9_144_000;
/// 7.5 in high.
pub const SLIDE_HEIGHT: Emu = 6_858_000;

#[inline]
pub fn inches(v: f64) -> Emu {
    (v * EMU_PER_INCH as f64).round() as Emu
}

#[inline]
pub fn emu_to_inches(emu: Emu) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

#[inline]
pub fn points(pt: f64) -> Emu {
    (pt * EMU_PER_PT as f64).round() as Emu
}

/// Width in canvas pixels (96 dpi) of a length on the slide.
#[inline]
pub fn emu_to_px(emu: Emu) -> f32 {
    (emu_to_inches(emu) * 96.0) as f32
}
