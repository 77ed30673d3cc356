// DSP utilities - output hygiene for the real-time mix

/// Flush denormals to zero
///
/// Values very close to 0 can slow some CPUs down considerably.
/// Threshold: 1e-15, far below 32-bit float noise.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping with tanh
///
/// Keeps the sum of overlapping tones inside [-1, 1] without a hard edge.
/// Near 0 the curve is almost linear, so a single quiet tone is unchanged.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}
