//! Glyphs used by the backdrop layers, ordered dimmest to brightest.

/// Star glyphs by brightness.
pub const STAR_CHARS: &[char] = &['.', '·', '+', '*', '✦'];

/// Orbit ring dots.
pub const ORBIT_CHARS: &[char] = &['·', '∙'];

/// Shooting-star tail, from the far end towards the head.
pub const COMET_TAIL_CHARS: &[char] = &['.', '·', '-', '─', '━'];

/// Shooting-star head.
pub const COMET_HEAD_CHAR: char = '●';

/// Planet body shading, from rim to core.
pub const PLANET_CHARS: &[char] = &['░', '▒', '▓', '█'];

/// Planet halo ring.
pub const HALO_CHAR: char = '·';

/// Aurora wash by intensity.
pub const AURORA_CHARS: &[char] = &['░', '▒'];

/// Pick the glyph for an intensity in 0.0-1.0.
pub fn by_intensity(chars: &[char], intensity: f32) -> char {
    let last = chars.len().saturating_sub(1);
    let idx = (intensity.clamp(0.0, 1.0) * chars.len() as f32) as usize;
    chars[idx.min(last)]
}
