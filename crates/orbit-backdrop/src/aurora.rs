//! Aurora wash along the top of the sky (stateless).

use orbit_core::{AnimationSpeed, Rgb};

use crate::chars::{AURORA_CHARS, by_intensity};

/// Milliseconds per aurora drift cycle at medium speed.
const WAVE_PERIOD_MS: f32 = 24_000.0;

const DEEP_GREEN: Rgb = Rgb::new(0x0b, 0x3a, 0x2b);
const DEEP_BLUE: Rgb = Rgb::new(0x07, 0x1d, 0x3f);
const DEEP_BROWN: Rgb = Rgb::new(0x2b, 0x18, 0x0f);

/// Aurora glyph and color for a cell, or `None` where the sky is clear.
pub fn aurora_cell(
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    elapsed_ms: u64,
    speed: AnimationSpeed,
) -> Option<(char, Rgb)> {
    let x_norm = x as f32 / width.max(1) as f32;
    let y_norm = y as f32 / height.max(1) as f32;

    let scaled_ms = elapsed_ms as f32 * speed.time_scale();
    let time_phase = (scaled_ms % WAVE_PERIOD_MS) / WAVE_PERIOD_MS;
    let tau = std::f32::consts::TAU;

    // Overlapping curtains drifting at different rates.
    let wave1 = ((x_norm * 3.0 + time_phase * tau).sin() + 1.0) / 2.0;
    let wave2 = ((x_norm * 5.0 - time_phase * 0.75 * tau + 1.0).sin() + 1.0) / 2.0;
    let wave3 = ((x_norm * 2.0 + time_phase * 0.5 * tau + 2.0).sin() + 1.0) / 2.0;
    let combined = wave1 * 0.5 + wave2 * 0.3 + wave3 * 0.2;

    // Only the upper part of the sky glows.
    let vertical = (1.0 - y_norm * 1.8).max(0.0);
    let intensity = combined * vertical;

    if intensity < 0.3 {
        return None;
    }

    let hue_phase = (time_phase + x_norm * 0.5).fract();
    let color = if hue_phase < 0.5 {
        DEEP_GREEN.lerp(DEEP_BLUE, hue_phase * 2.0)
    } else {
        DEEP_BLUE.lerp(DEEP_BROWN, (hue_phase - 0.5) * 2.0)
    };

    let normalized = (intensity - 0.3) / 0.7;
    Some((by_intensity(AURORA_CHARS, normalized), color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_half_is_clear() {
        for x in 0..80 {
            for y in 12..24 {
                assert!(aurora_cell(x, y, 80, 24, 5_000, AnimationSpeed::Medium).is_none());
            }
        }
    }

    #[test]
    fn test_top_rows_glow_somewhere() {
        let lit = (0..80)
            .filter(|&x| aurora_cell(x, 0, 80, 24, 0, AnimationSpeed::Medium).is_some())
            .count();
        assert!(lit > 0);
    }
}
