//! Star field generation.
//!
//! Stars are laid out on a `G x G` grid (`G = ceil(sqrt(N))`) with each star
//! jittered inside its own cell, so the field is evenly spread without visible
//! grid lines. Stars inside an exclusion zone are kept but marked hidden.

use orbit_core::{ExclusionZone, PercentPoint, Rgb};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::color::STAR_PALETTE;

/// Number of colors each star cycles through.
pub const COLOR_CYCLE_LEN: usize = 5;

/// Seconds added to the animation delay per star index.
const DELAY_STEP_S: f32 = 0.18;

/// Lowest brightness reached by the twinkle pulse.
const MIN_BRIGHTNESS: f32 = 0.35;

/// A decorative star.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: usize,
    pub position: PercentPoint,
    /// Colors cycled through, in order, once per `twinkle_s`.
    pub colors: [Rgb; COLOR_CYCLE_LEN],
    /// Seconds before this star starts animating.
    pub delay_s: f32,
    /// Period of the brightness pulse.
    pub duration_s: f32,
    /// Period of one full trip through `colors`.
    pub twinkle_s: f32,
    /// Inside an exclusion zone; never drawn.
    pub hidden: bool,
}

impl Star {
    /// Color at `t` seconds after mount.
    pub fn color_at(&self, t: f32) -> Rgb {
        let phase = animation_phase(t, self.delay_s, self.twinkle_s);
        let scaled = phase * COLOR_CYCLE_LEN as f32;
        let idx = (scaled as usize).min(COLOR_CYCLE_LEN - 1);
        let next = (idx + 1) % COLOR_CYCLE_LEN;
        self.colors[idx].lerp(self.colors[next], scaled - idx as f32)
    }

    /// Brightness in `[MIN_BRIGHTNESS, 1.0]` at `t` seconds after mount.
    pub fn brightness_at(&self, t: f32) -> f32 {
        let phase = animation_phase(t, self.delay_s, self.duration_s);
        let wave = (phase * std::f32::consts::TAU).cos() * 0.5 + 0.5;
        MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * wave
    }
}

/// Fraction of the current loop, holding at 0 until the delay has passed.
fn animation_phase(t: f32, delay: f32, period: f32) -> f32 {
    if t <= delay || period <= 0.0 {
        return 0.0;
    }
    ((t - delay) / period).fract()
}

/// Side length of the placement grid for `count` stars.
pub fn grid_size(count: usize) -> usize {
    (count as f64).sqrt().ceil() as usize
}

/// Pick a star count in `[min, max]`.
pub fn star_count<R: Rng + ?Sized>(min: usize, max: usize, rng: &mut R) -> usize {
    rng.random_range(min..=max.max(min))
}

/// Generate exactly `count` stars, hiding those inside any of `zones`.
pub fn generate_stars<R: Rng + ?Sized>(
    count: usize,
    zones: &[ExclusionZone],
    rng: &mut R,
) -> Vec<Star> {
    let grid = grid_size(count).max(1);
    let cell = 100.0 / grid as f32;

    (0..count)
        .map(|idx| {
            let grid_x = idx % grid;
            let grid_y = idx / grid;

            let top = (grid_y as f32 * cell + rng.random::<f32>() * cell).min(100.0);
            let left = (grid_x as f32 * cell + rng.random::<f32>() * cell).min(100.0);
            let position = PercentPoint::new(top, left);

            let hidden = zones.iter().any(|zone| zone.contains(&position));

            let colors = std::array::from_fn(|_| pick_color(rng));

            Star {
                id: idx,
                position,
                colors,
                delay_s: idx as f32 * DELAY_STEP_S,
                duration_s: 6.0 + rng.random::<f32>() * 4.0,
                twinkle_s: 6.0 + rng.random::<f32>() * 6.0,
                hidden,
            }
        })
        .collect()
}

fn pick_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    STAR_PALETTE.choose(rng).copied().unwrap_or(STAR_PALETTE[0])
}
