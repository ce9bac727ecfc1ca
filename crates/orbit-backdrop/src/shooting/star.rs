//! Shooting-star trajectories.

use std::fmt;

use orbit_config::ShootingStarsConfig;
use orbit_core::{Rgb, Viewport};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::registry::Keyframes;

/// Headings a shooting star may take, grouped by quadrant.
pub const CANDIDATE_ANGLES: [f32; 12] = [
    30.0, 45.0, 60.0, // from the top-left
    120.0, 135.0, 150.0, // from the top-right
    210.0, 225.0, 240.0, // from the bottom-right
    300.0, 315.0, 330.0, // from the bottom-left
];

/// Random deviation applied to the chosen heading, in degrees either way.
const ANGLE_JITTER_DEG: f32 = 5.0;

/// Distance outside the viewport edge where stars appear.
pub const SPAWN_OFFSET_PX: f32 = 20.0;

/// Flight length as a multiple of the viewport diagonal.
const TRAVEL_FACTOR: f32 = 1.5;

/// Speeds are configured in pixels per frame at this rate.
const FRAMES_PER_SECOND: f32 = 60.0;

/// Unique id of a shooting star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShootingStarId(pub u64);

impl fmt::Display for ShootingStarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Head and tail colors of a comet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CometColor {
    pub head: Rgb,
    pub tail: Rgb,
}

pub const COMET_COLORS: [CometColor; 2] = [
    // Silver
    CometColor {
        head: Rgb::new(213, 215, 215),
        tail: Rgb::new(213, 215, 215),
    },
    // Blue
    CometColor {
        head: Rgb::new(100, 180, 255),
        tail: Rgb::new(100, 180, 255),
    },
];

/// A transient shooting star. Positions are in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ShootingStar {
    pub id: ShootingStarId,
    pub start: (f32, f32),
    pub end: (f32, f32),
    /// Heading in degrees, clockwise from the positive x axis.
    pub angle_deg: f32,
    pub duration_ms: u64,
    pub color: CometColor,
    /// Tail length in pixels.
    pub tail_length: f32,
}

impl ShootingStar {
    /// Unique keyframe name for this star's flight.
    pub fn animation_name(&self) -> String {
        format!("shoot-{}", self.id)
    }

    /// The flight as a keyframe definition.
    pub fn keyframes(&self) -> Keyframes {
        Keyframes {
            from: self.start,
            to: self.end,
            angle_deg: self.angle_deg,
            scale_from: 1.0,
            scale_to: 1.5,
        }
    }

    /// Head position at `progress` (0.0-1.0) of the flight.
    pub fn position_at(&self, progress: f32) -> (f32, f32) {
        let sample = self.keyframes().sample(progress);
        (sample.x, sample.y)
    }
}

/// Whether `a` and `b` are less than `min_separation` degrees apart,
/// accounting for wrap-around.
fn too_close(a: f32, b: f32, min_separation: f32) -> bool {
    let diff = (a - b).abs();
    diff < min_separation || diff > 360.0 - min_separation
}

/// Pick a heading that keeps `min_separation` degrees from every live heading.
///
/// Live headings are rounded to the nearest 10 degrees first. When every
/// candidate is too close, any candidate may be used.
pub fn choose_angle<R: Rng + ?Sized>(live_angles: &[f32], min_separation: f32, rng: &mut R) -> f32 {
    let rounded: Vec<f32> = live_angles.iter().map(|a| (a / 10.0).round() * 10.0).collect();

    let available: Vec<f32> = CANDIDATE_ANGLES
        .iter()
        .copied()
        .filter(|&candidate| {
            !rounded
                .iter()
                .any(|&live| too_close(candidate, live, min_separation))
        })
        .collect();

    let options: &[f32] = if available.is_empty() {
        &CANDIDATE_ANGLES
    } else {
        &available
    };
    let base = options.choose(rng).copied().unwrap_or(CANDIDATE_ANGLES[0]);

    base + (rng.random::<f32>() - 0.5) * 2.0 * ANGLE_JITTER_DEG
}

/// Starting point just outside the viewport on a side the heading enters from.
fn spawn_point<R: Rng + ?Sized>(angle_deg: f32, viewport: &Viewport, rng: &mut R) -> (f32, f32) {
    let Viewport { width, height } = *viewport;
    let along_top_or_bottom = rng.random_bool(0.5);
    let x_along = rng.random::<f32>() * width;
    let y_along = rng.random::<f32>() * height;

    let left = -SPAWN_OFFSET_PX;
    let right = width + SPAWN_OFFSET_PX;
    let top = -SPAWN_OFFSET_PX;
    let bottom = height + SPAWN_OFFSET_PX;

    let angle = angle_deg.rem_euclid(360.0);
    let (vertical_edge, horizontal_edge) = if angle < 90.0 {
        (top, left)
    } else if angle < 180.0 {
        (top, right)
    } else if angle < 270.0 {
        (bottom, right)
    } else {
        (bottom, left)
    };

    if along_top_or_bottom {
        (x_along, vertical_edge)
    } else {
        (horizontal_edge, y_along)
    }
}

/// Build a shooting star that crosses the whole viewport.
///
/// `speed_scale` multiplies the configured speed range.
pub fn create_shooting_star<R: Rng + ?Sized>(
    id: ShootingStarId,
    live_angles: &[f32],
    viewport: &Viewport,
    config: &ShootingStarsConfig,
    speed_scale: f32,
    rng: &mut R,
) -> ShootingStar {
    let angle_deg = choose_angle(live_angles, config.min_angle_separation, rng);
    let start = spawn_point(angle_deg, viewport, rng);
    let color = COMET_COLORS.choose(rng).copied().unwrap_or(COMET_COLORS[0]);

    let distance = viewport.diagonal() * TRAVEL_FACTOR;
    let radians = angle_deg.to_radians();
    let end = (
        start.0 + distance * radians.cos(),
        start.1 + distance * radians.sin(),
    );

    let speed = rng.random_range(config.min_speed..=config.max_speed) * speed_scale.max(0.01);
    let duration_s = distance / (speed * FRAMES_PER_SECOND);
    let duration_ms = ((duration_s * 1000.0).round() as u64).max(1);

    ShootingStar {
        id,
        start,
        end,
        angle_deg,
        duration_ms,
        color,
        tail_length: 30.0 + rng.random::<f32>() * 20.0,
    }
}
