//! Global animation speed setting.

use serde::{Deserialize, Serialize};

/// Animation speed for the whole backdrop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl AnimationSpeed {
    /// Cycle to the next speed.
    pub fn next(&self) -> Self {
        match self {
            AnimationSpeed::Slow => AnimationSpeed::Medium,
            AnimationSpeed::Medium => AnimationSpeed::Fast,
            AnimationSpeed::Fast => AnimationSpeed::Slow,
        }
    }

    /// Multiplier applied to elapsed time for looping animations
    /// (twinkle, orbit rotation, aurora drift).
    pub fn time_scale(&self) -> f32 {
        match self {
            AnimationSpeed::Slow => 0.5,
            AnimationSpeed::Medium => 1.0,
            AnimationSpeed::Fast => 2.0,
        }
    }

    /// Multiplier applied to shooting-star travel speed.
    pub fn shooting_star_speed(&self) -> f32 {
        match self {
            AnimationSpeed::Slow => 0.75,
            AnimationSpeed::Medium => 1.0,
            AnimationSpeed::Fast => 1.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnimationSpeed::Slow => "slow",
            AnimationSpeed::Medium => "medium",
            AnimationSpeed::Fast => "fast",
        }
    }
}
