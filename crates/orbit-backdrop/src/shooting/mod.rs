//! Shooting stars: trajectories, the keyframe registry, the comet element
//! pool and the spawner that ties them together.

mod pool;
mod registry;
mod spawner;
mod star;

pub use pool::{CometElement, CometLayer, ElementHandle, ElementPool};
pub use registry::{KeyframeHandle, KeyframeRegistry, KeyframeSample, KeyframeSheet, Keyframes};
pub use spawner::{
    OFF_SCREEN_MARGIN_PX, Phase, RemovalCause, ShootingStarSpawner, SpawnTimer, TickReport,
    WakeOutcome, cap_for_roll,
};
pub use star::{
    CANDIDATE_ANGLES, COMET_COLORS, CometColor, SPAWN_OFFSET_PX, ShootingStar, ShootingStarId,
    choose_angle, create_shooting_star,
};
