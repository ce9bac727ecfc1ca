//! Background rendering for the orbit backdrop.
//!
//! The backdrop is a randomized star field, a few placed planets, rotating
//! orbit rings, an optional aurora and shooting stars spawned on a timer.
//! Generators are pure functions over an injected random source; the
//! [`BackdropState`] composite owns one mount's layout and spawner and paints
//! every layer into a frame.

mod aurora;
mod canvas;
mod chars;
mod color;
mod orbits;
mod planets;
pub mod shooting;
mod starfield;
mod state;

pub use aurora::aurora_cell;
pub use color::{SKY, STAR_PALETTE, hsl_to_rgb, orbit_tint};
pub use orbits::{LOTUS_ANGLES, OrbitRing, lotus_rings};
pub use planets::{Planet, PlanetKind, exclusion_zones, generate_planets};
pub use starfield::{Star, generate_stars, grid_size, star_count};
pub use state::BackdropState;
