//! Core types shared by the orbit backdrop crates.

mod color;
mod geometry;
mod speed;

pub use color::Rgb;
pub use geometry::{CELL_HEIGHT_PX, CELL_WIDTH_PX, ExclusionZone, PercentPoint, Viewport};
pub use speed::AnimationSpeed;
