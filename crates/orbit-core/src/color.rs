//! Plain RGB color values.

use ratatui::style::Color;

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`; `t` is clamped to 0.0-1.0.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Blend over a background with the given opacity.
    pub fn over(self, background: Rgb, alpha: f32) -> Rgb {
        background.lerp(self, alpha)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 200, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(50, 150, 100));
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn test_over_blends_towards_background() {
        let black = Rgb::new(0, 0, 0);
        assert_eq!(Rgb::new(200, 100, 50).over(black, 0.5), Rgb::new(100, 50, 25));
        assert_eq!(Rgb::new(200, 100, 50).over(black, 0.0), black);
    }
}
