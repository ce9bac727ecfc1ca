//! Palettes and color helpers for the backdrop.

use orbit_core::Rgb;

/// Base color of the night sky behind every layer.
pub const SKY: Rgb = Rgb::new(0x04, 0x05, 0x07);

/// Colors a star may cycle through while twinkling.
pub const STAR_PALETTE: [Rgb; 6] = [
    Rgb::new(0x27, 0x10, 0x02),
    Rgb::new(0x9b, 0x08, 0x1c),
    Rgb::new(0xe2, 0xa1, 0x28),
    Rgb::new(0x12, 0x2e, 0x40),
    Rgb::new(0x28, 0x31, 0x21),
    Rgb::new(0xd5, 0xd7, 0xd7),
];

/// Silver tint for the orbit ring at `index`. Ring 0 is the site's accent
/// color (#bfc8c8); later rings drift slightly in hue.
pub fn orbit_tint(index: usize) -> Rgb {
    hsl_to_rgb(180.0 + 10.0 * index as f32, 0.08, 0.77)
}

/// Convert HSL (hue in degrees, saturation and lightness in 0.0-1.0) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h.rem_euclid(360.0) / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgb::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
