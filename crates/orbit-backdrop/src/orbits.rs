//! Rotating orbit rings.
//!
//! Six equal ellipses share the viewport center. Their starting rotations are
//! 30 degrees apart, so whenever they line up again they form a six-petal
//! lotus. Each ring turns at its own period.

use orbit_core::Viewport;

/// Starting rotation of each ring, in degrees.
pub const LOTUS_ANGLES: [f32; 6] = [0.0, 30.0, 60.0, 90.0, 120.0, 150.0];

/// Semi-major axis as a fraction of the viewport's shorter side.
const MAJOR_FRACTION: f32 = 0.46;

/// Semi-minor axis as a fraction of the semi-major axis.
const MINOR_RATIO: f32 = 0.38;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRing {
    pub initial_rotation_deg: f32,
    /// Seconds per full turn.
    pub period_s: f32,
}

impl OrbitRing {
    /// Rotation in degrees at `t` seconds.
    pub fn rotation_at(&self, t: f32) -> f32 {
        (self.initial_rotation_deg + t / self.period_s * 360.0).rem_euclid(360.0)
    }

    /// `samples` pixel positions along the ring at `t` seconds.
    pub fn points(&self, viewport: &Viewport, t: f32, samples: usize) -> Vec<(f32, f32)> {
        let cx = viewport.width / 2.0;
        let cy = viewport.height / 2.0;
        let major = viewport.short_side() * MAJOR_FRACTION;
        let minor = major * MINOR_RATIO;
        let (sin_r, cos_r) = self.rotation_at(t).to_radians().sin_cos();

        (0..samples)
            .map(|i| {
                let theta = i as f32 / samples as f32 * std::f32::consts::TAU;
                let ex = major * theta.cos();
                let ey = minor * theta.sin();
                (cx + ex * cos_r - ey * sin_r, cy + ex * sin_r + ey * cos_r)
            })
            .collect()
    }
}

/// The six lotus rings. Periods differ so the rings drift apart and realign.
pub fn lotus_rings() -> Vec<OrbitRing> {
    LOTUS_ANGLES
        .iter()
        .enumerate()
        .map(|(idx, &angle)| OrbitRing {
            initial_rotation_deg: angle,
            period_s: 90.0 + 30.0 * idx as f32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lotus_layout() {
        let rings = lotus_rings();
        assert_eq!(rings.len(), 6);
        for (ring, angle) in rings.iter().zip(LOTUS_ANGLES) {
            assert_eq!(ring.rotation_at(0.0), angle);
        }
        // Full turn brings a ring back to its start.
        let ring = &rings[2];
        assert!((ring.rotation_at(ring.period_s) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_points_stay_on_ellipse() {
        let viewport = Viewport::new(800.0, 400.0);
        let ring = OrbitRing {
            initial_rotation_deg: 0.0,
            period_s: 100.0,
        };
        let points = ring.points(&viewport, 0.0, 8);
        assert_eq!(points.len(), 8);
        let major = 400.0 * MAJOR_FRACTION;
        assert!((points[0].0 - (400.0 + major)).abs() < 1e-3);
        assert!((points[0].1 - 200.0).abs() < 1e-3);
    }
}
