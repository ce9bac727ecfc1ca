//! Planet placement.
//!
//! Each planet gets a jittered size and a position found by rejection
//! sampling against the planets already placed. When the attempt budget runs
//! out the last sample is kept: an overlap is a cosmetic flaw, not an error.

use orbit_config::PlanetsConfig;
use orbit_core::{ExclusionZone, PercentPoint, Rgb, Viewport};
use rand::Rng;

/// Visual kind of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanetKind {
    Azure,
    Obsidian,
    Ember,
}

impl PlanetKind {
    /// Kinds placed by default, largest first.
    pub const ALL: [PlanetKind; 3] = [PlanetKind::Azure, PlanetKind::Obsidian, PlanetKind::Ember];

    pub fn id(&self) -> &'static str {
        match self {
            PlanetKind::Azure => "azure",
            PlanetKind::Obsidian => "obsidian",
            PlanetKind::Ember => "ember",
        }
    }

    /// Diameter in pixels before size jitter.
    pub fn base_size(&self) -> f32 {
        match self {
            PlanetKind::Azure => 140.0,
            PlanetKind::Obsidian => 110.0,
            PlanetKind::Ember => 100.0,
        }
    }

    pub fn has_halo(&self) -> bool {
        matches!(self, PlanetKind::Ember)
    }

    /// Lit and shadowed surface colors.
    pub fn surface(&self) -> (Rgb, Rgb) {
        match self {
            PlanetKind::Azure => (Rgb::new(0x5a, 0x8f, 0xc8), Rgb::new(0x07, 0x1d, 0x3f)),
            PlanetKind::Obsidian => (Rgb::new(0x4a, 0x4d, 0x55), Rgb::new(0x0c, 0x0d, 0x10)),
            PlanetKind::Ember => (Rgb::new(0xe2, 0x7a, 0x28), Rgb::new(0x2b, 0x18, 0x0f)),
        }
    }

    pub fn halo(&self) -> Rgb {
        Rgb::new(0xbf, 0xa0, 0x5a)
    }
}

/// A placed planet.
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub kind: PlanetKind,
    /// Center of the planet.
    pub position: PercentPoint,
    /// Diameter in pixels.
    pub size_px: u32,
    /// Samples drawn before this position was accepted.
    pub attempts: u32,
    /// Whether the accepted position kept the minimum separation.
    pub separated: bool,
}

impl Planet {
    /// Exclusion zone covering this planet's disc, with the radius expressed
    /// as a percentage of the viewport's shorter side.
    pub fn exclusion_zone(&self, viewport: &Viewport) -> ExclusionZone {
        let short = viewport.short_side().max(1.0);
        let radius = self.size_px as f32 / 2.0 / short * 100.0;
        ExclusionZone::new(self.position.top, self.position.left, radius)
    }
}

/// Place one planet per kind, in order.
pub fn generate_planets<R: Rng + ?Sized>(
    kinds: &[PlanetKind],
    config: &PlanetsConfig,
    rng: &mut R,
) -> Vec<Planet> {
    let mut planets: Vec<Planet> = Vec::with_capacity(kinds.len());
    let low = config.margin;
    let span = 100.0 - 2.0 * config.margin;
    let budget = config.max_attempts.max(1);

    for &kind in kinds {
        let size_multiplier = 0.8 + rng.random::<f32>() * 0.4;
        let size_px = (kind.base_size() * size_multiplier).round() as u32;

        let mut position = PercentPoint::default();
        let mut attempts = 0;
        let mut separated = false;

        while !separated && attempts < budget {
            position = PercentPoint::new(
                low + rng.random::<f32>() * span,
                low + rng.random::<f32>() * span,
            );
            separated = planets
                .iter()
                .all(|placed| placed.position.distance_to(&position) >= config.min_separation);
            attempts += 1;
        }

        planets.push(Planet {
            kind,
            position,
            size_px,
            attempts,
            separated,
        });
    }

    planets
}

/// Exclusion zones around every planet.
pub fn exclusion_zones(planets: &[Planet], viewport: &Viewport) -> Vec<ExclusionZone> {
    planets.iter().map(|p| p.exclusion_zone(viewport)).collect()
}
