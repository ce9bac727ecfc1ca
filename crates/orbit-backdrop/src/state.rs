//! The mounted backdrop: generated layout, the shooting-star spawner and the
//! per-frame painting of every layer.

use orbit_config::Config;
use orbit_core::{AnimationSpeed, CELL_HEIGHT_PX, CELL_WIDTH_PX, Rgb, Viewport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    Frame,
    style::{Color, Style},
    widgets::Paragraph,
};
use tracing::{debug, info};

use crate::aurora::aurora_cell;
use crate::canvas::Canvas;
use crate::chars::{
    COMET_HEAD_CHAR, COMET_TAIL_CHARS, HALO_CHAR, ORBIT_CHARS, PLANET_CHARS, STAR_CHARS,
    by_intensity,
};
use crate::color::{SKY, orbit_tint};
use crate::orbits::{OrbitRing, lotus_rings};
use crate::planets::{Planet, PlanetKind, exclusion_zones, generate_planets};
use crate::shooting::{
    CometLayer, KeyframeRegistry, KeyframeSheet, ShootingStarSpawner, TickReport,
};
use crate::starfield::{Star, generate_stars, star_count};

/// Pixels between tail samples.
const TAIL_STEP_PX: f32 = 4.0;

/// Halo ring, as a multiple of the planet radius.
const HALO_INNER: f32 = 1.2;
const HALO_OUTER: f32 = 1.45;

/// Background animation state for one mount.
pub struct BackdropState {
    stars: Vec<Star>,
    planets: Vec<Planet>,
    rings: Vec<OrbitRing>,
    spawner: ShootingStarSpawner<StdRng, KeyframeSheet, CometLayer>,
    viewport: Viewport,
    speed: AnimationSpeed,
    show_aurora: bool,
    show_orbits: bool,
    /// Exclusion zones follow the planet discs rather than the config.
    zones_from_planets: bool,
    /// Elapsed time at mount; looping animations start from here.
    mounted_at_ms: u64,
    /// Last known terminal width.
    last_width: u16,
    /// Last known terminal height.
    last_height: u16,
}

impl BackdropState {
    /// Generate a fresh layout for a terminal of `cols` x `rows` and start
    /// the shooting-star timer.
    pub fn mount(config: &Config, cols: u16, rows: u16, now_ms: u64) -> Self {
        Self::mount_with_rng(config, cols, rows, now_ms, StdRng::from_rng(&mut rand::rng()))
    }

    /// Like [`BackdropState::mount`] with a caller-supplied random source.
    pub fn mount_with_rng(
        config: &Config,
        cols: u16,
        rows: u16,
        now_ms: u64,
        mut rng: StdRng,
    ) -> Self {
        let viewport = Viewport::from_cells(cols, rows);

        let planets = generate_planets(&PlanetKind::ALL, &config.planets, &mut rng);
        let zones_from_planets = config.stars.exclusion_zones.is_empty();
        let zones = if zones_from_planets {
            exclusion_zones(&planets, &viewport)
        } else {
            config.stars.exclusion_zones.clone()
        };

        let count = star_count(config.stars.min_count, config.stars.max_count, &mut rng);
        let stars = generate_stars(count, &zones, &mut rng);

        let spawner_rng = StdRng::from_rng(&mut rng);
        let mut spawner = ShootingStarSpawner::new(
            config.shooting_stars.clone(),
            spawner_rng,
            KeyframeSheet::new(),
            CometLayer::new(),
        );
        spawner.set_speed_scale(config.animation_speed.shooting_star_speed());
        spawner.start(now_ms);

        let hidden = stars.iter().filter(|s| s.hidden).count();
        let kinds: Vec<&str> = planets.iter().map(|p| p.kind.id()).collect();
        info!(
            stars = count,
            hidden,
            planets = ?kinds,
            cols,
            rows,
            "backdrop mounted"
        );

        Self {
            stars,
            planets,
            rings: lotus_rings(),
            spawner,
            viewport,
            speed: config.animation_speed,
            show_aurora: config.show_aurora,
            show_orbits: config.show_orbits,
            zones_from_planets,
            mounted_at_ms: now_ms,
            last_width: cols,
            last_height: rows,
        }
    }

    /// Stop spawning and release every live shooting star.
    pub fn unmount(&mut self) {
        self.spawner.shutdown();
        info!("backdrop unmounted");
    }

    /// Track a new terminal size. Stars and planets are laid out in
    /// percentages and keep their places; new shooting stars use the new size.
    /// Zones derived from planets are rebuilt, since a planet's pixel radius
    /// covers a different percentage of the new viewport.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == self.last_width && rows == self.last_height {
            return;
        }
        self.last_width = cols;
        self.last_height = rows;
        self.viewport = Viewport::from_cells(cols, rows);

        if self.zones_from_planets {
            let zones = exclusion_zones(&self.planets, &self.viewport);
            for star in &mut self.stars {
                star.hidden = zones.iter().any(|zone| zone.contains(&star.position));
            }
            debug!(cols, rows, "star exclusion zones rebuilt");
        }
    }

    pub fn speed(&self) -> AnimationSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: AnimationSpeed) {
        self.speed = speed;
        self.spawner.set_speed_scale(speed.shooting_star_speed());
    }

    pub fn show_aurora(&self) -> bool {
        self.show_aurora
    }

    pub fn set_show_aurora(&mut self, show: bool) {
        self.show_aurora = show;
    }

    pub fn show_orbits(&self) -> bool {
        self.show_orbits
    }

    pub fn set_show_orbits(&mut self, show: bool) {
        self.show_orbits = show;
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Live shooting stars.
    pub fn shooting_star_count(&self) -> usize {
        self.spawner.live_count()
    }

    /// Registered keyframe definitions; equals the live star count.
    pub fn keyframe_count(&self) -> usize {
        self.spawner.keyframes().len()
    }

    /// Attached comet elements; equals the live star count.
    pub fn comet_count(&self) -> usize {
        self.spawner.elements().elements().count()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_running()
    }

    /// Advance the shooting stars to `elapsed_ms`.
    pub fn update(&mut self, elapsed_ms: u64) -> TickReport {
        self.spawner.tick(elapsed_ms, &self.viewport)
    }

    /// Render the backdrop to the whole frame.
    pub fn render(&mut self, frame: &mut Frame, elapsed_ms: u64) {
        let area = frame.area();
        self.resize(area.width, area.height);
        self.update(elapsed_ms);

        let canvas = self.paint(area.width, area.height, elapsed_ms);
        let sky = Style::new().bg(Color::from(SKY));
        frame.render_widget(Paragraph::new(canvas.into_lines()).style(sky), area);
    }

    /// Paint every layer, back to front.
    pub(crate) fn paint(&self, width: u16, height: u16, elapsed_ms: u64) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        let t = elapsed_ms.saturating_sub(self.mounted_at_ms) as f32 / 1000.0
            * self.speed.time_scale();

        if self.show_aurora {
            self.paint_aurora(&mut canvas, elapsed_ms);
        }
        self.paint_stars(&mut canvas, t);
        self.paint_comets(&mut canvas, elapsed_ms);
        if self.show_orbits {
            self.paint_orbits(&mut canvas, t);
        }
        self.paint_planets(&mut canvas);
        canvas
    }

    fn paint_aurora(&self, canvas: &mut Canvas, elapsed_ms: u64) {
        let (width, height) = (canvas.width(), canvas.height());
        for y in 0..height {
            for x in 0..width {
                if let Some((ch, color)) = aurora_cell(x, y, width, height, elapsed_ms, self.speed) {
                    canvas.put(x as i32, y as i32, ch, color);
                }
            }
        }
    }

    fn paint_stars(&self, canvas: &mut Canvas, t: f32) {
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        for star in self.stars.iter().filter(|s| !s.hidden) {
            let x = (star.position.left / 100.0 * width).min(width - 1.0);
            let y = (star.position.top / 100.0 * height).min(height - 1.0);
            let brightness = star.brightness_at(t);
            let ch = by_intensity(STAR_CHARS, brightness * brightness);
            let color = star.color_at(t).over(SKY, brightness);
            canvas.put(x as i32, y as i32, ch, color);
        }
    }

    fn paint_comets(&self, canvas: &mut Canvas, now_ms: u64) {
        let sheet = self.spawner.keyframes();
        for comet in self.spawner.elements().elements() {
            let Some(keyframes) = sheet.get(comet.keyframes) else {
                continue;
            };
            let sample = keyframes.sample(comet.progress(now_ms));
            let (sin_a, cos_a) = keyframes.angle_deg.to_radians().sin_cos();

            // Tail first so the head stays on top.
            let tail = comet.tail_length * sample.scale;
            let steps = (tail / TAIL_STEP_PX).ceil() as usize;
            for step in (1..=steps).rev() {
                let back = step as f32 * TAIL_STEP_PX;
                let fade = 1.0 - back / tail.max(1.0);
                let ch = by_intensity(COMET_TAIL_CHARS, fade);
                let color = comet.color.tail.over(SKY, 0.2 + 0.6 * fade);
                canvas.put_px(sample.x - back * cos_a, sample.y - back * sin_a, ch, color);
            }
            canvas.put_px(sample.x, sample.y, COMET_HEAD_CHAR, comet.color.head);
        }
    }

    fn paint_orbits(&self, canvas: &mut Canvas, t: f32) {
        let samples = 2 * (canvas.width() as usize + canvas.height() as usize);
        for (idx, ring) in self.rings.iter().enumerate() {
            let ch = ORBIT_CHARS[idx % ORBIT_CHARS.len()];
            let color = orbit_tint(idx).over(SKY, 0.22);
            for (x, y) in ring.points(&self.viewport, t, samples) {
                canvas.put_px(x, y, ch, color);
            }
        }
    }

    fn paint_planets(&self, canvas: &mut Canvas) {
        for planet in &self.planets {
            let (cx, cy) = self.viewport.to_pixels(&planet.position);
            let radius = planet.size_px as f32 / 2.0;
            let (lit, shade) = planet.kind.surface();
            let reach = if planet.kind.has_halo() {
                radius * HALO_OUTER
            } else {
                radius
            };

            let x0 = ((cx - reach) / CELL_WIDTH_PX).floor() as i32;
            let x1 = ((cx + reach) / CELL_WIDTH_PX).ceil() as i32;
            let y0 = ((cy - reach) / CELL_HEIGHT_PX).floor() as i32;
            let y1 = ((cy + reach) / CELL_HEIGHT_PX).ceil() as i32;

            for row in y0..=y1 {
                for col in x0..=x1 {
                    let px = (col as f32 + 0.5) * CELL_WIDTH_PX;
                    let py = (row as f32 + 0.5) * CELL_HEIGHT_PX;
                    let (dx, dy) = (px - cx, py - cy);
                    let d = (dx * dx + dy * dy).sqrt() / radius.max(1.0);

                    if d <= 1.0 {
                        // Lit from the upper left.
                        let light = (0.5 - (dx + dy) / (4.0 * radius)).clamp(0.0, 1.0);
                        let color = shade.lerp(lit, light);
                        let ch = by_intensity(PLANET_CHARS, 1.0 - d * 0.75);
                        canvas.put(col, row, ch, color);
                    } else if planet.kind.has_halo() && (HALO_INNER..=HALO_OUTER).contains(&d) {
                        let color: Rgb = planet.kind.halo().over(SKY, 0.5);
                        canvas.put(col, row, HALO_CHAR, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shooting::WakeOutcome;
    use ratatui::{Terminal, backend::TestBackend};

    fn config() -> Config {
        let mut config = Config::default();
        config.shooting_stars.min_delay_ms = 0;
        config.shooting_stars.max_delay_ms = 0;
        config
    }

    fn mount(config: &Config) -> BackdropState {
        BackdropState::mount_with_rng(config, 80, 24, 0, StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_mount_generates_layout() {
        let state = mount(&config());
        assert!((500..=1000).contains(&state.stars().len()));
        let kinds: Vec<&str> = state.planets().iter().map(|p| p.kind.id()).collect();
        assert_eq!(kinds, ["azure", "obsidian", "ember"]);
        assert!(state.is_spawning());
        assert_eq!(state.viewport(), Viewport::new(640.0, 384.0));
    }

    #[test]
    fn test_stars_behind_planets_are_hidden() {
        let state = mount(&config());
        let zones = exclusion_zones(state.planets(), &state.viewport());
        for star in state.stars() {
            let inside = zones.iter().any(|z| z.contains(&star.position));
            assert_eq!(star.hidden, inside);
        }
    }

    #[test]
    fn test_configured_zones_override_planets() {
        let mut config = config();
        config.stars.exclusion_zones = vec![orbit_core::ExclusionZone::new(50.0, 50.0, 200.0)];
        let state = mount(&config);
        assert!(state.stars().iter().all(|s| s.hidden));
    }

    #[test]
    fn test_registries_track_live_stars() {
        let mut state = mount(&config());
        for frame in 0..200u64 {
            let report = state.update(frame * 100);
            if let Some(WakeOutcome::Spawned { .. }) = report.wake {
                assert!(state.shooting_star_count() > 0);
            }
            assert_eq!(state.keyframe_count(), state.shooting_star_count());
            assert_eq!(state.comet_count(), state.shooting_star_count());
        }
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut state = mount(&config());
        state.update(0);
        state.update(1);
        assert!(state.shooting_star_count() > 0);

        state.unmount();
        assert!(!state.is_spawning());
        assert_eq!(state.shooting_star_count(), 0);
        assert_eq!(state.keyframe_count(), 0);
        assert_eq!(state.comet_count(), 0);

        // No spawns after teardown.
        state.update(100_000);
        assert_eq!(state.shooting_star_count(), 0);
    }

    #[test]
    fn test_paint_layers() {
        let mut config = config();
        config.show_aurora = false;
        config.show_orbits = false;
        let state = mount(&config);
        let canvas = state.paint(80, 24, 0);
        assert!(canvas.painted() > 0);

        // Planet centers are painted by the planet layer.
        for planet in state.planets() {
            let (px, py) = state.viewport().to_pixels(&planet.position);
            let cell = canvas.get((px / CELL_WIDTH_PX) as u16, (py / CELL_HEIGHT_PX) as u16);
            let (ch, _) = cell.expect("planet cell painted");
            assert!(PLANET_CHARS.contains(&ch) || ch == HALO_CHAR, "{ch}");
        }
    }

    #[test]
    fn test_render_to_test_backend() {
        let mut state = mount(&config());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| state.render(frame, 0)).unwrap();
        terminal.draw(|frame| state.render(frame, 16)).unwrap();
        assert!(state.shooting_star_count() <= 3);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut state = mount(&config());
        state.resize(100, 30);
        assert_eq!(state.viewport(), Viewport::from_cells(100, 30));
    }

    #[test]
    fn test_resize_rebuilds_planet_zones() {
        let mut state = mount(&config());
        let hidden_before = state.stars().iter().filter(|s| s.hidden).count();

        // Planets shrink relative to a much larger terminal.
        state.resize(240, 72);
        let zones = exclusion_zones(state.planets(), &state.viewport());
        for star in state.stars() {
            let inside = zones.iter().any(|z| z.contains(&star.position));
            assert_eq!(star.hidden, inside);
        }
        let hidden_after = state.stars().iter().filter(|s| s.hidden).count();
        assert!(hidden_after <= hidden_before);
    }

    #[test]
    fn test_resize_keeps_configured_zones() {
        let mut config = config();
        config.stars.exclusion_zones = vec![orbit_core::ExclusionZone::new(50.0, 50.0, 200.0)];
        let mut state = mount(&config);
        state.resize(240, 72);
        assert!(state.stars().iter().all(|s| s.hidden));
    }
}
