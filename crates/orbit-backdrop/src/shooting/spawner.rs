//! Timer-driven shooting-star spawner.
//!
//! The spawner owns every live shooting star together with its keyframe
//! definition and comet element. It is driven by [`ShootingStarSpawner::tick`]
//! from the host's frame loop: finished stars are removed first, then the spawn
//! timer is checked and, when due, one wake runs and the timer is rescheduled.
//!
//! Removal is idempotent. Flight completion is the authoritative signal; the
//! off-screen check is a safety net that may fire first, since every flight
//! overshoots the viewport. Either way a star's resources are released once.

use std::collections::BTreeMap;

use orbit_config::ShootingStarsConfig;
use orbit_core::Viewport;
use rand::Rng;
use tracing::{debug, trace};

use super::pool::{CometElement, ElementHandle, ElementPool};
use super::registry::{KeyframeHandle, KeyframeRegistry};
use super::star::{ShootingStar, ShootingStarId, create_shooting_star};

/// How far past the viewport edge a comet head must be to count as gone.
/// Larger than the spawn offset and the longest tail.
pub const OFF_SCREEN_MARGIN_PX: f32 = 60.0;

/// Lifecycle of a shooting star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Spawned,
    Animating,
    Removed,
}

/// Why a shooting star was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// The flight animation finished.
    Completed,
    /// The head left the viewport by more than the margin.
    OffScreen,
    /// The spawner was shut down.
    Teardown,
}

/// Result of one spawn-timer wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// A star was created; `live` is the count before spawning.
    Spawned {
        id: ShootingStarId,
        live: usize,
        cap: usize,
    },
    /// The live count had already reached the cap.
    Skipped { live: usize, cap: usize },
    /// The timer is not running.
    Cancelled,
}

/// What happened during one tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub removed: Vec<(ShootingStarId, RemovalCause)>,
    pub wake: Option<WakeOutcome>,
}

/// A one-shot deadline that the spawner re-arms after every wake.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTimer {
    next_wake_ms: Option<u64>,
}

impl SpawnTimer {
    pub fn schedule(&mut self, at_ms: u64) {
        self.next_wake_ms = Some(at_ms);
    }

    pub fn cancel(&mut self) {
        self.next_wake_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_wake_ms.is_some()
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_wake_ms.is_some_and(|at| now_ms >= at)
    }

    pub fn next_wake_ms(&self) -> Option<u64> {
        self.next_wake_ms
    }
}

/// Concurrency cap for a roll in `[0, 1)`: 3 below `three_chance`, 2 below
/// `three_chance + two_chance`, otherwise 1.
pub fn cap_for_roll(config: &ShootingStarsConfig, roll: f32) -> usize {
    if roll < config.three_chance {
        3
    } else if roll < config.three_chance + config.two_chance {
        2
    } else {
        1
    }
}

#[derive(Debug)]
struct LiveStar {
    star: ShootingStar,
    spawned_at_ms: u64,
    keyframes: KeyframeHandle,
    element: ElementHandle,
    phase: Phase,
}

impl LiveStar {
    fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.spawned_at_ms);
        elapsed as f32 / self.star.duration_ms.max(1) as f32
    }
}

/// Spawns, tracks and removes shooting stars.
pub struct ShootingStarSpawner<R: Rng, K: KeyframeRegistry, E: ElementPool> {
    config: ShootingStarsConfig,
    speed_scale: f32,
    rng: R,
    keyframes: K,
    elements: E,
    live: BTreeMap<ShootingStarId, LiveStar>,
    timer: SpawnTimer,
    next_id: u64,
}

impl<R: Rng, K: KeyframeRegistry, E: ElementPool> ShootingStarSpawner<R, K, E> {
    pub fn new(config: ShootingStarsConfig, rng: R, keyframes: K, elements: E) -> Self {
        Self {
            config,
            speed_scale: 1.0,
            rng,
            keyframes,
            elements,
            live: BTreeMap::new(),
            timer: SpawnTimer::default(),
            next_id: 0,
        }
    }

    /// Scale applied to the configured speed range for new stars.
    pub fn set_speed_scale(&mut self, scale: f32) {
        self.speed_scale = scale;
    }

    /// Arm the spawn timer. Does nothing if it is already running.
    pub fn start(&mut self, now_ms: u64) {
        if self.timer.is_active() {
            return;
        }
        let delay = self.next_delay_ms();
        self.timer.schedule(now_ms + delay);
        debug!(first_wake_ms = now_ms + delay, "shooting star spawner started");
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_active()
    }

    pub fn next_wake_ms(&self) -> Option<u64> {
        self.timer.next_wake_ms()
    }

    fn next_delay_ms(&mut self) -> u64 {
        let min = self.config.min_delay_ms;
        let max = self.config.max_delay_ms.max(min);
        self.rng.random_range(min..=max)
    }

    fn choose_cap(&mut self) -> usize {
        let roll = self.rng.random::<f32>();
        cap_for_roll(&self.config, roll)
    }

    /// Advance to `now_ms`: remove finished stars, then run the spawn timer.
    pub fn tick(&mut self, now_ms: u64, viewport: &Viewport) -> TickReport {
        let mut report = TickReport::default();

        let completed: Vec<ShootingStarId> = self
            .live
            .iter()
            .filter(|(_, live)| live.progress(now_ms) >= 1.0)
            .map(|(id, _)| *id)
            .collect();
        for id in completed {
            if self.on_animation_end(id) {
                report.removed.push((id, RemovalCause::Completed));
            }
        }

        let gone: Vec<ShootingStarId> = self
            .live
            .iter()
            .filter(|(_, live)| {
                let (x, y) = live.star.position_at(live.progress(now_ms));
                viewport.is_outside(x, y, OFF_SCREEN_MARGIN_PX)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in gone {
            if self.on_off_screen(id) {
                report.removed.push((id, RemovalCause::OffScreen));
            }
        }

        if self.timer.is_due(now_ms) {
            report.wake = Some(self.wake(now_ms, viewport));
        }

        report
    }

    /// Run one wake: spawn unless the live count has reached this wake's cap,
    /// then reschedule.
    pub fn wake(&mut self, now_ms: u64, viewport: &Viewport) -> WakeOutcome {
        if !self.timer.is_active() {
            return WakeOutcome::Cancelled;
        }

        let live = self.live.len();
        let cap = self.choose_cap();

        let outcome = if live >= cap {
            trace!(live, cap, "shooting star spawn skipped");
            WakeOutcome::Skipped { live, cap }
        } else {
            let id = self.spawn(now_ms, viewport);
            WakeOutcome::Spawned { id, live, cap }
        };

        let delay = self.next_delay_ms();
        self.timer.schedule(now_ms + delay);
        outcome
    }

    fn spawn(&mut self, now_ms: u64, viewport: &Viewport) -> ShootingStarId {
        let id = ShootingStarId(self.next_id);
        self.next_id += 1;

        let live_angles: Vec<f32> = self.live.values().map(|l| l.star.angle_deg).collect();
        let star = create_shooting_star(
            id,
            &live_angles,
            viewport,
            &self.config,
            self.speed_scale,
            &mut self.rng,
        );

        let keyframes = self
            .keyframes
            .register(&star.animation_name(), star.keyframes());
        let element = self.elements.attach(CometElement {
            star: id,
            keyframes,
            started_at_ms: now_ms,
            duration_ms: star.duration_ms,
            color: star.color,
            tail_length: star.tail_length,
        });

        debug!(
            %id,
            angle = star.angle_deg,
            duration_ms = star.duration_ms,
            "shooting star spawned"
        );

        let mut live = LiveStar {
            star,
            spawned_at_ms: now_ms,
            keyframes,
            element,
            phase: Phase::Spawned,
        };
        live.phase = Phase::Animating;
        self.live.insert(id, live);
        id
    }

    /// Flight-complete signal. Returns `true` if this call removed the star.
    pub fn on_animation_end(&mut self, id: ShootingStarId) -> bool {
        self.remove(id, RemovalCause::Completed)
    }

    /// Off-screen signal. Returns `true` if this call removed the star.
    pub fn on_off_screen(&mut self, id: ShootingStarId) -> bool {
        self.remove(id, RemovalCause::OffScreen)
    }

    /// Remove a star and release its keyframes and element. Later calls for
    /// the same id do nothing and return `false`.
    pub fn remove(&mut self, id: ShootingStarId, cause: RemovalCause) -> bool {
        let Some(live) = self.live.remove(&id) else {
            trace!(%id, ?cause, "shooting star already removed");
            return false;
        };

        self.keyframes.release(live.keyframes);
        self.elements.detach(live.element);
        debug!(%id, ?cause, "shooting star removed");
        true
    }

    /// Cancel the timer and release every live star.
    pub fn shutdown(&mut self) {
        self.timer.cancel();
        let ids: Vec<ShootingStarId> = self.live.keys().copied().collect();
        let released = ids.len();
        for id in ids {
            self.remove(id, RemovalCause::Teardown);
        }
        if released > 0 {
            debug!(released, "shooting star spawner shut down");
        }
    }

    pub fn phase(&self, id: ShootingStarId) -> Phase {
        self.live.get(&id).map_or(Phase::Removed, |live| live.phase)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live stars in spawn order.
    pub fn live_stars(&self) -> impl Iterator<Item = &ShootingStar> {
        self.live.values().map(|live| &live.star)
    }

    pub fn keyframes(&self) -> &K {
        &self.keyframes
    }

    pub fn elements(&self) -> &E {
        &self.elements
    }
}

impl<R: Rng, K: KeyframeRegistry, E: ElementPool> Drop for ShootingStarSpawner<R, K, E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::shooting::registry::Keyframes;

    /// Shared record of every registry and pool call.
    #[derive(Debug, Default)]
    struct Ledger {
        registered: Vec<KeyframeHandle>,
        released: Vec<KeyframeHandle>,
        attached: Vec<ElementHandle>,
        detached: Vec<ElementHandle>,
        live_keyframes: HashSet<KeyframeHandle>,
        live_elements: HashSet<ElementHandle>,
        keyframes: BTreeMap<KeyframeHandle, Keyframes>,
        elements: BTreeMap<ElementHandle, CometElement>,
        next: u64,
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingRegistry(Rc<RefCell<Ledger>>);

    impl KeyframeRegistry for RecordingRegistry {
        fn register(&mut self, _name: &str, keyframes: Keyframes) -> KeyframeHandle {
            let mut ledger = self.0.borrow_mut();
            let handle = KeyframeHandle(ledger.next);
            ledger.next += 1;
            ledger.registered.push(handle);
            ledger.live_keyframes.insert(handle);
            ledger.keyframes.insert(handle, keyframes);
            handle
        }

        fn release(&mut self, handle: KeyframeHandle) -> bool {
            let mut ledger = self.0.borrow_mut();
            ledger.released.push(handle);
            ledger.keyframes.remove(&handle);
            ledger.live_keyframes.remove(&handle)
        }

        fn get(&self, _handle: KeyframeHandle) -> Option<&Keyframes> {
            None
        }

        fn len(&self) -> usize {
            self.0.borrow().live_keyframes.len()
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingPool(Rc<RefCell<Ledger>>);

    impl ElementPool for RecordingPool {
        fn attach(&mut self, element: CometElement) -> ElementHandle {
            let mut ledger = self.0.borrow_mut();
            let handle = ElementHandle(ledger.next);
            ledger.next += 1;
            ledger.attached.push(handle);
            ledger.live_elements.insert(handle);
            ledger.elements.insert(handle, element);
            handle
        }

        fn detach(&mut self, handle: ElementHandle) -> bool {
            let mut ledger = self.0.borrow_mut();
            ledger.detached.push(handle);
            ledger.elements.remove(&handle);
            ledger.live_elements.remove(&handle)
        }

        fn get(&self, _handle: ElementHandle) -> Option<&CometElement> {
            None
        }

        fn len(&self) -> usize {
            self.0.borrow().live_elements.len()
        }
    }

    type TestSpawner = ShootingStarSpawner<StdRng, RecordingRegistry, RecordingPool>;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    fn spawner(config: ShootingStarsConfig, ledger: &Rc<RefCell<Ledger>>) -> TestSpawner {
        ShootingStarSpawner::new(
            config,
            StdRng::seed_from_u64(42),
            RecordingRegistry(ledger.clone()),
            RecordingPool(ledger.clone()),
        )
    }

    /// Cap always 1, no delay between wakes.
    fn single_immediate() -> ShootingStarsConfig {
        ShootingStarsConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            two_chance: 0.0,
            three_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_cap_for_roll() {
        let config = ShootingStarsConfig::default();
        assert_eq!(cap_for_roll(&config, 0.05), 3);
        assert_eq!(cap_for_roll(&config, 0.10), 2);
        assert_eq!(cap_for_roll(&config, 0.34), 2);
        assert_eq!(cap_for_roll(&config, 0.35), 1);
        assert_eq!(cap_for_roll(&config, 0.99), 1);
    }

    #[test]
    fn test_second_wake_skipped_at_cap_one() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut spawner = spawner(single_immediate(), &ledger);
        spawner.start(0);
        assert_eq!(spawner.next_wake_ms(), Some(0));

        let first = spawner.wake(0, &viewport());
        assert!(matches!(first, WakeOutcome::Spawned { live: 0, cap: 1, .. }));
        let second = spawner.wake(0, &viewport());
        assert_eq!(second, WakeOutcome::Skipped { live: 1, cap: 1 });

        assert_eq!(spawner.live_count(), 1);
        assert_eq!(ledger.borrow().registered.len(), 1);
        assert_eq!(ledger.borrow().attached.len(), 1);
        // Skipping still re-arms the timer.
        assert!(spawner.is_running());
    }

    #[test]
    fn test_live_count_never_exceeds_cap() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let config = ShootingStarsConfig {
            min_delay_ms: 100,
            max_delay_ms: 400,
            two_chance: 0.4,
            three_chance: 0.3,
            ..Default::default()
        };
        let mut spawner = spawner(config, &ledger);
        spawner.start(0);

        let mut spawned = 0;
        for frame in 0..20_000u64 {
            let report = spawner.tick(frame * 50, &viewport());
            match report.wake {
                Some(WakeOutcome::Spawned { live, cap, .. }) => {
                    assert!(live < cap);
                    assert!(spawner.live_count() <= cap);
                    spawned += 1;
                }
                Some(WakeOutcome::Skipped { live, cap }) => assert!(live >= cap),
                Some(WakeOutcome::Cancelled) => panic!("timer stopped"),
                None => {}
            }
            assert!(spawner.live_count() <= 3);
        }
        assert!(spawned > 10);
    }

    #[test]
    fn test_double_signal_releases_once() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut spawner = spawner(single_immediate(), &ledger);
        spawner.start(0);
        let WakeOutcome::Spawned { id, .. } = spawner.wake(0, &viewport()) else {
            panic!("expected a spawn");
        };
        assert_eq!(spawner.phase(id), Phase::Animating);

        assert!(spawner.on_animation_end(id));
        assert!(!spawner.on_off_screen(id));
        assert!(!spawner.on_animation_end(id));
        assert_eq!(spawner.phase(id), Phase::Removed);

        let ledger = ledger.borrow();
        assert_eq!(ledger.released, ledger.registered);
        assert_eq!(ledger.detached, ledger.attached);
        assert!(ledger.live_keyframes.is_empty());
        assert!(ledger.live_elements.is_empty());
    }

    #[test]
    fn test_off_screen_first_then_completion() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut spawner = spawner(single_immediate(), &ledger);
        spawner.start(0);
        let WakeOutcome::Spawned { id, .. } = spawner.wake(0, &viewport()) else {
            panic!("expected a spawn");
        };
        assert!(spawner.on_off_screen(id));
        assert!(!spawner.on_animation_end(id));
        assert_eq!(ledger.borrow().released.len(), 1);
        assert_eq!(ledger.borrow().detached.len(), 1);
    }

    #[test]
    fn test_tick_removes_each_star_once() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let config = ShootingStarsConfig {
            min_delay_ms: 500,
            max_delay_ms: 1500,
            two_chance: 0.5,
            three_chance: 0.5,
            ..Default::default()
        };
        let mut spawner = spawner(config, &ledger);
        spawner.start(0);

        let mut removed = Vec::new();
        for frame in 0..10_000u64 {
            let report = spawner.tick(frame * 16, &viewport());
            removed.extend(report.removed.into_iter().map(|(id, _)| id));
        }
        let unique: HashSet<_> = removed.iter().collect();
        assert_eq!(unique.len(), removed.len());
        assert!(!removed.is_empty());

        let ledger = ledger.borrow();
        assert_eq!(ledger.released.len(), removed.len());
        assert_eq!(ledger.detached.len(), removed.len());
        assert_eq!(
            ledger.live_keyframes.len(),
            ledger.registered.len() - ledger.released.len()
        );
    }

    #[test]
    fn test_completion_removes_at_duration() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut spawner = spawner(single_immediate(), &ledger);
        spawner.start(0);
        let WakeOutcome::Spawned { id, .. } = spawner.wake(1000, &viewport()) else {
            panic!("expected a spawn");
        };
        let duration = spawner
            .live_stars()
            .find(|s| s.id == id)
            .map(|s| s.duration_ms)
            .unwrap();
        spawner.timer.cancel();

        // Just after spawning the head is still within the off-screen margin.
        let report = spawner.tick(1001, &viewport());
        assert!(report.removed.is_empty());
        assert_eq!(spawner.phase(id), Phase::Animating);

        // Completion is checked before the off-screen safety net.
        let report = spawner.tick(1000 + duration, &viewport());
        assert_eq!(report.removed, vec![(id, RemovalCause::Completed)]);
        assert_eq!(spawner.phase(id), Phase::Removed);
    }

    #[test]
    fn test_shutdown_cancels_and_releases() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let config = ShootingStarsConfig {
            two_chance: 0.0,
            three_chance: 1.0,
            ..single_immediate()
        };
        let mut spawner = spawner(config, &ledger);
        spawner.start(0);
        for _ in 0..3 {
            spawner.wake(0, &viewport());
        }
        assert_eq!(spawner.live_count(), 3);

        spawner.shutdown();
        assert!(!spawner.is_running());
        assert_eq!(spawner.live_count(), 0);
        assert_eq!(spawner.wake(10, &viewport()), WakeOutcome::Cancelled);
        assert_eq!(spawner.tick(10_000, &viewport()).wake, None);
        assert_eq!(ledger.borrow().released.len(), 3);
        assert_eq!(ledger.borrow().detached.len(), 3);
    }

    #[test]
    fn test_remount_cycles_do_not_leak() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        for cycle in 0..5u64 {
            let mut spawner = spawner(
                ShootingStarsConfig {
                    three_chance: 1.0,
                    two_chance: 0.0,
                    ..single_immediate()
                },
                &ledger,
            );
            spawner.start(cycle);
            spawner.tick(cycle, &viewport());
            spawner.tick(cycle, &viewport());
            assert!(spawner.live_count() > 0);
            // Dropped without an explicit shutdown.
        }
        let ledger = ledger.borrow();
        assert!(ledger.live_keyframes.is_empty());
        assert!(ledger.live_elements.is_empty());
        assert_eq!(ledger.registered.len(), ledger.released.len());
        assert_eq!(ledger.attached.len(), ledger.detached.len());
    }

    #[test]
    fn test_concurrent_stars_keep_angle_separation() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let config = ShootingStarsConfig {
            two_chance: 0.0,
            three_chance: 1.0,
            ..single_immediate()
        };
        let mut spawner = spawner(config, &ledger);
        spawner.start(0);
        for _ in 0..3 {
            spawner.wake(0, &viewport());
        }
        let angles: Vec<f32> = spawner.live_stars().map(|s| s.angle_deg).collect();
        for (i, a) in angles.iter().enumerate() {
            for b in &angles[i + 1..] {
                let diff = (a - b).abs();
                let diff = diff.min(360.0 - diff);
                // 20 degrees apart before jitter and rounding.
                assert!(diff >= 20.0 - 2.0 * 5.0 - 5.0, "{angles:?}");
            }
        }
    }
}
