use descent_camera::{CameraError, CameraFramer, Framing};
use descent_common::SectionId;
use descent_hazard::{HazardFront, HazardStatus};
use descent_origin::{OriginRebaser, OriginShiftEvent, Rebase, SubscriberId};
use descent_pacing::{PacingController, TimeScaleTransition};
use descent_stream::{SectionCatalog, StreamError, StreamView, WorldStreamer};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::{ConfigError, DescentConfig};

/// Everything that can stop the simulation. All variants are configuration
/// problems; runtime degeneracies are recovered inside the components.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// A record of something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    SectionStitched { id: SectionId, template: String },
    SectionPruned { id: SectionId },
    OriginShifted { delta: Vec2 },
    HazardReleased,
    PacingStarted { transition: TimeScaleTransition },
    PacingFinished { transition: TimeScaleTransition },
    Ticked { tick: u64 },
}

/// Outputs of one tick for the host and presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub shift: Option<OriginShiftEvent>,
    pub stitched: Option<SectionId>,
    pub pruned: Vec<SectionId>,
    pub framing: Framing,
    pub camera_upper: f32,
    pub camera_lower: f32,
    pub bottom_line: f32,
    pub hazard_position: f32,
    pub time_scale: f32,
}

/// Most events the log holds. Once full, the oldest events are dropped, so
/// hosts that only read `TickReport` stay bounded; call `drain_events` to
/// keep everything.
pub const EVENT_LOG_CAPACITY: usize = 4096;

/// The simulation context. Exactly one pacing controller, one camera, one
/// rebaser per simulation; all of them are owned here and passed explicitly.
pub struct Simulation {
    config: DescentConfig,
    streamer: WorldStreamer,
    camera: CameraFramer,
    rebaser: OriginRebaser,
    hazard: HazardFront,
    pacing: PacingController,
    tick: u64,
    event_log: VecDeque<SimEvent>,
}

impl Simulation {
    /// Build every component and seed the section chain at the bottom of the view.
    pub fn new(config: DescentConfig, catalog: SectionCatalog) -> Result<Self, SimulationError> {
        let camera = CameraFramer::new(&config.camera)?;
        let mut streamer = WorldStreamer::new(config.stream.clone(), catalog, config.seed)?;
        let origin = Vec2::new(config.camera.center.x, camera.lower_bound());
        let first = streamer.init(origin)?;
        let hazard_start = camera.lower_bound() + config.hazard.start_offset;
        let hazard = HazardFront::new(&config.hazard, hazard_start);
        let pacing = PacingController::from_config(&config.pacing);

        let mut event_log = VecDeque::new();
        if let Some(section) = streamer.get(first) {
            event_log.push_back(SimEvent::SectionStitched {
                id: first,
                template: section.template().to_string(),
            });
        }

        tracing::info!(
            seed = config.seed,
            templates = streamer.catalog().len(),
            hazard = hazard.position(),
            "simulation initialized"
        );

        Ok(Self {
            config,
            streamer,
            camera,
            rebaser: OriginRebaser::new(),
            hazard,
            pacing,
            tick: 0,
            event_log,
        })
    }

    pub fn config(&self) -> &DescentConfig {
        &self.config
    }

    /// Current simulation tick.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    pub fn camera(&self) -> &CameraFramer {
        &self.camera
    }

    pub fn hazard(&self) -> &HazardFront {
        &self.hazard
    }

    pub fn pacing(&self) -> &PacingController {
        &self.pacing
    }

    /// Mutable pacing access for gameplay triggers (enqueue, override).
    pub fn pacing_mut(&mut self) -> &mut PacingController {
        &mut self.pacing
    }

    pub fn rebaser(&self) -> &OriginRebaser {
        &self.rebaser
    }

    /// Track a world-space readout point (UI marker, checkpoint) through shifts.
    pub fn register_readout(&mut self, position: Vec2) -> SubscriberId {
        self.rebaser.register(position)
    }

    pub fn unregister_readout(&mut self, id: SubscriberId) -> Option<Vec2> {
        self.rebaser.unregister(id)
    }

    pub fn readout(&self, id: SubscriberId) -> Option<Vec2> {
        self.rebaser.position(id)
    }

    /// Total distance the world has scrolled, i.e. how far the player has climbed.
    pub fn depth(&self) -> f32 {
        self.rebaser.total_offset().y
    }

    /// Distance from a point at world Y `y` down to the hazard front.
    pub fn hazard_distance(&self, y: f32) -> f32 {
        self.hazard.distance_to(y)
    }

    /// Convert an unscaled frame delta into the scaled delta `tick` expects.
    pub fn scaled(&self, real_dt: f32) -> f32 {
        self.pacing.scaled(real_dt)
    }

    /// Drain and return the event log, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.event_log.drain(..).collect()
    }

    /// Read-only access to the event log. Holds at most
    /// [`EVENT_LOG_CAPACITY`] events.
    pub fn events(&self) -> &VecDeque<SimEvent> {
        &self.event_log
    }

    fn push_event(&mut self, event: SimEvent) {
        if self.event_log.len() == EVENT_LOG_CAPACITY {
            self.event_log.pop_front();
        }
        self.event_log.push_back(event);
    }

    /// Advance the simulation by `dt` of scaled time.
    ///
    /// `actors` are the tracked actor positions. They are shifted in place
    /// together with everything else when the origin moves, so the caller
    /// sees positions consistent with the rest of the world afterwards.
    pub fn tick(&mut self, dt: f32, actors: &mut [Vec2]) -> Result<TickReport, SimulationError> {
        let _span = tracing::info_span!("sim_tick", tick = self.tick + 1).entered();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // 1. Streaming, measured against the bounds the camera currently supplies.
        let view = StreamView {
            upper: self.camera.upper_bound(),
            bottom_line: self.camera.bottom_line(),
        };
        let stats = self.streamer.tick(dt, view)?;
        let stitched = stats.stitched;
        let pruned = stats.pruned.clone();
        if let Some(id) = stitched {
            let template = self
                .streamer
                .get(id)
                .map(|s| s.template().to_string())
                .unwrap_or_default();
            self.push_event(SimEvent::SectionStitched { id, template });
        }
        for id in &pruned {
            self.push_event(SimEvent::SectionPruned { id: *id });
        }

        // 2. Framing from the actors' current positions.
        let framing = self.camera.frame(actors, dt);

        // 3 + 4. One batch: every world-space position moves before anything reads again.
        let shift = {
            let mut targets: Vec<&mut dyn Rebase> = Vec::with_capacity(3 + actors.len());
            targets.push(&mut self.streamer);
            targets.push(&mut self.hazard);
            targets.push(&mut self.camera);
            for actor in actors.iter_mut() {
                targets.push(actor);
            }
            self.rebaser.shift(framing.scroll_delta, &mut targets)
        };
        if let Some(event) = shift {
            tracing::debug!(delta = ?event.delta, "origin shift broadcast");
            self.push_event(SimEvent::OriginShifted { delta: event.delta });
        }

        // 5. Hazard, against the post-shift camera bounds.
        if self.hazard.tick(dt) == HazardStatus::Released {
            self.push_event(SimEvent::HazardReleased);
        }
        self.hazard.catch_up(self.camera.lower_bound(), dt);

        // 6. Pacing, independent of the rest.
        let pacing = self.pacing.tick(dt);
        let mut started = pacing.started.into_iter().peekable();
        for transition in pacing.finished {
            if let Some(begun) = started.next_if_eq(&transition) {
                self.push_event(SimEvent::PacingStarted { transition: begun });
            }
            self.push_event(SimEvent::PacingFinished { transition });
        }
        for transition in started {
            self.push_event(SimEvent::PacingStarted { transition });
        }

        self.tick += 1;
        self.push_event(SimEvent::Ticked { tick: self.tick });

        let report = TickReport {
            tick: self.tick,
            shift,
            stitched,
            pruned,
            framing,
            camera_upper: self.camera.upper_bound(),
            camera_lower: self.camera.lower_bound(),
            bottom_line: self.camera.bottom_line(),
            hazard_position: self.hazard.position(),
            time_scale: self.pacing.scale(),
        };
        tracing::trace!(
            sections = self.streamer.len(),
            hazard = report.hazard_position,
            scale = report.time_scale,
            "tick complete"
        );
        Ok(report)
    }

    /// Deterministic hash of the simulation state for comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vec2| {
            mix(h, &v.x.to_le_bytes());
            mix(h, &v.y.to_le_bytes());
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix_vec(&mut h, self.rebaser.total_offset());
        for section in self.streamer.sections() {
            mix(&mut h, &section.id().0.to_le_bytes());
            mix(&mut h, section.template().as_bytes());
            mix_vec(&mut h, section.entry());
            mix_vec(&mut h, section.exit());
        }
        mix(&mut h, &self.camera.zoom().to_le_bytes());
        mix(&mut h, &self.hazard.position().to_le_bytes());
        mix(&mut h, &self.hazard.speed().to_le_bytes());
        mix(&mut h, &self.pacing.scale().to_le_bytes());
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use descent_common::Bounds;
    use descent_hazard::HazardConfig;
    use descent_stream::SectionTemplate;

    fn template(name: &str, height: f32, own: &str, next: &str) -> SectionTemplate {
        SectionTemplate {
            name: name.into(),
            entry: Vec2::ZERO,
            exit: Vec2::new(0.0, -height),
            bounds: Bounds::new(Vec2::new(-300.0, -height), Vec2::new(300.0, 0.0)),
            tags: [own.to_string()].into_iter().collect(),
            continuations: [next.to_string()].into_iter().collect(),
            scroll_velocity: Vec2::ZERO,
        }
    }

    fn catalog() -> SectionCatalog {
        SectionCatalog::new(vec![
            template("start", 600.0, "start", "shaft"),
            template("shaft_tall", 900.0, "shaft", "shaft"),
            template("shaft_short", 450.0, "shaft", "shaft"),
        ])
    }

    fn sim(seed: u64) -> Simulation {
        let config = DescentConfig {
            seed,
            hazard: HazardConfig {
                wait_time: 0.5,
                ..HazardConfig::default()
            },
            ..DescentConfig::default()
        };
        Simulation::new(config, catalog()).unwrap()
    }

    /// A player climbing at a steady pace.
    fn climb(sim: &mut Simulation, ticks: usize) -> Vec<TickReport> {
        let mut player = [Vec2::new(0.0, 200.0)];
        let mut reports = Vec::new();
        for _ in 0..ticks {
            player[0].y -= 4.0;
            reports.push(sim.tick(1.0 / 60.0, &mut player).unwrap());
        }
        reports
    }

    #[test]
    fn starts_with_one_section_at_view_bottom() {
        let s = sim(1);
        assert_eq!(s.streamer().len(), 1);
        let first = &s.streamer().sections()[0];
        assert_eq!(first.entry().y, s.camera().lower_bound());
        assert_eq!(s.tick_count(), 0);
        assert!(matches!(s.events()[0], SimEvent::SectionStitched { .. }));
    }

    #[test]
    fn invalid_camera_config_is_fatal() {
        let mut config = DescentConfig::default();
        config.camera.viewport = Vec2::ZERO;
        assert!(matches!(
            Simulation::new(config, catalog()),
            Err(SimulationError::Camera(CameraError::MissingViewport { .. }))
        ));
    }

    #[test]
    fn missing_start_template_is_fatal() {
        let mut config = DescentConfig::default();
        config.stream.start_tags = ["void".to_string()].into_iter().collect();
        assert!(matches!(
            Simulation::new(config, catalog()),
            Err(SimulationError::Stream(StreamError::NoMatchingTemplate { .. }))
        ));
    }

    #[test]
    fn climbing_scrolls_the_world_and_streams_sections() {
        let mut s = sim(3);
        let reports = climb(&mut s, 600);

        assert!(reports.iter().any(|r| r.shift.is_some()));
        assert!(s.depth() > 0.0);
        let stitched = reports.iter().filter(|r| r.stitched.is_some()).count();
        assert!(stitched >= 2);
        let pruned: usize = reports.iter().map(|r| r.pruned.len()).sum();
        assert!(pruned >= 1);

        for pair in s.streamer().sections().windows(2) {
            assert_eq!(pair[1].entry(), pair[0].exit());
        }
    }

    #[test]
    fn at_most_one_shift_and_one_stitch_per_tick() {
        let mut s = sim(5);
        s.drain_events();
        climb(&mut s, 300);
        let events = s.drain_events();
        let mut shifts = 0;
        let mut stitches = 0;
        for e in &events {
            match e {
                SimEvent::OriginShifted { .. } => shifts += 1,
                SimEvent::SectionStitched { .. } => stitches += 1,
                SimEvent::Ticked { .. } => {
                    assert!(shifts <= 1 && stitches <= 1);
                    shifts = 0;
                    stitches = 0;
                }
                _ => {}
            }
        }
        assert!(s.events().is_empty());
    }

    #[test]
    fn actors_and_readouts_follow_the_shift() {
        let mut s = sim(9);
        let marker = s.register_readout(Vec2::new(10.0, 0.0));
        let mut actors = [Vec2::new(0.0, -300.0)];
        let before_actor = actors[0];

        let report = s.tick(1.0 / 60.0, &mut actors).unwrap();
        let delta = report.shift.expect("actor high on screen should scroll").delta;

        assert_eq!(actors[0], before_actor + delta);
        assert_eq!(s.readout(marker), Some(Vec2::new(10.0, 0.0) + delta));
        assert_eq!(s.unregister_readout(marker), Some(Vec2::new(10.0, 0.0) + delta));
    }

    #[test]
    fn hazard_release_is_logged_once() {
        let mut s = sim(2);
        climb(&mut s, 120);
        let releases = s
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::HazardReleased))
            .count();
        assert_eq!(releases, 1);
        assert!(!s.hazard().is_waiting());
    }

    #[test]
    fn empty_actor_set_is_not_an_error() {
        let mut s = sim(4);
        for _ in 0..30 {
            s.tick(1.0 / 60.0, &mut []).unwrap();
        }
        assert_eq!(s.tick_count(), 30);
    }

    #[test]
    fn pacing_runs_inside_the_tick() {
        let mut s = sim(6);
        s.pacing_mut().enqueue(TimeScaleTransition::to_scale(0.5, 0.5));
        let mut player = [Vec2::ZERO];
        for _ in 0..120 {
            let dt = s.scaled(1.0 / 60.0);
            s.tick(dt, &mut player).unwrap();
        }
        assert_eq!(s.pacing().scale(), 0.5);
        assert!(s.events().iter().any(|e| matches!(e, SimEvent::PacingStarted { .. })));
        assert!(s.events().iter().any(|e| matches!(e, SimEvent::PacingFinished { .. })));
    }

    #[test]
    fn same_seed_same_state_hash() {
        let mut a = sim(42);
        let mut b = sim(42);
        climb(&mut a, 400);
        climb(&mut b, 400);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = sim(1);
        let mut b = sim(2);
        climb(&mut a, 400);
        climb(&mut b, 400);
        let names = |s: &Simulation| -> Vec<String> {
            s.streamer().sections().iter().map(|x| x.template().to_string()).collect()
        };
        // Section choice is random; the hashes differ unless both chains happen
        // to pick identical templates.
        if names(&a) != names(&b) {
            assert_ne!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn invalid_dt_is_treated_as_zero() {
        let mut s = sim(8);
        let before = s.hazard().position();
        s.tick(f32::NAN, &mut []).unwrap();
        s.tick(-1.0, &mut []).unwrap();
        assert_eq!(s.hazard().position(), before);
    }

    #[test]
    fn hazard_stays_close_below_the_view() {
        let mut s = sim(12);
        let mut player = [Vec2::new(0.0, 200.0)];
        let mut worst = f32::MIN;
        // A minute of climbing at 300 units per second.
        for _ in 0..3_600 {
            player[0].y -= 5.0;
            s.tick(1.0 / 60.0, &mut player).unwrap();
            let gap = s.hazard().position() - s.camera().lower_bound();
            worst = worst.max(gap);
        }
        assert!(worst < 1_000.0, "hazard fell {worst} below the view");
        let gap = s.hazard().position() - s.camera().lower_bound();
        assert!(gap < 700.0, "final gap {gap}");
    }

    #[test]
    fn event_log_is_bounded() {
        let mut s = sim(13);
        let ticks = EVENT_LOG_CAPACITY as u64 + 100;
        for _ in 0..ticks {
            s.tick(1.0 / 60.0, &mut []).unwrap();
        }
        assert_eq!(s.events().len(), EVENT_LOG_CAPACITY);
        assert_eq!(s.events().back(), Some(&SimEvent::Ticked { tick: ticks }));
        assert_eq!(s.drain_events().len(), EVENT_LOG_CAPACITY);
        assert!(s.events().is_empty());
    }
}
