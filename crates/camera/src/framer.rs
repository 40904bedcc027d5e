use descent_common::{Padding, normalize};
use descent_origin::Rebase;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::focus::FocusBox;

/// Errors from camera construction. All of them are configuration problems.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("viewport metrics missing or invalid: {width}x{height}")]
    MissingViewport { width: f32, height: f32 },
    #[error("invalid zoom range [{min}, {max}]")]
    InvalidZoomRange { min: f32, max: f32 },
}

/// Camera tunables, loaded as part of the simulation config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Viewport size in world units at zoom 1.
    pub viewport: Vec2,
    /// Fixed camera center.
    pub center: Vec2,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub padding: Padding,
    /// Zoom units per second at full gap.
    pub max_zoom_rate: f32,
    /// World units per second at full scroll demand.
    pub max_scroll_speed: f32,
    /// Distance below the camera's lower bound where the world bottom line sits.
    pub prune_margin: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(1280.0, 720.0),
            center: Vec2::ZERO,
            min_zoom: 1.0,
            max_zoom: 2.0,
            padding: Padding::default(),
            max_zoom_rate: 0.5,
            max_scroll_speed: 600.0,
            prune_margin: 100.0,
        }
    }
}

/// Live camera state. `zoom` is always inside `[min_zoom, max_zoom]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub center: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub padding: Padding,
    pub max_zoom_rate: f32,
}

impl CameraState {
    fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Result of one framing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub focus: FocusBox,
    pub target_zoom: f32,
    pub zoom: f32,
    /// Shift to hand to the origin rebaser this tick.
    pub scroll_delta: Vec2,
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Computes focus, damped zoom and scroll demand from tracked actor positions.
#[derive(Debug, Clone)]
pub struct CameraFramer {
    state: CameraState,
    viewport: Vec2,
    max_scroll_speed: f32,
    prune_margin: f32,
    focus: FocusBox,
    last_center: Option<Vec2>,
}

impl CameraFramer {
    pub fn new(config: &CameraConfig) -> Result<Self, CameraError> {
        let viewport = config.viewport;
        if !(positive(viewport.x) && positive(viewport.y)) {
            return Err(CameraError::MissingViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }
        let (min, max) = (config.min_zoom, config.max_zoom);
        if !(positive(min) && max.is_finite() && min <= max) {
            return Err(CameraError::InvalidZoomRange { min, max });
        }
        Ok(Self {
            state: CameraState {
                center: config.center,
                zoom: min,
                min_zoom: min,
                max_zoom: max,
                padding: config.padding,
                max_zoom_rate: config.max_zoom_rate.max(0.0),
            },
            viewport,
            max_scroll_speed: config.max_scroll_speed.max(0.0),
            prune_margin: config.prune_margin,
            focus: FocusBox::point(config.center),
            last_center: None,
        })
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Focus box from the last framing pass.
    pub fn focus(&self) -> FocusBox {
        self.focus
    }

    /// Half the visible world height at the current zoom.
    fn half_visible_height(&self) -> f32 {
        self.viewport.y / (2.0 * self.state.zoom)
    }

    /// Smallest visible world Y.
    pub fn upper_bound(&self) -> f32 {
        self.state.center.y - self.half_visible_height()
    }

    /// Largest visible world Y.
    pub fn lower_bound(&self) -> f32 {
        self.state.center.y + self.half_visible_height()
    }

    /// Visibility cutoff used for pruning and distance readouts.
    pub fn bottom_line(&self) -> f32 {
        self.lower_bound() + self.prune_margin
    }

    /// Focus box over `actors`. An empty set yields a zero-extent box at the
    /// last known center, or the origin if there has never been one.
    pub fn focus_box(&mut self, actors: &[Vec2]) -> FocusBox {
        let finite: Vec<Vec2> = actors.iter().copied().filter(|p| p.is_finite()).collect();
        if finite.len() != actors.len() {
            tracing::warn!(
                dropped = actors.len() - finite.len(),
                "non-finite actor positions ignored"
            );
        }
        match FocusBox::around(&finite) {
            Some(focus) => {
                self.last_center = Some(focus.center);
                focus
            }
            None => {
                tracing::trace!("no tracked actors; holding focus at last center");
                FocusBox::point(self.last_center.unwrap_or(Vec2::ZERO))
            }
        }
    }

    /// Zoom that fits the focus box plus padding into the viewport height.
    pub fn target_zoom(&self, focus: &FocusBox, padding: Padding) -> f32 {
        let mut coverage = focus.height().abs() + padding.top + padding.bottom;
        if coverage.is_nan() || coverage <= 0.0 {
            coverage = 1.0;
        }
        self.state.clamp_zoom(self.viewport.y / coverage)
    }

    /// Move `current` toward `target` at a rate proportional to the gap,
    /// saturating at `max_rate` once the gap reaches `min_zoom`.
    pub fn step_zoom(&self, current: f32, target: f32, max_rate: f32, dt: f32) -> f32 {
        let gap = ((target - current) / self.state.min_zoom).clamp(-1.0, 1.0);
        self.state.clamp_zoom(current + gap * max_rate * dt)
    }

    /// Scroll demand for this tick, as a world shift along Y.
    pub fn scroll_delta(&self, dt: f32) -> Vec2 {
        let upper = self.upper_bound();
        let lower = self.lower_bound();
        let gap = lower - self.state.padding.look_behind() - self.focus.bottom();
        let dist = normalize(gap, upper, lower);
        Vec2::new(0.0, self.max_scroll_speed * dist * dt)
    }

    /// Run one framing pass: focus, target zoom, damped zoom step, scroll delta.
    pub fn frame(&mut self, actors: &[Vec2], dt: f32) -> Framing {
        let focus = self.focus_box(actors);
        self.focus = focus;
        let target = self.target_zoom(&focus, self.state.padding);
        self.state.zoom = self.step_zoom(self.state.zoom, target, self.state.max_zoom_rate, dt);
        let scroll_delta = self.scroll_delta(dt);

        tracing::trace!(
            zoom = self.state.zoom,
            target,
            focus_height = focus.height(),
            scroll = scroll_delta.y,
            "camera framed"
        );

        Framing {
            focus,
            target_zoom: target,
            zoom: self.state.zoom,
            scroll_delta,
        }
    }
}

impl Rebase for CameraFramer {
    /// The camera itself stays put; only the remembered world-space focus follows.
    fn rebase(&mut self, delta: Vec2) {
        self.focus.center += delta;
        if let Some(c) = self.last_center.as_mut() {
            *c += delta;
        }
    }
}
