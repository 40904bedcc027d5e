use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for a streamed section.
///
/// Ids are handed out sequentially by the streamer so that a seeded run
/// produces the same ids every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub u64);

impl SectionId {
    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Axis-aligned rectangle in world space.
///
/// `min` is the top-left corner (smallest Y), `max` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Upper edge (smallest Y).
    pub fn top(&self) -> f32 {
        self.min.y
    }

    /// Lower edge (largest Y).
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Same rectangle moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Vertical framing padding around the focus box.
///
/// `top` is the look-ahead margin above the tracked actors, `bottom` the
/// look-behind margin below them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn look_ahead(&self) -> f32 {
        self.top
    }

    pub fn look_behind(&self) -> f32 {
        self.bottom
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 100.0,
            bottom: 100.0,
        }
    }
}
