use glam::Vec2;

/// Region the camera must keep visible: the spread of all tracked actors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusBox {
    pub center: Vec2,
    /// Full size per axis (`max - min`).
    pub extent: Vec2,
}

impl FocusBox {
    /// A zero-extent box at `center`.
    pub fn point(center: Vec2) -> Self {
        Self {
            center,
            extent: Vec2::ZERO,
        }
    }

    /// Mean center and per-axis range of `points`. `None` when empty.
    pub fn around(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (mut min, mut max, mut sum) = (first, first, Vec2::ZERO);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
            sum += *p;
        }
        Some(Self {
            center: sum / points.len() as f32,
            extent: max - min,
        })
    }

    pub fn half_extent(&self) -> Vec2 {
        self.extent * 0.5
    }

    pub fn height(&self) -> f32 {
        self.extent.y
    }

    /// Upper edge (smallest Y).
    pub fn top(&self) -> f32 {
        self.center.y - self.half_extent().y
    }

    /// Lower edge (largest Y).
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_extent().y
    }
}
