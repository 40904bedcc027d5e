use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that tracks a world-space position and must follow origin shifts.
pub trait Rebase {
    /// Translate every tracked position by `delta`.
    fn rebase(&mut self, delta: Vec2);
}

impl Rebase for Vec2 {
    fn rebase(&mut self, delta: Vec2) {
        *self += delta;
    }
}

/// Handle for a readout point registered with the rebaser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

/// A shift broadcast during one tick. Zero or one per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginShiftEvent {
    pub delta: Vec2,
}

/// Single broadcast channel for origin shifts.
///
/// Two kinds of subscribers are served by one [`shift`](Self::shift) call:
/// components passed in as `&mut dyn Rebase` (the streamer, the hazard front)
/// and lightweight readout points registered here by id (UI markers, depth
/// gauges). Registered points use a BTreeMap so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct OriginRebaser {
    points: BTreeMap<SubscriberId, Vec2>,
    next_id: u64,
    total_offset: Vec2,
    shift_count: u64,
}

impl OriginRebaser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a readout point at `position`. Returns its handle.
    pub fn register(&mut self, position: Vec2) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.points.insert(id, position);
        tracing::debug!(?id, ?position, "origin subscriber registered");
        id
    }

    /// Remove a readout point. Returns its last position if it existed.
    pub fn unregister(&mut self, id: SubscriberId) -> Option<Vec2> {
        let removed = self.points.remove(&id);
        if removed.is_some() {
            tracing::debug!(?id, "origin subscriber unregistered");
        }
        removed
    }

    /// Current position of a registered readout point.
    pub fn position(&self, id: SubscriberId) -> Option<Vec2> {
        self.points.get(&id).copied()
    }

    /// Overwrite a registered point's position (the owner moved it).
    pub fn set_position(&mut self, id: SubscriberId, position: Vec2) -> bool {
        match self.points.get_mut(&id) {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    /// Number of registered readout points.
    pub fn subscriber_count(&self) -> usize {
        self.points.len()
    }

    /// Sum of every delta applied so far.
    ///
    /// Adding this to a current position recovers the position in the
    /// original, unshifted frame.
    pub fn total_offset(&self) -> Vec2 {
        self.total_offset
    }

    /// Number of shifts broadcast so far.
    pub fn shift_count(&self) -> u64 {
        self.shift_count
    }

    /// Apply `delta` to every target and every registered point.
    ///
    /// Returns `None` when nothing was shifted: a zero delta, or a non-finite
    /// one (which is logged and dropped rather than poisoning every position).
    pub fn shift(
        &mut self,
        delta: Vec2,
        targets: &mut [&mut dyn Rebase],
    ) -> Option<OriginShiftEvent> {
        if !delta.is_finite() {
            tracing::warn!(?delta, "non-finite origin shift dropped");
            return None;
        }
        if delta == Vec2::ZERO {
            return None;
        }

        for target in targets.iter_mut() {
            target.rebase(delta);
        }
        for point in self.points.values_mut() {
            point.rebase(delta);
        }
        self.total_offset += delta;
        self.shift_count += 1;

        tracing::trace!(
            ?delta,
            targets = targets.len(),
            points = self.points.len(),
            "origin shifted"
        );
        Some(OriginShiftEvent { delta })
    }
}
