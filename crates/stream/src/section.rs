use descent_common::{Bounds, SectionId};
use descent_origin::Rebase;
use glam::Vec2;

use crate::catalog::{SectionTemplate, TagSet};
use crate::error::StitchError;

/// A live section in world space.
///
/// Anchors and bounds are stored in world coordinates rather than as an
/// origin plus local offsets. Stitching assigns the entry anchor the exact
/// value of the previous exit, so the two stay bit-identical through every
/// later shift (both receive the same addition).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: SectionId,
    template: String,
    entry: Vec2,
    exit: Vec2,
    bounds: Bounds,
    continuations: TagSet,
    velocity: Vec2,
}

impl Section {
    /// Instantiate a template at its local coordinates.
    pub fn from_template(id: SectionId, template: &SectionTemplate) -> Result<Self, StitchError> {
        if !template.is_finite() {
            return Err(StitchError::NonFiniteTemplate {
                template: template.name.clone(),
            });
        }
        Ok(Self {
            id,
            template: template.name.clone(),
            entry: template.entry,
            exit: template.exit,
            bounds: template.bounds,
            continuations: template.continuations.clone(),
            velocity: template.scroll_velocity,
        })
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Name of the template this section was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn entry(&self) -> Vec2 {
        self.entry
    }

    pub fn exit(&self) -> Vec2 {
        self.exit
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Upper visibility bound (smallest world Y of the section).
    pub fn upper_bound(&self) -> f32 {
        self.bounds.top()
    }

    pub fn continuations(&self) -> &TagSet {
        &self.continuations
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Move the section so its entry anchor lands exactly on `anchor`.
    pub fn place_entry_at(&mut self, anchor: Vec2) {
        let offset = anchor - self.entry;
        self.exit += offset;
        self.bounds = self.bounds.translated(offset);
        self.entry = anchor;
    }

    /// Drift by the intrinsic scroll velocity. Neighbours with a different
    /// velocity separate at the seam.
    pub fn advance(&mut self, dt: f32) {
        let step = self.velocity * dt;
        if step != Vec2::ZERO {
            self.translate(step);
        }
    }

    fn translate(&mut self, delta: Vec2) {
        self.entry += delta;
        self.exit += delta;
        self.bounds = self.bounds.translated(delta);
    }
}

impl Rebase for Section {
    fn rebase(&mut self, delta: Vec2) {
        self.translate(delta);
    }
}

/// Attach `new` to the end of `previous`: `new`'s entry anchor becomes
/// exactly `previous`'s exit anchor.
pub fn stitch(new: &mut Section, previous: &Section) -> Result<(), StitchError> {
    let exit = previous.exit();
    if !exit.is_finite() {
        return Err(StitchError::MissingExit { exit });
    }
    new.place_entry_at(exit);
    tracing::debug!(
        id = %new.id,
        template = %new.template,
        previous = %previous.id,
        ?exit,
        "section stitched"
    );
    Ok(())
}
