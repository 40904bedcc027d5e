use std::time::{Duration, Instant};

use descent_common::SectionId;
use descent_origin::Rebase;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{SectionCatalog, TagSet};
use crate::error::{StitchError, StreamError};
use crate::section::{Section, stitch};

/// Streaming configuration: how far ahead the chain must reach, and where it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Tags requested for the very first section.
    pub start_tags: TagSet,
    /// Minimum chain length that must exist above the camera's upper bound.
    /// Falling short stitches one new section.
    pub spawn_threshold: f32,
    /// Hard cap on live sections; extension pauses while it is reached.
    pub max_active: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            start_tags: ["start".to_string()].into_iter().collect(),
            spawn_threshold: 400.0,
            max_active: 32,
        }
    }
}

/// The camera-derived lines the streamer measures against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamView {
    /// Camera upper bound (smallest visible Y).
    pub upper: f32,
    /// World bottom line; sections entirely below it are pruned.
    pub bottom_line: f32,
}

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub stitched: Option<SectionId>,
    pub pruned: Vec<SectionId>,
    pub active_sections: usize,
    /// Chain length above the camera upper bound after this tick.
    pub remaining: f32,
    /// Stitch attempts skipped since the streamer was created.
    pub stitch_failures: u64,
    pub frame_time: Duration,
}

/// Owns the ordered chain of live sections.
///
/// The chain runs from the oldest section (front, lowest on screen) to the
/// tail (back), which every new section is stitched onto.
pub struct WorldStreamer {
    pub config: StreamConfig,
    catalog: SectionCatalog,
    sections: Vec<Section>,
    next_id: SectionId,
    rng: ChaCha8Rng,
    stitch_failures: u64,
    stats: StreamStats,
}

impl WorldStreamer {
    pub fn new(
        config: StreamConfig,
        catalog: SectionCatalog,
        seed: u64,
    ) -> Result<Self, StreamError> {
        if catalog.is_empty() {
            return Err(StreamError::EmptyCatalog);
        }
        Ok(Self {
            config,
            catalog,
            sections: Vec::new(),
            next_id: SectionId(0),
            rng: ChaCha8Rng::seed_from_u64(seed),
            stitch_failures: 0,
            stats: StreamStats::default(),
        })
    }

    /// Drop any existing chain and start a new one with its entry at `origin`.
    pub fn init(&mut self, origin: Vec2) -> Result<SectionId, StreamError> {
        self.sections.clear();
        let template = self.catalog.request_next(&self.config.start_tags, &mut self.rng)?;
        let id = self.next_id;
        let mut section =
            Section::from_template(id, template).map_err(|e| unusable(&template.name, &e))?;
        section.place_entry_at(origin);
        self.next_id = id.next();
        tracing::info!(%id, template = section.template(), ?origin, "stream initialized");
        self.sections.push(section);
        Ok(id)
    }

    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    /// Live sections, oldest first.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    /// The newest section, where the next stitch attaches.
    pub fn tail(&self) -> Option<&Section> {
        self.sections.last()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Statistics from the last tick.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// How much chain exists above `upper`. Negative when the tail's exit is
    /// already on screen.
    pub fn remaining_length(&self, upper: f32) -> f32 {
        self.tail().map_or(f32::NEG_INFINITY, |t| upper - t.exit().y)
    }

    /// Choose the next template for `tags`, uniformly among matches.
    pub fn request_next(&mut self, tags: &TagSet) -> Result<Section, StreamError> {
        let template = self.catalog.request_next(tags, &mut self.rng)?;
        match Section::from_template(self.next_id, template) {
            Ok(section) => {
                self.next_id = self.next_id.next();
                Ok(section)
            }
            Err(e) => Err(unusable(&template.name, &e)),
        }
    }

    /// Advance, extend and prune the chain for one tick.
    ///
    /// Catalog failures propagate. Stitch failures are logged and the
    /// extension is retried on the next tick.
    pub fn tick(&mut self, dt: f32, view: StreamView) -> Result<&StreamStats, StreamError> {
        let _span = tracing::info_span!("stream_tick").entered();
        let frame_start = Instant::now();

        if self.sections.is_empty() {
            return Err(StreamError::NotInitialized);
        }

        for section in &mut self.sections {
            section.advance(dt);
        }

        // Mark first, remove at the end of the tick. The tail is never pruned:
        // it is the only anchor the chain can continue from.
        let tail_index = self.sections.len() - 1;
        let doomed: Vec<SectionId> = self
            .sections
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != tail_index && s.upper_bound() > view.bottom_line)
            .map(|(_, s)| s.id())
            .collect();

        let stitched = self.extend(view.upper)?;

        if !doomed.is_empty() {
            self.sections.retain(|s| !doomed.contains(&s.id()));
            for id in &doomed {
                tracing::debug!(%id, bottom_line = view.bottom_line, "section pruned");
            }
        }

        self.stats = StreamStats {
            stitched,
            pruned: doomed,
            active_sections: self.sections.len(),
            remaining: self.remaining_length(view.upper),
            stitch_failures: self.stitch_failures,
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            stitched = stitched.map(|id| id.0),
            pruned = self.stats.pruned.len(),
            active = self.stats.active_sections,
            remaining = self.stats.remaining,
            "stream tick complete"
        );

        Ok(&self.stats)
    }

    /// Stitch one section if the chain is too short above `upper`.
    fn extend(&mut self, upper: f32) -> Result<Option<SectionId>, StreamError> {
        if self.remaining_length(upper) >= self.config.spawn_threshold {
            return Ok(None);
        }
        if self.sections.len() >= self.config.max_active {
            tracing::debug!(max = self.config.max_active, "section cap reached; extension paused");
            return Ok(None);
        }
        let Some(tail) = self.sections.last() else {
            return Err(StreamError::NotInitialized);
        };
        let tags = tail.continuations().clone();

        let mut section = match self.request_next(&tags) {
            Ok(section) => section,
            Err(StreamError::InvalidTemplate { template, reason }) => {
                self.stitch_failures += 1;
                tracing::warn!(%template, reason, "template unusable; extension skipped this tick");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(tail) = self.sections.last() else {
            return Err(StreamError::NotInitialized);
        };
        match stitch(&mut section, tail) {
            Ok(()) => {
                let id = section.id();
                self.sections.push(section);
                Ok(Some(id))
            }
            Err(e) => {
                self.stitch_failures += 1;
                tracing::warn!(error = %e, "stitch failed; extension skipped this tick");
                Ok(None)
            }
        }
    }
}

fn unusable(template: &str, err: &StitchError) -> StreamError {
    StreamError::InvalidTemplate {
        template: template.to_string(),
        reason: match err {
            StitchError::NonFiniteTemplate { .. } => "non-finite anchor or bounds",
            StitchError::MissingExit { .. } => "unusable exit anchor",
        },
    }
}

impl Rebase for WorldStreamer {
    fn rebase(&mut self, delta: Vec2) {
        for section in &mut self.sections {
            section.rebase(delta);
        }
    }
}
