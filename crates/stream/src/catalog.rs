use descent_common::Bounds;
use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::StreamError;

/// Ordered tag set. BTreeSet keeps logs and error messages stable.
pub type TagSet = BTreeSet<String>;

/// Authoring-time description of a section, in local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    pub name: String,
    /// Where the previous section's exit attaches.
    pub entry: Vec2,
    /// Where the next section's entry attaches.
    pub exit: Vec2,
    /// Visible extent of the section.
    pub bounds: Bounds,
    /// Identity tags matched against continuation requests.
    #[serde(default)]
    pub tags: TagSet,
    /// Tags requested for whatever follows this section.
    #[serde(default)]
    pub continuations: TagSet,
    /// Intrinsic drift applied every tick.
    #[serde(default)]
    pub scroll_velocity: Vec2,
}

impl SectionTemplate {
    /// Whether this template answers a request for `tags`.
    pub fn matches(&self, tags: &TagSet) -> bool {
        !self.tags.is_disjoint(tags)
    }

    pub fn is_finite(&self) -> bool {
        self.entry.is_finite()
            && self.exit.is_finite()
            && self.bounds.is_finite()
            && self.scroll_velocity.is_finite()
    }
}

/// Lookup of section templates by continuation tag. Holds no runtime state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionCatalog {
    templates: Vec<SectionTemplate>,
}

impl SectionCatalog {
    pub fn new(templates: Vec<SectionTemplate>) -> Self {
        Self { templates }
    }

    /// Parse a catalog from its JSON form (`{"templates": [...]}`).
    pub fn from_json_str(data: &str) -> Result<Self, StreamError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&data)?;
        tracing::info!(
            path = %path.as_ref().display(),
            templates = catalog.len(),
            "section catalog loaded"
        );
        Ok(catalog)
    }

    pub fn templates(&self) -> &[SectionTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Look a template up by name.
    pub fn get(&self, name: &str) -> Option<&SectionTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Every template whose tags intersect `tags`, in catalog order.
    pub fn matching<'a>(&'a self, tags: &'a TagSet) -> impl Iterator<Item = &'a SectionTemplate> {
        self.templates.iter().filter(move |t| t.matches(tags))
    }

    /// Pick uniformly among the templates matching `tags`.
    pub fn request_next<R: Rng + ?Sized>(
        &self,
        tags: &TagSet,
        rng: &mut R,
    ) -> Result<&SectionTemplate, StreamError> {
        let candidates: Vec<&SectionTemplate> =
            self.templates.iter().filter(|t| t.matches(tags)).collect();
        candidates
            .choose(rng)
            .copied()
            .ok_or_else(|| StreamError::NoMatchingTemplate {
                tags: tags.iter().cloned().collect(),
            })
    }

    /// Check that every template is usable, every continuation request can
    /// be answered, and all templates share one scroll velocity. Returns the
    /// first problem found.
    pub fn validate(&self) -> Result<(), StreamError> {
        let Some(first) = self.templates.first() else {
            return Err(StreamError::EmptyCatalog);
        };
        for t in &self.templates {
            if !t.is_finite() {
                return Err(StreamError::InvalidTemplate {
                    template: t.name.clone(),
                    reason: "non-finite anchor, bounds or velocity",
                });
            }
            // Sections drift by their own velocity; unequal drift opens the seams.
            if t.scroll_velocity != first.scroll_velocity {
                return Err(StreamError::InvalidTemplate {
                    template: t.name.clone(),
                    reason: "scroll velocity differs from the rest of the catalog",
                });
            }
            if t.tags.is_empty() {
                return Err(StreamError::InvalidTemplate {
                    template: t.name.clone(),
                    reason: "no identity tags; it can never be selected",
                });
            }
            if self.matching(&t.continuations).next().is_none() {
                return Err(StreamError::NoMatchingTemplate {
                    tags: t.continuations.iter().cloned().collect(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn tags(names: &[&str]) -> TagSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// A straight vertical shaft: entry at the bottom, exit `height` above it.
    pub(crate) fn shaft(name: &str, height: f32, own: &[&str], next: &[&str]) -> SectionTemplate {
        SectionTemplate {
            name: name.into(),
            entry: Vec2::ZERO,
            exit: Vec2::new(0.0, -height),
            bounds: Bounds::new(Vec2::new(-200.0, -height), Vec2::new(200.0, 0.0)),
            tags: tags(own),
            continuations: tags(next),
            scroll_velocity: Vec2::ZERO,
        }
    }

    fn sample() -> SectionCatalog {
        SectionCatalog::new(vec![
            shaft("start", 600.0, &["start"], &["shaft"]),
            shaft("shaft_a", 800.0, &["shaft"], &["shaft", "ledge"]),
            shaft("shaft_b", 400.0, &["shaft"], &["shaft"]),
            shaft("ledge", 300.0, &["ledge"], &["shaft"]),
        ])
    }

    #[test]
    fn request_only_returns_matching_templates() {
        let catalog = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let t = catalog.request_next(&tags(&["ledge"]), &mut rng).unwrap();
            assert_eq!(t.name, "ledge");
        }
    }

    #[test]
    fn request_picks_every_match_eventually() {
        let catalog = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let t = catalog.request_next(&tags(&["shaft"]), &mut rng).unwrap();
            seen.insert(t.name.clone());
        }
        assert_eq!(seen, tags(&["shaft_a", "shaft_b"]));
    }

    #[test]
    fn request_with_no_match_is_configuration_error() {
        let catalog = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = catalog.request_next(&tags(&["lava_lake"]), &mut rng).unwrap_err();
        assert!(matches!(err, StreamError::NoMatchingTemplate { .. }));
    }

    #[test]
    fn same_seed_same_choices() {
        let catalog = sample();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let ta = catalog.request_next(&tags(&["shaft", "ledge"]), &mut a).unwrap();
            let tb = catalog.request_next(&tags(&["shaft", "ledge"]), &mut b).unwrap();
            assert_eq!(ta.name, tb.name);
        }
    }

    #[test]
    fn validate_accepts_closed_catalog() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_continuation() {
        let catalog = SectionCatalog::new(vec![shaft("a", 100.0, &["a"], &["missing"])]);
        assert!(matches!(
            catalog.validate(),
            Err(StreamError::NoMatchingTemplate { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_finite_template() {
        let mut t = shaft("a", 100.0, &["a"], &["a"]);
        t.exit = Vec2::new(f32::NAN, 0.0);
        let catalog = SectionCatalog::new(vec![t]);
        assert!(matches!(
            catalog.validate(),
            Err(StreamError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_catalog() {
        assert!(matches!(
            SectionCatalog::default().validate(),
            Err(StreamError::EmptyCatalog)
        ));
    }

    #[test]
    fn json_round_trip_from_file() {
        let json = r#"{
            "templates": [
                {
                    "name": "shaft",
                    "entry": [0.0, 0.0],
                    "exit": [0.0, -800.0],
                    "bounds": { "min": [-200.0, -800.0], "max": [200.0, 0.0] },
                    "tags": ["shaft"],
                    "continuations": ["shaft"]
                }
            ]
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, json).unwrap();

        let catalog = SectionCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        let t = catalog.get("shaft").unwrap();
        assert_eq!(t.exit, Vec2::new(0.0, -800.0));
        assert_eq!(t.scroll_velocity, Vec2::ZERO);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn validate_rejects_mixed_scroll_velocities() {
        let mut drifting = shaft("drifting", 500.0, &["shaft"], &["shaft"]);
        drifting.scroll_velocity = Vec2::new(0.0, 10.0);
        let catalog = SectionCatalog::new(vec![
            shaft("start", 600.0, &["start"], &["shaft"]),
            drifting,
        ]);
        match catalog.validate() {
            Err(StreamError::InvalidTemplate { template, .. }) => assert_eq!(template, "drifting"),
            other => panic!("expected InvalidTemplate, got {other:?}"),
        }
    }

    #[test]
    fn requested_template_outlives_the_request_tags() {
        let catalog = sample();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let chosen = {
            let request = tags(&["ledge"]);
            catalog.request_next(&request, &mut rng).unwrap()
        };
        assert_eq!(chosen.name, "ledge");
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            SectionCatalog::from_json_str("{ not json"),
            Err(StreamError::Json(_))
        ));
    }
}
