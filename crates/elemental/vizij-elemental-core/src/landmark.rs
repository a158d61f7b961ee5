//! Named reference points on the mascot.
//!
//! Offsets are vertical and expressed in mascot-radius units, so a landmark
//! resolved once stays valid while the mascot is rescaled.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Resolves a landmark name (e.g. "head") to a vertical offset.
pub trait LandmarkResolver {
    fn resolve(&self, name: &str) -> Option<f32>;

    /// Resolve with a caller-supplied fallback for unknown names.
    fn resolve_or(&self, name: &str, default: f32) -> f32 {
        match self.resolve(name) {
            Some(v) => v,
            None => {
                log::debug!("landmark '{name}' unresolved, using {default}");
                default
            }
        }
    }
}

impl<F> LandmarkResolver for F
where
    F: Fn(&str) -> Option<f32>,
{
    fn resolve(&self, name: &str) -> Option<f32> {
        self(name)
    }
}

/// Landmark given either as a literal offset or by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandmarkRef {
    Offset(f32),
    Named(String),
}

impl LandmarkRef {
    pub fn resolve(&self, resolver: &dyn LandmarkResolver, default: f32) -> f32 {
        match self {
            LandmarkRef::Offset(v) => *v,
            LandmarkRef::Named(name) => resolver.resolve_or(name, default),
        }
    }
}

impl Default for LandmarkRef {
    fn default() -> Self {
        LandmarkRef::Offset(0.0)
    }
}

impl From<f32> for LandmarkRef {
    fn from(v: f32) -> Self {
        LandmarkRef::Offset(v)
    }
}

impl From<&str> for LandmarkRef {
    fn from(name: &str) -> Self {
        LandmarkRef::Named(name.to_string())
    }
}

/// Resolve an optional landmark, falling back to `default` when absent.
pub fn resolve_opt(lm: Option<&LandmarkRef>, resolver: &dyn LandmarkResolver, default: f32) -> f32 {
    lm.map(|l| l.resolve(resolver, default)).unwrap_or(default)
}

/// Mutable name → offset table; the spawner's default resolver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LandmarkTable {
    offsets: HashMap<String, f32>,
}

impl Default for LandmarkTable {
    fn default() -> Self {
        let mut offsets = HashMap::new();
        for (name, v) in [
            ("feet", -1.0),
            ("base", -0.8),
            ("center", 0.0),
            ("chest", 0.2),
            ("head", 0.6),
            ("crown", 0.9),
            ("top", 1.0),
        ] {
            offsets.insert(name.to_string(), v);
        }
        Self { offsets }
    }
}

impl LandmarkTable {
    pub fn empty() -> Self {
        Self {
            offsets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, offset: f32) {
        self.offsets.insert(name.into(), offset);
    }

    pub fn extend<I: IntoIterator<Item = (String, f32)>>(&mut self, items: I) {
        self.offsets.extend(items);
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl LandmarkResolver for LandmarkTable {
    fn resolve(&self, name: &str) -> Option<f32> {
        self.offsets.get(name).copied()
    }
}
