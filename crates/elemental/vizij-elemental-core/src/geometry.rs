//! Geometry/material hand-off from the host.
//!
//! Loading is the host's business; the core only needs the named variants of
//! an element type merged into one drawable batch where every vertex carries
//! the index of the variant it came from. Instances select a variant through
//! their `model_index` attribute.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// One named mesh for an element type (e.g. "ember").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryVariant {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub indices: Vec<u32>,
}

/// Opaque handle to the shared material owned by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub String);

/// Everything the host supplies for one element type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySet {
    pub variants: Vec<GeometryVariant>,
    #[serde(default)]
    pub material: MaterialHandle,
}

/// All variants of one type concatenated into a single vertex/index stream.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Per-vertex variant index.
    pub variant_tags: Vec<f32>,
    pub variant_names: Vec<String>,
}

impl MergedGeometry {
    /// `None` when there is nothing to draw.
    pub fn merge(variants: &[GeometryVariant]) -> Option<Self> {
        let usable: Vec<&GeometryVariant> =
            variants.iter().filter(|v| !v.positions.is_empty()).collect();
        if usable.is_empty() {
            return None;
        }
        let vertices: usize = usable.iter().map(|v| v.positions.len()).sum();
        let mut merged = MergedGeometry {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::new(),
            variant_tags: Vec::with_capacity(vertices),
            variant_names: Vec::with_capacity(usable.len()),
        };
        for (tag, v) in usable.into_iter().enumerate() {
            let base = merged.positions.len() as u32;
            merged.positions.extend_from_slice(&v.positions);
            if v.normals.len() == v.positions.len() {
                merged.normals.extend_from_slice(&v.normals);
            } else {
                merged
                    .normals
                    .extend(std::iter::repeat([0.0, 1.0, 0.0]).take(v.positions.len()));
            }
            if v.indices.is_empty() {
                merged
                    .indices
                    .extend(base..base + v.positions.len() as u32);
            } else {
                merged.indices.extend(v.indices.iter().map(|i| i + base));
            }
            merged
                .variant_tags
                .extend(std::iter::repeat(tag as f32).take(v.positions.len()));
            merged.variant_names.push(v.name.clone());
        }
        Some(merged)
    }

    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variant_names.iter().position(|n| n == name)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Result of asking the provider for a type's geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryLoad {
    /// Finished; `None` means the load failed and the type stays unavailable.
    Ready(Option<GeometrySet>),
    Pending,
}

/// Source of per-type geometry. `request` starts a load, `poll` checks it;
/// the spawner calls `request` once per type and `poll` each frame until ready.
pub trait GeometryProvider {
    fn request(&mut self, element_type: &str) -> GeometryLoad;
    fn poll(&mut self, element_type: &str) -> GeometryLoad;
}

/// In-memory provider: registered sets are ready at once, unknown types
/// stay pending until registered or failed.
#[derive(Debug, Default)]
pub struct StaticGeometryProvider {
    sets: HashMap<String, GeometrySet>,
    failed: HashSet<String>,
    requests: HashMap<String, usize>,
}

impl StaticGeometryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, element_type: impl Into<String>, set: GeometrySet) {
        let ty = element_type.into();
        self.failed.remove(&ty);
        self.sets.insert(ty, set);
    }

    pub fn with(mut self, element_type: impl Into<String>, set: GeometrySet) -> Self {
        self.register(element_type, set);
        self
    }

    /// Resolve pending and future loads for `element_type` as failures.
    pub fn fail(&mut self, element_type: impl Into<String>) {
        let ty = element_type.into();
        self.sets.remove(&ty);
        self.failed.insert(ty);
    }

    /// Number of `request` calls seen for a type.
    pub fn request_count(&self, element_type: &str) -> usize {
        self.requests.get(element_type).copied().unwrap_or(0)
    }

    fn lookup(&self, element_type: &str) -> GeometryLoad {
        if let Some(set) = self.sets.get(element_type) {
            GeometryLoad::Ready(Some(set.clone()))
        } else if self.failed.contains(element_type) {
            GeometryLoad::Ready(None)
        } else {
            GeometryLoad::Pending
        }
    }
}

impl GeometryProvider for StaticGeometryProvider {
    fn request(&mut self, element_type: &str) -> GeometryLoad {
        *self.requests.entry(element_type.to_string()).or_insert(0) += 1;
        self.lookup(element_type)
    }

    fn poll(&mut self, element_type: &str) -> GeometryLoad {
        self.lookup(element_type)
    }
}

/// Unit quad variant named `name`; handy for hosts without real meshes.
pub fn quad_variant(name: impl Into<String>) -> GeometryVariant {
    GeometryVariant {
        name: name.into(),
        positions: vec![
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_tags_vertices_by_variant() {
        let merged = MergedGeometry::merge(&[quad_variant("a"), quad_variant("b")]).unwrap();
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(merged.variant_tags[3], 0.0);
        assert_eq!(merged.variant_tags[4], 1.0);
        assert_eq!(merged.indices[6], 4);
        assert_eq!(merged.variant_index("b"), Some(1));
    }

    #[test]
    fn empty_merge_is_a_failure() {
        assert!(MergedGeometry::merge(&[]).is_none());
        assert!(MergedGeometry::merge(&[GeometryVariant::default()]).is_none());
    }

    #[test]
    fn static_provider_counts_requests() {
        let mut p = StaticGeometryProvider::new();
        assert_eq!(p.request("fire"), GeometryLoad::Pending);
        p.fail("fire");
        assert_eq!(p.poll("fire"), GeometryLoad::Ready(None));
        assert_eq!(p.request_count("fire"), 1);
    }
}
