//! Shared JSON fixtures for the elemental crates, addressed by name through
//! `fixtures/manifest.json` at the workspace root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    spawns: BTreeMap<String, Entry>,
    surfaces: BTreeMap<String, Entry>,
    geometry: BTreeMap<String, Entry>,
}

/// Either a bare relative path or `{ path, elementType }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Path(String),
    Tagged {
        path: String,
        #[serde(rename = "elementType")]
        element_type: String,
    },
}

impl Entry {
    fn rel(&self) -> &str {
        match self {
            Entry::Path(path) | Entry::Tagged { path, .. } => path,
        }
    }
}

#[derive(Clone, Copy)]
enum Section {
    Spawns,
    Surfaces,
    Geometry,
}

impl Section {
    fn entries(self) -> &'static BTreeMap<String, Entry> {
        match self {
            Section::Spawns => &MANIFEST.spawns,
            Section::Surfaces => &MANIFEST.surfaces,
            Section::Geometry => &MANIFEST.geometry,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Section::Spawns => "spawn",
            Section::Surfaces => "surface",
            Section::Geometry => "geometry",
        }
    }

    fn keys(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn entry(self, name: &str) -> Result<&'static Entry> {
        self.entries()
            .get(name)
            .ok_or_else(|| anyhow!("no {} fixture named '{name}'", self.label()))
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures");
        Ok(root.join(self.entry(name)?.rel()))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    fn load<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("{} fixture '{name}' does not match the target type", self.label()))
    }
}

/// `SpawnOptions` documents.
pub mod spawns {
    use super::*;

    pub fn keys() -> Vec<String> {
        Section::Spawns.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Section::Spawns.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Section::Spawns.load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Section::Spawns.path(name)
    }

    /// Element type the document was written for, when the manifest records one.
    pub fn element_type(name: &str) -> Result<Option<String>> {
        Ok(match Section::Spawns.entry(name)? {
            Entry::Tagged { element_type, .. } => Some(element_type.clone()),
            Entry::Path(_) => None,
        })
    }
}

/// Synthetic mascot surfaces: arrays of `{ position, normal }`.
pub mod surfaces {
    use super::*;

    pub fn keys() -> Vec<String> {
        Section::Surfaces.keys()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Section::Surfaces.load(name)
    }
}

/// `GeometrySet` documents, one per element type.
pub mod geometry {
    use super::*;

    pub fn keys() -> Vec<String> {
        Section::Geometry.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Section::Geometry.text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Section::Geometry.load(name)
    }
}
