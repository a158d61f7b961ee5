//! Spawn request documents (camelCase JSON, shared with the wasm API and fixtures).

use serde::{Deserialize, Serialize};

use crate::animation::AnimationConfig;
use crate::error::Result;
use crate::formation::FormationRef;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnOptions {
    /// Elements per layer unless the layer sets its own count.
    pub count: usize,
    pub mode: ModeSpec,
    /// Model names drawn round-robin; empty means every loaded variant.
    pub models: Vec<String>,
    /// Lifecycle timing; without it elements appear at once and fade via the pool.
    pub animation: Option<AnimationConfig>,
    /// Seconds; used when the host does not drive gesture progress.
    pub gesture_duration: Option<f32>,
    pub seed: Option<u64>,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            count: 1,
            mode: ModeSpec::default(),
            models: Vec::new(),
            animation: None,
            gesture_duration: None,
            seed: None,
        }
    }
}

impl SpawnOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<ModeSpec>) -> Self {
        self.mode = mode.into();
        self
    }

    /// The request as a list of layers; a single formation is one layer.
    pub fn layers(&self) -> Vec<LayerSpec> {
        match &self.mode {
            ModeSpec::Layers(layers) => layers.clone(),
            ModeSpec::Formation(formation) => vec![LayerSpec {
                mode: formation.clone(),
                ..LayerSpec::default()
            }],
        }
    }
}

/// `mode`: a formation (name or spec) or an array of layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeSpec {
    Layers(Vec<LayerSpec>),
    Formation(FormationRef),
}

impl Default for ModeSpec {
    fn default() -> Self {
        ModeSpec::Formation(FormationRef::default())
    }
}

impl From<FormationRef> for ModeSpec {
    fn from(f: FormationRef) -> Self {
        ModeSpec::Formation(f)
    }
}

impl From<&str> for ModeSpec {
    fn from(name: &str) -> Self {
        ModeSpec::Formation(FormationRef::Named(name.to_string()))
    }
}

impl From<Vec<LayerSpec>> for ModeSpec {
    fn from(layers: Vec<LayerSpec>) -> Self {
        ModeSpec::Layers(layers)
    }
}

/// One independently timed formation sharing the type's pool.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerSpec {
    pub mode: FormationRef,
    pub count: Option<usize>,
    pub models: Option<Vec<String>>,
    pub animation: Option<AnimationConfig>,
    pub render_order: Option<i32>,
    pub depth_write: Option<bool>,
    /// Store each element's batch position in its relay attribute.
    pub relay: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::FormationSpec;

    #[test]
    fn mode_accepts_name_spec_or_layers() {
        let o = SpawnOptions::from_json(r#"{ "count": 4, "mode": "orbit" }"#).unwrap();
        assert_eq!(o.layers().len(), 1);
        let o = SpawnOptions::from_json(r#"{ "mode": { "type": "anchor", "landmark": "head" } }"#)
            .unwrap();
        assert!(matches!(
            o.layers()[0].mode.to_spec().unwrap(),
            FormationSpec::Anchor(_)
        ));
        let o = SpawnOptions::from_json(
            r#"{ "mode": [ { "mode": "orbit", "count": 2 }, { "mode": "burst", "renderOrder": 3 } ] }"#,
        )
        .unwrap();
        let layers = o.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].count, Some(2));
        assert_eq!(layers[1].render_order, Some(3));
    }
}
