//! Events reported by `Spawner::update`.
//!
//! Adapters forward these to the host (Bevy events, JS arrays); the core
//! never acts on them itself.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Serialized as `{ "type": "elementRemoved", "elementType": "fire", "id": "elem-3" }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum SpawnerEvent {
    /// Geometry arrived and the type's pool was built.
    #[serde(rename_all = "camelCase")]
    PoolReady { element_type: String, capacity: usize },
    /// Geometry failed to load; spawns for the type are no-ops.
    #[serde(rename_all = "camelCase")]
    PoolUnavailable { element_type: String },
    /// A spawn that was waiting for its pool has been carried out.
    #[serde(rename_all = "camelCase")]
    Spawned {
        element_type: String,
        ids: Vec<ElementId>,
    },
    #[serde(rename_all = "camelCase")]
    ElementRemoved { element_type: String, id: ElementId },
}

impl SpawnerEvent {
    pub fn element_type(&self) -> &str {
        match self {
            SpawnerEvent::PoolReady { element_type, .. }
            | SpawnerEvent::PoolUnavailable { element_type }
            | SpawnerEvent::Spawned { element_type, .. }
            | SpawnerEvent::ElementRemoved { element_type, .. } => element_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_camel_case_and_string_ids() {
        let ev = SpawnerEvent::ElementRemoved {
            element_type: "fire".into(),
            id: ElementId(3),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "type": "elementRemoved", "elementType": "fire", "id": "elem-3" })
        );
        let back: SpawnerEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, ev);
    }
}
