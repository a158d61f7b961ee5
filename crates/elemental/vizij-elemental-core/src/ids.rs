//! Identifiers and a simple allocator for spawned elements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque handle for one logical element (main slot plus its trail slots).
/// On the wire it is always the `elem-<n>` string.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "elem-{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("elem-")
            .and_then(|n| n.parse().ok())
            .map(ElementId)
            .ok_or_else(|| format!("invalid element id '{s}'"))
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ElementId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Monotonic allocator for ElementId.
/// Ids are never reused within one spawner, so a stale id can only miss.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_element(), ElementId(0));
        assert_eq!(alloc.alloc_element(), ElementId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_element(), ElementId(0));
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(ElementId(7).to_string(), "elem-7");
    }

    #[test]
    fn wire_form_matches_display() {
        let json = serde_json::to_string(&ElementId(3)).unwrap();
        assert_eq!(json, r#""elem-3""#);
        let back: ElementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ElementId(3));
        assert!(serde_json::from_str::<ElementId>("3").is_err());
        assert!("elem-x".parse::<ElementId>().is_err());
    }
}
