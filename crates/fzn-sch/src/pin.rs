use std::fmt;

use fzn_parts::COMMON_PIN_ID;

/// Who a pin belongs to. Net labels and ground are virtual owners that let
/// symbols placed apart from each other join the same net.
///
/// Variant order is significant: it fixes the canonical order of edges and
/// net members, and therefore which net label names a merged net.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PinOwner {
    Instance(String),
    NetLabel(String),
    Ground,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinRef {
    pub owner: PinOwner,
    pub pin_id: String,
}

/// Undirected edge, always stored with the smaller endpoint first.
pub type Edge = (PinRef, PinRef);

impl PinRef {
    pub fn instance(instance_id: impl Into<String>, pin_id: impl Into<String>) -> Self {
        Self {
            owner: PinOwner::Instance(instance_id.into()),
            pin_id: pin_id.into(),
        }
    }

    /// The shared touch-point of wires, net label symbols and ground symbols.
    pub fn common(instance_id: impl Into<String>) -> Self {
        Self::instance(instance_id, COMMON_PIN_ID)
    }

    pub fn net_label(text: impl Into<String>) -> Self {
        Self {
            owner: PinOwner::NetLabel(text.into()),
            pin_id: COMMON_PIN_ID.to_string(),
        }
    }

    pub fn ground() -> Self {
        Self {
            owner: PinOwner::Ground,
            pin_id: COMMON_PIN_ID.to_string(),
        }
    }

    pub fn instance_id(&self) -> Option<&str> {
        match &self.owner {
            PinOwner::Instance(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        !matches!(self.owner, PinOwner::Instance(_))
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            PinOwner::Instance(id) => write!(f, "{id}.{}", self.pin_id),
            PinOwner::NetLabel(text) => write!(f, "label:{text}"),
            PinOwner::Ground => f.write_str("ground"),
        }
    }
}

/// Order the endpoints so that `(a, b)` and `(b, a)` become the same edge.
pub fn canonical_edge(a: PinRef, b: PinRef) -> Edge {
    if a <= b { (a, b) } else { (b, a) }
}
