//! Pin-level adjacency of a schematic.
//!
//! Walks every schematic-visible instance once, resolving ordinary parts
//! and handing out designators as it goes, and records each declared
//! connection as an undirected edge between two [`PinRef`]s. Wires, net
//! labels and ground symbols are kept in the graph as single-pin
//! pseudo-elements so that everything they touch ends up in one net.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use fzn_parts::{COMMON_PIN_ID, GROUND_PART_ID, Resolver};

use crate::Result;
use crate::document::{InstanceDecl, SketchDocument, is_schematic_layer};
use crate::pin::{Edge, PinRef, canonical_edge};
use crate::schematic::PartInstance;

pub const WIRE_MODULE_ID: &str = "WireModuleID";
pub const NET_LABEL_MODULE_IDS: &[&str] = &["NetLabelModuleID", "LeftNetLabelModuleID"];

/// Property holding the text of a net label symbol.
pub const NET_LABEL_PROPERTY: &str = "label";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Wire,
    NetLabel,
    Ground,
    Part,
}

impl InstanceKind {
    pub fn classify(module_id: &str) -> Self {
        if module_id == WIRE_MODULE_ID {
            InstanceKind::Wire
        } else if NET_LABEL_MODULE_IDS.contains(&module_id) {
            InstanceKind::NetLabel
        } else if module_id == GROUND_PART_ID {
            InstanceKind::Ground
        } else {
            InstanceKind::Part
        }
    }

    pub fn is_pseudo(self) -> bool {
        self != InstanceKind::Part
    }

    /// Pseudo-elements expose a single pin no matter which connector was hit.
    fn pin_id(self, connector_id: &str) -> &str {
        if self.is_pseudo() {
            COMMON_PIN_ID
        } else {
            connector_id
        }
    }
}

#[derive(Debug, Default)]
pub struct Adjacency {
    pub edges: BTreeSet<Edge>,
    /// Ordinary parts with at least one drawn connection, by instance id.
    pub instances: BTreeMap<String, PartInstance>,
}

/// A connector or connect without a layer is assumed to be on the view it
/// was declared in.
fn on_schematic(layer: Option<&str>) -> bool {
    layer.is_none_or(is_schematic_layer)
}

fn net_label_text(instance: &InstanceDecl) -> Option<&str> {
    instance
        .properties
        .get(NET_LABEL_PROPERTY)
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .or(instance.title.as_deref())
}

pub fn build_adjacency(document: &SketchDocument, resolver: &mut Resolver) -> Result<Adjacency> {
    let visible: Vec<_> = document
        .instances
        .iter()
        .filter_map(|inst| {
            let view = inst.schematic()?;
            Some((inst, view, InstanceKind::classify(&inst.module_id)))
        })
        .collect();
    let kinds: HashMap<&str, InstanceKind> = visible
        .iter()
        .map(|(inst, _, kind)| (inst.instance_id.as_str(), *kind))
        .collect();

    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut candidates = Vec::new();
    let mut edges = BTreeSet::new();

    for &(inst, view, kind) in &visible {
        let id = inst.instance_id.as_str();
        match kind {
            InstanceKind::Part => {
                let part = resolver.resolve(&inst.module_id, &inst.properties)?;
                let prefix = part.designator_prefix().to_string();
                let counter = counters.entry(prefix.clone()).or_default();
                *counter += 1;
                candidates.push(PartInstance {
                    instance_id: id.to_string(),
                    designator: format!("{prefix}{counter}"),
                    part,
                });
            }
            InstanceKind::NetLabel => match net_label_text(inst) {
                Some(text) => {
                    edges.insert(canonical_edge(PinRef::common(id), PinRef::net_label(text)));
                }
                None => log::warn!("Net label {id} has no text; it only joins what is wired to it"),
            },
            InstanceKind::Ground => {
                edges.insert(canonical_edge(PinRef::common(id), PinRef::ground()));
            }
            InstanceKind::Wire => {}
        }

        for connector in &view.connectors {
            if !on_schematic(connector.layer.as_deref()) {
                continue;
            }
            let near = PinRef::instance(id, kind.pin_id(&connector.connector_id));
            for connect in &connector.connects {
                if !on_schematic(connect.layer.as_deref()) {
                    continue;
                }
                let Some(far_kind) = kinds.get(connect.instance_id.as_str()) else {
                    log::debug!(
                        "Dropping connection {near} -> {}.{}: target is not on the schematic",
                        connect.instance_id,
                        connect.connector_id
                    );
                    continue;
                };
                let far = PinRef::instance(
                    connect.instance_id.as_str(),
                    far_kind.pin_id(&connect.connector_id),
                );
                edges.insert(canonical_edge(near.clone(), far));
            }
        }
    }

    // Virtual edges never touch a part pin, so any edge end naming a part
    // is a drawn connection.
    let connected: HashSet<&str> = edges
        .iter()
        .flat_map(|(a, b)| [a, b])
        .filter_map(PinRef::instance_id)
        .collect();

    let mut instances = BTreeMap::new();
    for instance in candidates {
        if connected.contains(instance.instance_id.as_str()) {
            instances.insert(instance.instance_id.clone(), instance);
        } else {
            log::debug!(
                "Dropping {} ({}): no connections",
                instance.designator,
                instance.instance_id
            );
        }
    }

    Ok(Adjacency { edges, instances })
}
