use std::collections::BTreeMap;

use fzn_parts::Part;

use crate::adjacency::Adjacency;
use crate::pin::{PinOwner, PinRef};
use crate::schematic::{Connection, Node, NodeId, Schematic};

/// Name of a net as given by the first label or ground owner among its
/// members. Members are sorted, so this is deterministic.
fn net_label(component: &[PinRef]) -> Option<String> {
    let mut labels = component.iter().filter_map(|pin| match &pin.owner {
        PinOwner::NetLabel(text) => Some(text.as_str()),
        PinOwner::Ground => Some(Part::ground().short_name()),
        PinOwner::Instance(_) => None,
    });

    let first = labels.next()?;
    for other in labels.filter(|other| *other != first) {
        log::debug!("Net '{first}' is also labeled '{other}'");
    }
    Some(first.to_string())
}

/// Turn coalesced components into numbered nets over real part pins.
///
/// Pins of wires, labels and ground symbols are dropped; components left
/// without a part pin are discarded and do not consume a node number.
pub fn assemble(adjacency: Adjacency, components: Vec<Vec<PinRef>>) -> Schematic {
    let Adjacency { instances, .. } = adjacency;

    let mut nodes = BTreeMap::new();
    for component in components {
        let connections: Vec<Connection> = component
            .iter()
            .filter_map(|pin| {
                let instance_id = pin.instance_id()?;
                instances.contains_key(instance_id).then(|| Connection {
                    instance_id: instance_id.to_string(),
                    pin_id: pin.pin_id.clone(),
                })
            })
            .collect();

        if connections.is_empty() {
            continue;
        }

        let id = NodeId(nodes.len());
        nodes.insert(
            id,
            Node {
                id,
                label: net_label(&component),
                connections,
            },
        );
    }

    log::debug!(
        "Assembled {} nets over {} parts",
        nodes.len(),
        instances.len()
    );
    Schematic { instances, nodes }
}

#[cfg(test)]
mod tests {
    use fzn_parts::Resolver;

    use crate::coalesce::coalesce;
    use crate::document::SketchDocument;
    use crate::fixtures::{SketchBuilder, catalog};
    use crate::{Schematic, adjacency, parse_sketch};

    use super::*;

    fn pins(node: &Node) -> Vec<(&str, &str)> {
        node.connections
            .iter()
            .map(|c| (c.instance_id.as_str(), c.pin_id.as_str()))
            .collect()
    }

    fn extract(xml: &str) -> Schematic {
        parse_sketch(&catalog(), xml).unwrap()
    }

    #[test]
    fn same_named_labels_join_without_wires() {
        let xml = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .place("ResistorModuleID", "11", &[], &[])
            .place("NetLabelModuleID", "30", &[("label", "VCC")], &[])
            .place("NetLabelModuleID", "31", &[("label", "VCC")], &[])
            .wire("20", ("10", "connector0"), ("30", "connector0"))
            .wire("21", ("31", "connector0"), ("11", "connector1"))
            .build();
        let schematic = extract(&xml);

        assert_eq!(schematic.nodes.len(), 1);
        let vcc = schematic.node_by_label("VCC").unwrap();
        assert_eq!(pins(vcc), [("10", "connector0"), ("11", "connector1")]);
    }

    #[test]
    fn every_ground_symbol_joins_one_net() {
        let xml = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .place("ResistorModuleID", "11", &[], &[])
            .place("PushbuttonModuleID", "12", &[], &[])
            .place("GroundModuleID", "40", &[], &[("connector0", "10", "connector1")])
            .place("GroundModuleID", "41", &[], &[("connector0", "11", "connector0")])
            .place("GroundModuleID", "42", &[], &[("connector0", "12", "connector1")])
            .build();
        let schematic = extract(&xml);

        assert_eq!(schematic.nodes.len(), 1);
        let ground = schematic.node(NodeId(0)).unwrap();
        assert_eq!(ground.label.as_deref(), Some("Ground"));
        assert_eq!(
            pins(ground),
            [
                ("10", "connector1"),
                ("11", "connector0"),
                ("12", "connector1")
            ]
        );
    }

    #[test]
    fn wiring_only_components_are_discarded() {
        let xml = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .wire("20", ("10", "connector0"), ("10", "connector1"))
            .wire("21", ("22", "connector0"), ("22", "connector1"))
            .place_on("schematicTrace", "WireModuleID", "22", &[], &[])
            .build();
        let schematic = extract(&xml);

        assert_eq!(schematic.nodes.len(), 1);
        let node = schematic.node(NodeId(0)).unwrap();
        assert_eq!(node.label, None);
        assert_eq!(node.name(), "node0");
        assert_eq!(pins(node), [("10", "connector0"), ("10", "connector1")]);
    }

    #[test]
    fn node_numbers_follow_pin_order() {
        let xml = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .place("ResistorModuleID", "11", &[], &[])
            .wire("21", ("11", "connector0"), ("10", "connector1"))
            .wire("20", ("10", "connector0"), ("11", "connector1"))
            .build();
        let schematic = extract(&xml);

        let first = schematic.node(NodeId(0)).unwrap();
        let second = schematic.node(NodeId(1)).unwrap();
        assert_eq!(pins(first), [("10", "connector0"), ("11", "connector1")]);
        assert_eq!(pins(second), [("10", "connector1"), ("11", "connector0")]);
        assert_eq!(
            schematic.describe(&first.connections[0]).as_deref(),
            Some("R1 lead 0")
        );
    }

    #[test]
    fn first_label_names_a_multiply_labeled_net() {
        let tap = ("connector0", "10", "connector0");
        let xml = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .place("NetLabelModuleID", "30", &[("label", "VDD")], &[tap])
            .place("NetLabelModuleID", "31", &[("label", "3V3")], &[tap])
            .place("GroundModuleID", "40", &[], &[tap])
            .build();
        let catalog = catalog();
        let document = SketchDocument::parse(&xml).unwrap();
        let mut resolver = Resolver::new(&catalog);
        let adjacency = adjacency::build_adjacency(&document, &mut resolver).unwrap();
        let components = coalesce(&adjacency.edges);
        let schematic = assemble(adjacency, components);

        assert_eq!(schematic.nodes.len(), 1);
        assert_eq!(schematic.nodes[&NodeId(0)].label.as_deref(), Some("3V3"));
    }
}
