use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fzn_parts::Part;

/// A placed part that takes part in at least one connection.
#[derive(Debug, Clone)]
pub struct PartInstance {
    pub instance_id: String,
    /// Prefix plus a 1-based counter, e.g. `R3`. Unique within the sketch.
    pub designator: String,
    pub part: Arc<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Connection {
    pub instance_id: String,
    pub pin_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// One electrical net.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Net label or ground name attached to this net, if any.
    pub label: Option<String>,
    /// Sorted; never empty.
    pub connections: Vec<Connection>,
}

impl Node {
    pub fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }

    pub fn touches(&self, instance_id: &str) -> bool {
        self.connections.iter().any(|c| c.instance_id == instance_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schematic {
    pub instances: BTreeMap<String, PartInstance>,
    pub nodes: BTreeMap<NodeId, Node>,
}

impl Schematic {
    pub fn instance(&self, instance_id: &str) -> Option<&PartInstance> {
        self.instances.get(instance_id)
    }

    pub fn instance_by_designator(&self, designator: &str) -> Option<&PartInstance> {
        self.instances
            .values()
            .find(|inst| inst.designator == designator)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        self.nodes
            .values()
            .find(|node| node.label.as_deref() == Some(label))
    }

    /// Nets that `instance_id` is connected to, in node order.
    pub fn nodes_of<'a>(&'a self, instance_id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |node| node.touches(instance_id))
    }

    /// Human readable endpoint, e.g. `R1 lead 2` or `U1 the SCK pin`.
    pub fn describe(&self, connection: &Connection) -> Option<String> {
        let instance = self.instance(&connection.instance_id)?;
        let pin = instance
            .part
            .pin_reference(&connection.pin_id)
            .unwrap_or_else(|| connection.pin_id.clone());
        Some(format!("{} {pin}", instance.designator))
    }
}
