//! Parts list grouped by resolved part.

use std::collections::BTreeMap;
use std::sync::Arc;

use fzn_parts::Part;

use crate::schematic::{PartInstance, Schematic};

#[derive(Debug, Clone)]
pub struct PartUsage<'a> {
    pub part: &'a Arc<Part>,
    /// In natural designator order: `R2` before `R10`.
    pub instances: Vec<&'a PartInstance>,
}

impl PartUsage<'_> {
    pub fn quantity(&self) -> usize {
        self.instances.len()
    }

    pub fn designators(&self) -> Vec<&str> {
        self.instances
            .iter()
            .map(|inst| inst.designator.as_str())
            .collect()
    }
}

/// One entry per distinct part id, ordered by part id. Factory parts with
/// the same configuration share an id and therefore an entry.
pub fn collect_parts(schematic: &Schematic) -> Vec<PartUsage<'_>> {
    let mut grouped: BTreeMap<&str, PartUsage<'_>> = BTreeMap::new();
    for instance in schematic.instances.values() {
        grouped
            .entry(instance.part.id())
            .or_insert_with(|| PartUsage {
                part: &instance.part,
                instances: Vec::new(),
            })
            .instances
            .push(instance);
    }

    let mut usages: Vec<_> = grouped.into_values().collect();
    for usage in &mut usages {
        usage
            .instances
            .sort_by(|a, b| natord::compare(&a.designator, &b.designator));
    }
    usages
}
