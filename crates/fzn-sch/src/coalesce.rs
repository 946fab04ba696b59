//! Connected components of the pin adjacency graph.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

/// Partition every endpoint mentioned by `edges` into maximal connected
/// components.
///
/// Each component is sorted, and components are ordered by their smallest
/// member, so the result depends only on the edge set and not on the order
/// edges were found in.
pub fn coalesce<'e, T, I>(edges: I) -> Vec<Vec<T>>
where
    T: Ord + Clone + 'e,
    I: IntoIterator<Item = &'e (T, T)>,
{
    let edges: Vec<&(T, T)> = edges.into_iter().collect();

    // Sorted arena: index order is endpoint order.
    let universe: Vec<&T> = edges
        .iter()
        .flat_map(|(a, b)| [a, b])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<&T, usize> = universe.iter().enumerate().map(|(i, t)| (*t, i)).collect();

    let mut sets = UnionFind::<usize>::new(universe.len());
    for (a, b) in &edges {
        sets.union(index[a], index[b]);
    }

    // Walking the arena in order visits every component at its minimum
    // first and fills each component in sorted order.
    let mut slots: BTreeMap<usize, usize> = BTreeMap::new();
    let mut components: Vec<Vec<T>> = Vec::new();
    for (i, root) in sets.into_labeling().into_iter().enumerate() {
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(universe[i].clone());
    }

    log::debug!(
        "Coalesced {} pins over {} edges into {} components",
        universe.len(),
        edges.len(),
        components.len()
    );
    components
}
