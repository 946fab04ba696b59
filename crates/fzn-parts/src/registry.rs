use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::fzp::parse_part;
use crate::part::Part;

/// One catalog source: a named, ordered collection of raw part documents.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub name: String,
    pub documents: Vec<String>,
}

impl CatalogSource {
    pub fn new(name: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }
}

/// Read access to a keyed collection of catalog parts.
pub trait PartLookup: std::fmt::Debug {
    fn lookup(&self, part_id: &str) -> Option<&Arc<Part>>;
}

/// Static parts keyed by module id.
#[derive(Debug, Default, Clone)]
pub struct PartRegistry {
    parts: HashMap<String, Arc<Part>>,
}

impl PartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load catalog sources in priority order. On an id collision the later
    /// source wins; within one source the later document wins.
    pub fn load(sources: &[CatalogSource]) -> Self {
        let mut registry = Self::new();
        for source in sources {
            registry.extend_from_source(source);
        }
        registry
    }

    /// Parse every document of `source` and insert the results on top of the
    /// current contents. Documents that can't be parsed are skipped.
    pub fn extend_from_source(&mut self, source: &CatalogSource) {
        let parsed: Vec<_> = source
            .documents
            .par_iter()
            .map(|doc| parse_part(doc))
            .collect();

        let mut loaded = 0usize;
        for (idx, result) in parsed.into_iter().enumerate() {
            match result {
                Ok(part) => {
                    self.insert(Part::Static(part));
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Skipping document #{idx} of catalog '{}': {e}",
                        source.name
                    );
                }
            }
        }
        log::debug!(
            "Loaded {loaded}/{} parts from catalog '{}'",
            source.documents.len(),
            source.name
        );
    }

    pub fn insert(&mut self, part: Part) -> Option<Arc<Part>> {
        let id = part.id().to_string();
        let previous = self.parts.insert(id, Arc::new(part));
        if let Some(previous) = &previous {
            log::debug!("Part '{}' overridden by a later catalog", previous.id());
        }
        previous
    }

    pub fn get(&self, part_id: &str) -> Option<&Arc<Part>> {
        self.parts.get(part_id)
    }

    pub fn contains(&self, part_id: &str) -> bool {
        self.parts.contains_key(part_id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Part>> {
        self.parts.values()
    }
}

impl PartLookup for PartRegistry {
    fn lookup(&self, part_id: &str) -> Option<&Arc<Part>> {
        self.get(part_id)
    }
}

/// A preloaded registry with archive-bundled parts layered on top.
///
/// Bundled parts shadow catalog parts with the same id. The base registry is
/// only borrowed, so dropping the overlay discards the archive's parts.
#[derive(Debug)]
pub struct Overlay<'a> {
    base: &'a dyn PartLookup,
    bundled: PartRegistry,
}

impl<'a> Overlay<'a> {
    pub fn new(base: &'a dyn PartLookup, bundled: PartRegistry) -> Self {
        Self { base, bundled }
    }

    pub fn bundled(&self) -> &PartRegistry {
        &self.bundled
    }
}

impl PartLookup for Overlay<'_> {
    fn lookup(&self, part_id: &str) -> Option<&Arc<Part>> {
        self.bundled
            .get(part_id)
            .or_else(|| self.base.lookup(part_id))
    }
}
