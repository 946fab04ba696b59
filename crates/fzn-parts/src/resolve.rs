use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Captures;

use crate::family::{BUILTIN_FAMILIES, PINS_CAPTURE, TemplateFamily, capture_property_name};
use crate::part::{
    FAMILY_PROPERTY, FactoryPart, Part, PartPin, Properties, TemplatedPart, derive_part_id,
    display_name,
};
use crate::registry::PartLookup;
use crate::suffix::SuffixMatcher;
use crate::{PartsError, Result};

/// Module ids whose parts are configured per placement.
static FACTORY_MODULES: Lazy<SuffixMatcher<()>> = Lazy::new(|| {
    SuffixMatcher::new([
        ("ResistorModuleID", ()),
        ("CapacitorModuleID", ()),
        ("PotentiometerModuleID", ()),
        ("InductorModuleID", ()),
        ("CrystalModuleID", ()),
        ("LEDModuleID", ()),
    ])
});

/// Catalog titles of factory parents usually describe one configuration
/// ("220Ω Resistor"); these replace them with the generic name.
static TITLE_OVERRIDES: Lazy<SuffixMatcher<String>> = Lazy::new(|| {
    [
        ("ResistorModuleID", "Resistor"),
        ("CeramicCapacitorModuleID", "Ceramic Capacitor"),
        ("ElectrolyticCapacitorModuleID", "Electrolytic Capacitor"),
        ("TantalumCapacitorModuleID", "Tantalum Capacitor"),
        ("PotentiometerModuleID", "Potentiometer"),
        ("InductorModuleID", "Inductor"),
        ("LEDModuleID", "LED"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
});

static DESCRIPTION_OVERRIDES: Lazy<SuffixMatcher<String>> = Lazy::new(|| {
    [
        (
            "ResistorModuleID",
            "A resistor limits the current flowing through a circuit.",
        ),
        (
            "CapacitorModuleID",
            "A capacitor stores electric charge. Used for decoupling, filtering and timing.",
        ),
        ("LEDModuleID", "A light-emitting diode."),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect()
});

/// Largest pin count a template family may synthesize.
pub const MAX_TEMPLATE_PINS: usize = 1024;

/// Whether `module_id` names a part configured at placement time.
pub fn is_factory_module(module_id: &str) -> bool {
    FACTORY_MODULES.get(module_id).is_some()
}

/// Turns module ids and placement properties into concrete parts.
///
/// Configured parts are cached by derived id, so placements with identical
/// configurations share one `Arc<Part>`.
#[derive(Debug)]
pub struct Resolver<'a> {
    catalog: &'a dyn PartLookup,
    families: &'a [TemplateFamily],
    synthesized: HashMap<String, Arc<Part>>,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn PartLookup) -> Self {
        Self::with_families(catalog, &BUILTIN_FAMILIES)
    }

    pub fn with_families(catalog: &'a dyn PartLookup, families: &'a [TemplateFamily]) -> Self {
        Self {
            catalog,
            families,
            synthesized: HashMap::new(),
        }
    }

    /// Resolve a placed module. Tries, in order: factory configuration,
    /// verbatim catalog lookup, template families. Anything else is an error.
    pub fn resolve(&mut self, module_id: &str, overrides: &Properties) -> Result<Arc<Part>> {
        if is_factory_module(module_id) {
            return self.resolve_factory(module_id, overrides);
        }

        if let Some(part) = self.catalog.lookup(module_id) {
            return Ok(part.clone());
        }

        let families = self.families;
        for family in families {
            if let Some(caps) = family.pattern.captures(module_id) {
                return self.resolve_template(family, module_id, &caps, overrides);
            }
        }

        Err(PartsError::UnresolvedPart(module_id.to_string()))
    }

    fn resolve_factory(&mut self, module_id: &str, overrides: &Properties) -> Result<Arc<Part>> {
        let catalog = self.catalog;
        let parent = catalog
            .lookup(module_id)
            .ok_or_else(|| PartsError::MissingFactoryParent(module_id.to_string()))?;

        let mut properties = parent.properties().clone();
        properties.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

        let id = derive_part_id(module_id, &properties);
        if let Some(part) = self.synthesized.get(&id) {
            return Ok(part.clone());
        }

        let parent_title = parent.short_name().to_string();
        let title = TITLE_OVERRIDES.lookup(module_id, &parent_title);
        let description = DESCRIPTION_OVERRIDES
            .get(module_id)
            .cloned()
            .or_else(|| parent.description().map(str::to_string));
        let display_properties = parent.display_properties().to_vec();

        let part = Part::Factory(FactoryPart {
            short_name: display_name(title, &properties, &display_properties),
            id: id.clone(),
            parent_id: module_id.to_string(),
            description,
            designator_prefix: parent.designator_prefix().to_string(),
            pins: parent.pins().to_vec(),
            properties,
            display_properties,
        });
        log::debug!("Configured factory part {id}");

        Ok(self.remember(id, part))
    }

    fn resolve_template(
        &mut self,
        family: &TemplateFamily,
        module_id: &str,
        caps: &Captures<'_>,
        overrides: &Properties,
    ) -> Result<Arc<Part>> {
        let pins = caps
            .name(PINS_CAPTURE)
            .ok_or_else(|| PartsError::MissingPinsCapture {
                family: family.name,
                module_id: module_id.to_string(),
            })?
            .as_str();
        let pin_count = pins
            .parse::<usize>()
            .ok()
            .filter(|&count| count <= MAX_TEMPLATE_PINS)
            .ok_or_else(|| PartsError::InvalidPinCount {
                module_id: module_id.to_string(),
                value: pins.to_string(),
            })?;

        let mut properties: Properties = family
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|group| {
                let value = caps.name(group)?;
                Some((capture_property_name(group), value.as_str().to_string()))
            })
            .collect();
        properties.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        properties
            .entry(FAMILY_PROPERTY.to_string())
            .or_insert_with(|| family.name.to_string());

        let id = derive_part_id(module_id, &properties);
        if let Some(part) = self.synthesized.get(&id) {
            return Ok(part.clone());
        }

        let display_properties: Vec<String> = family
            .display_properties
            .iter()
            .map(|k| k.to_string())
            .collect();
        let pins = (0..pin_count)
            .map(|i| PartPin::new(format!("connector{i}"), (i + 1).to_string()))
            .collect();

        let part = Part::Templated(TemplatedPart {
            short_name: display_name(family.title, &properties, &display_properties),
            id: id.clone(),
            module_id: module_id.to_string(),
            family: family.name,
            designator_prefix: family.designator_prefix.to_string(),
            pins,
            properties,
            display_properties,
        });
        log::debug!("Synthesized {} part {id}", family.name);

        Ok(self.remember(id, part))
    }

    fn remember(&mut self, id: String, part: Part) -> Arc<Part> {
        self.synthesized
            .entry(id)
            .or_insert_with(|| Arc::new(part))
            .clone()
    }
}
