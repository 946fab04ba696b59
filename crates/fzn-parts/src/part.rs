use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Property key → value. Keys are lower-cased when read from documents.
pub type Properties = BTreeMap<String, String>;

/// Module id of the implicit ground rail part.
pub const GROUND_PART_ID: &str = "GroundModuleID";

/// Pin id shared by every touch-point of wires, net labels and ground.
pub const COMMON_PIN_ID: &str = "common";

/// Property key that never contributes to a derived part id.
pub const FAMILY_PROPERTY: &str = "family";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPin {
    /// Unique within the owning part only.
    pub pin_id: String,
    pub short_name: String,
    pub description: Option<String>,
}

impl PartPin {
    pub fn new(pin_id: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            pin_id: pin_id.into(),
            short_name: short_name.into(),
            description: None,
        }
    }
}

/// A part read verbatim from a catalog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPart {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub designator_prefix: String,
    pub pins: Vec<PartPin>,
    /// Default property values declared by the document.
    pub properties: Properties,
    /// Property keys flagged "show in label", in document order.
    pub label_properties: Vec<String>,
}

/// A catalog part configured by per-placement properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryPart {
    pub id: String,
    pub parent_id: String,
    pub short_name: String,
    pub description: Option<String>,
    pub designator_prefix: String,
    pub pins: Vec<PartPin>,
    pub properties: Properties,
    pub display_properties: Vec<String>,
}

/// A part synthesized from a template family and its module id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedPart {
    pub id: String,
    pub module_id: String,
    pub family: &'static str,
    pub short_name: String,
    pub designator_prefix: String,
    pub pins: Vec<PartPin>,
    pub properties: Properties,
    pub display_properties: Vec<String>,
}

/// A resolved part. Construction differs per variant; the read-only surface
/// is the same for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Static(StaticPart),
    Factory(FactoryPart),
    Templated(TemplatedPart),
}

static GROUND_PART: Lazy<Part> = Lazy::new(|| {
    Part::Static(StaticPart {
        id: GROUND_PART_ID.to_string(),
        title: "Ground".to_string(),
        description: Some("Common ground rail".to_string()),
        designator_prefix: "GND".to_string(),
        pins: vec![PartPin::new(COMMON_PIN_ID, COMMON_PIN_ID)],
        properties: Properties::new(),
        label_properties: Vec::new(),
    })
});

impl Part {
    /// The singleton ground part every ground symbol is joined to.
    pub fn ground() -> &'static Part {
        &GROUND_PART
    }

    pub fn id(&self) -> &str {
        match self {
            Part::Static(p) => &p.id,
            Part::Factory(p) => &p.id,
            Part::Templated(p) => &p.id,
        }
    }

    pub fn short_name(&self) -> &str {
        match self {
            Part::Static(p) => &p.title,
            Part::Factory(p) => &p.short_name,
            Part::Templated(p) => &p.short_name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Part::Static(p) => p.description.as_deref(),
            Part::Factory(p) => p.description.as_deref(),
            Part::Templated(_) => None,
        }
    }

    pub fn designator_prefix(&self) -> &str {
        match self {
            Part::Static(p) => &p.designator_prefix,
            Part::Factory(p) => &p.designator_prefix,
            Part::Templated(p) => &p.designator_prefix,
        }
    }

    pub fn pins(&self) -> &[PartPin] {
        match self {
            Part::Static(p) => &p.pins,
            Part::Factory(p) => &p.pins,
            Part::Templated(p) => &p.pins,
        }
    }

    pub fn pin(&self, pin_id: &str) -> Option<&PartPin> {
        self.pins().iter().find(|p| p.pin_id == pin_id)
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Part::Static(p) => &p.properties,
            Part::Factory(p) => &p.properties,
            Part::Templated(p) => &p.properties,
        }
    }

    pub fn display_properties(&self) -> &[String] {
        match self {
            Part::Static(p) => &p.label_properties,
            Part::Factory(p) => &p.display_properties,
            Part::Templated(p) => &p.display_properties,
        }
    }

    /// How prose should refer to one of this part's pins.
    ///
    /// Parts with up to three pins have "leads", anything bigger has "pins":
    /// `"lead 1"`, `"pin 14"`, `"the + lead"`, `"the SCK pin"`.
    pub fn pin_reference(&self, pin_id: &str) -> Option<String> {
        let kind = if self.pins().len() <= 3 { "lead" } else { "pin" };
        let short_name = &self.pin(pin_id)?.short_name;
        if !short_name.is_empty() && short_name.chars().all(|c| c.is_ascii_digit()) {
            Some(format!("{kind} {short_name}"))
        } else {
            Some(format!("the {short_name} {kind}"))
        }
    }
}

static PIN_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:pin|leg)(\d.*)$").unwrap());
static PIN_WORD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:pin|leg)\s+(\S.*)$").unwrap());

/// Strip filler words from a connector name: `"Pin 3"` → `"3"`, `"leg2"` → `"2"`.
pub fn clean_pin_name(name: &str) -> String {
    let name = name.trim();
    if let Some(caps) = PIN_NUMBER_PREFIX.captures(name) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = PIN_WORD_PREFIX.captures(name) {
        return caps[1].trim().to_string();
    }
    name.to_string()
}

/// Canonical id for a configured part: the module id followed by the sorted
/// `key=value` pairs, `family` excluded. Equal property sets always collapse
/// to the same id.
pub fn derive_part_id(module_id: &str, properties: &Properties) -> String {
    let pairs = properties
        .iter()
        .filter(|(k, _)| k.as_str() != FAMILY_PROPERTY)
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(";");
    format!("{module_id}|{pairs}")
}

const IMPLICIT_UNITS: &[(&str, &str)] = &[
    ("voltage", "V"),
    ("resistance", "Ω"),
    ("power", "W"),
    ("current", "A"),
];

fn format_property(key: &str, value: &str) -> String {
    let unit = IMPLICIT_UNITS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, unit)| *unit);
    match unit {
        Some(unit) if !value.ends_with(unit) => format!("{key} {value}{unit}"),
        _ => format!("{key} {value}"),
    }
}

/// `title (key value, key value)` over the present, non-empty display keys.
pub fn display_name(title: &str, properties: &Properties, display: &[String]) -> String {
    let shown: Vec<String> = display
        .iter()
        .filter_map(|key| {
            let value = properties.get(key)?.trim();
            (!value.is_empty()).then(|| format_property(key, value))
        })
        .collect();

    if shown.is_empty() {
        title.to_string()
    } else {
        format!("{title} ({})", shown.join(", "))
    }
}
