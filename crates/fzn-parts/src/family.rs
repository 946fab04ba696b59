//! Template families for parts that exist only as a naming pattern.
//!
//! Fritzing generates headers, DIP/SIP packages and screw terminals on the
//! fly from module ids like `generic_female_pin_header_6_100mil`; no catalog
//! document exists for them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Capture group that every family must provide.
pub const PINS_CAPTURE: &str = "pins";

#[derive(Debug, Clone)]
pub struct TemplateFamily {
    pub name: &'static str,
    pub title: &'static str,
    pub designator_prefix: &'static str,
    /// Matched against the raw module id. Named groups become properties.
    pub pattern: Regex,
    /// Property keys shown in the part name, after capture-name conversion.
    pub display_properties: &'static [&'static str],
}

impl TemplateFamily {
    pub fn new(
        name: &'static str,
        title: &'static str,
        designator_prefix: &'static str,
        pattern: &str,
        display_properties: &'static [&'static str],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            title,
            designator_prefix,
            pattern: Regex::new(pattern)?,
            display_properties,
        })
    }
}

/// Property key for a capture group name: underscores become spaces.
pub fn capture_property_name(group: &str) -> String {
    group.replace('_', " ")
}

const SPACED_PINS: &[&str] = &["pins", "pin spacing"];
const DIP_PINS: &[&str] = &["pins", "row spacing"];
const PINS_ONLY: &[&str] = &["pins"];

pub static BUILTIN_FAMILIES: Lazy<Vec<TemplateFamily>> = Lazy::new(|| {
    [
        (
            "male pin header",
            "Pin Header",
            "J",
            r"^generic_male_pin_header_(?P<pins>\d+)(?:_(?P<pin_spacing>[\d.]+(?:mil|mm)))?$",
            SPACED_PINS,
        ),
        (
            "female pin header",
            "Female Pin Header",
            "J",
            r"^generic_female_pin_header_(?P<pins>\d+)(?:_(?P<pin_spacing>[\d.]+(?:mil|mm)))?$",
            SPACED_PINS,
        ),
        (
            "dip",
            "IC",
            "U",
            r"^generic_ic_dip_(?P<pins>\d+)(?:_(?P<row_spacing>\d+mil))?$",
            DIP_PINS,
        ),
        (
            "sip",
            "IC",
            "U",
            r"^generic_sip_(?P<pins>\d+)(?:_(?P<pin_spacing>\d+mil))?$",
            SPACED_PINS,
        ),
        (
            "screw terminal",
            "Screw Terminal",
            "J",
            r"^screw_terminal_(?P<pins>\d+)(?:_(?P<pin_spacing>[\d.]+mm))?$",
            SPACED_PINS,
        ),
        (
            "mystery part",
            "Mystery Part",
            "U",
            r"^mystery_part_(?:sip_)?(?P<pins>\d+)(?:_(?P<pin_spacing>\d+mil))?$",
            PINS_ONLY,
        ),
    ]
    .into_iter()
    .map(|(name, title, prefix, pattern, display)| {
        TemplateFamily::new(name, title, prefix, pattern, display).unwrap()
    })
    .collect()
});
