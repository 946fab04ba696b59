//! Fritzing part catalogs and part resolution.
//!
//! Parts come from three places:
//!
//! * static `.fzp` catalog documents, loaded into a [`PartRegistry`];
//! * *factory* parts, configured per placement from a static parent
//!   (a resistor's resistance, a capacitor's capacitance);
//! * *templated* parts that have no catalog document at all and are
//!   synthesized from a naming pattern such as `generic_male_pin_header_4`.
//!
//! [`Resolver`] turns a module id plus the placement's properties into a
//! concrete [`Part`] using those three tiers.

pub mod family;
pub mod fzp;
pub mod part;
pub mod registry;
pub mod resolve;
pub mod suffix;
pub mod text;

pub use family::TemplateFamily;
pub use part::{
    COMMON_PIN_ID, FactoryPart, GROUND_PART_ID, Part, PartPin, Properties, StaticPart,
    TemplatedPart,
};
pub use registry::{CatalogSource, Overlay, PartLookup, PartRegistry};
pub use resolve::Resolver;
pub use suffix::SuffixMatcher;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartsError {
    #[error("No static, factory or template part matches module id '{0}'")]
    UnresolvedPart(String),

    #[error("Factory part '{0}' has no parent part in the catalog")]
    MissingFactoryParent(String),

    #[error("Template family '{family}' has no 'pins' capture for module id '{module_id}'")]
    MissingPinsCapture {
        family: &'static str,
        module_id: String,
    },

    #[error("Invalid pin count '{value}' for module id '{module_id}'")]
    InvalidPinCount { module_id: String, value: String },

    #[error("Part document has no module id")]
    MissingModuleId,

    #[error("XML error in part document: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, PartsError>;
