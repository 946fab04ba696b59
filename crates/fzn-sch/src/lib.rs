//! Netlist extraction from Fritzing sketches.
//!
//! A sketch archive (`.fzz`) holds one schematic document (`.fz`) and the
//! part documents (`.fzp`) it brings along. Extraction runs in four steps:
//!
//! 1. [`adjacency`] walks the schematic view of every placed instance,
//!    resolving parts and collecting undirected pin-to-pin edges;
//! 2. [`coalesce`] merges those edges into connected components;
//! 3. [`assemble`] drops wires, net labels and ground symbols from each
//!    component and numbers the remaining nets;
//! 4. the resulting [`Schematic`] is handed to whoever renders it.

pub mod adjacency;
pub mod archive;
pub mod assemble;
pub mod bom;
pub mod coalesce;
pub mod document;
pub mod pin;
pub mod schematic;

#[cfg(test)]
mod fixtures;

pub use archive::{SketchArchive, load_sketch, load_sketch_from_reader};
pub use document::SketchDocument;
pub use pin::{Edge, PinOwner, PinRef};
pub use schematic::{Connection, Node, NodeId, PartInstance, Schematic};

use fzn_parts::{PartLookup, PartsError, Resolver};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Expected exactly one schematic (.fz) document in the archive, found {0}")]
    SchematicCount(usize),

    #[error("Missing required attribute '{attr}' on element '{element}'")]
    MissingAttribute {
        element: &'static str,
        attr: &'static str,
    },

    #[error("Invalid sketch structure: {0}")]
    InvalidStructure(String),

    #[error(transparent)]
    Part(#[from] PartsError),
}

pub type Result<T> = std::result::Result<T, SketchError>;

/// Extract the netlist of a bare schematic document, resolving parts
/// against `catalog`.
pub fn parse_sketch(catalog: &dyn PartLookup, xml: &str) -> Result<Schematic> {
    let document = SketchDocument::parse(xml)?;
    let mut resolver = Resolver::new(catalog);
    let adjacency = adjacency::build_adjacency(&document, &mut resolver)?;
    let components = coalesce::coalesce(&adjacency.edges);
    Ok(assemble::assemble(adjacency, components))
}
