//! `.fzz` sketch archives.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use fzn_parts::{CatalogSource, Overlay, PartLookup, PartRegistry};
use zip::ZipArchive;

use crate::schematic::Schematic;
use crate::{Result, SketchError, parse_sketch};

pub const SCHEMATIC_EXTENSION: &str = ".fz";
pub const PART_EXTENSION: &str = ".fzp";

/// The documents of one sketch archive, read into memory.
#[derive(Debug, Clone)]
pub struct SketchArchive {
    /// Entry name of the schematic document.
    pub schematic_name: String,
    pub schematic: String,
    /// Bundled part documents, in archive order.
    pub parts: Vec<String>,
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.to_ascii_lowercase().ends_with(extension)
}

impl SketchArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read an archive. It must hold exactly one schematic document; other
    /// entries besides part documents (images, code) are ignored.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;

        let mut schematics = Vec::new();
        let mut parts = Vec::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let is_schematic = has_extension(&name, SCHEMATIC_EXTENSION);
            if !is_schematic && !has_extension(&name, PART_EXTENSION) {
                continue;
            }

            if is_schematic {
                let mut contents = String::new();
                entry.read_to_string(&mut contents)?;
                schematics.push((name, contents));
            } else {
                // Decoded lossily, like catalog files.
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes)?;
                parts.push(String::from_utf8_lossy(&bytes).into_owned());
            }
        }

        if schematics.len() != 1 {
            return Err(SketchError::SchematicCount(schematics.len()));
        }
        let (schematic_name, schematic) = schematics.remove(0);
        log::debug!(
            "Archive holds schematic '{schematic_name}' and {} part documents",
            parts.len()
        );

        Ok(Self {
            schematic_name,
            schematic,
            parts,
        })
    }

    /// Parse the bundled part documents into their own registry.
    pub fn bundled_parts(&self) -> PartRegistry {
        PartRegistry::load(&[CatalogSource::new(
            self.schematic_name.clone(),
            self.parts.clone(),
        )])
    }

    /// Extract the netlist, with bundled parts shadowing `catalog`.
    pub fn extract(&self, catalog: &dyn PartLookup) -> Result<Schematic> {
        let overlay = Overlay::new(catalog, self.bundled_parts());
        parse_sketch(&overlay, &self.schematic)
    }
}

pub fn load_sketch(catalog: &dyn PartLookup, path: impl AsRef<Path>) -> Result<Schematic> {
    SketchArchive::open(path)?.extract(catalog)
}

pub fn load_sketch_from_reader<R: Read + Seek>(
    catalog: &dyn PartLookup,
    reader: R,
) -> Result<Schematic> {
    SketchArchive::from_reader(reader)?.extract(catalog)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::FileOptions;

    use super::*;
    use crate::fixtures::{RESISTOR_FZP, SketchBuilder, catalog};

    fn zip_of(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let entries: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, contents)| (*name, contents.as_bytes()))
            .collect();
        zip_of_bytes(&entries)
    }

    fn zip_of_bytes(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::<()>::default()).unwrap();
            zip.write_all(contents).unwrap();
        }
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn reads_schematic_and_bundled_parts() {
        let sketch = SketchBuilder::new().build();
        let archive = SketchArchive::from_reader(zip_of(&[
            ("blink.fz", sketch.as_str()),
            ("part.resistor.fzp", RESISTOR_FZP),
            ("svg.schematic.resistor.svg", "<svg/>"),
            ("blink.ino", "void loop() {}"),
        ]))
        .unwrap();

        assert_eq!(archive.schematic_name, "blink.fz");
        assert_eq!(archive.parts.len(), 1);
        assert!(archive.bundled_parts().contains("ResistorModuleID"));
    }

    #[test]
    fn schematic_count_must_be_one() {
        let sketch = SketchBuilder::new().build();
        let none = SketchArchive::from_reader(zip_of(&[("part.x.fzp", RESISTOR_FZP)]));
        assert!(matches!(none, Err(SketchError::SchematicCount(0))));

        let two = SketchArchive::from_reader(zip_of(&[
            ("a.fz", sketch.as_str()),
            ("b.FZ", sketch.as_str()),
        ]));
        assert!(matches!(two, Err(SketchError::SchematicCount(2))));
    }

    #[test]
    fn bundled_parts_shadow_the_catalog() {
        let custom = RESISTOR_FZP
            .replace("<label>R</label>", "<label>RX</label>")
            .replace("220Ω Resistor", "Custom Resistor");
        let sketch = SketchBuilder::new()
            .place("ResistorModuleID", "10", &[], &[])
            .wire("20", ("10", "connector0"), ("10", "connector1"))
            .build();
        let reader = zip_of(&[
            ("custom.fz", sketch.as_str()),
            ("part.custom.fzp", custom.as_str()),
        ]);

        let catalog = catalog();
        let schematic = load_sketch_from_reader(&catalog, reader).unwrap();
        assert_eq!(schematic.instance("10").unwrap().designator, "RX1");
        assert_eq!(catalog.get("ResistorModuleID").unwrap().designator_prefix(), "R");
    }

    #[test]
    fn latin1_part_document_is_decoded_lossily() {
        let sketch = SketchBuilder::new().build();
        let latin1: &[u8] =
            b"<module moduleId=\"OddModuleID\"><title>R\xe9sistance</title></module>";
        let archive = SketchArchive::from_reader(zip_of_bytes(&[
            ("s.fz", sketch.as_bytes()),
            ("part.x.fzp", latin1),
        ]))
        .unwrap();

        assert_eq!(archive.parts.len(), 1);
        let bundled = archive.bundled_parts();
        assert_eq!(
            bundled.get("OddModuleID").unwrap().short_name(),
            "R\u{fffd}sistance"
        );
        assert!(archive.extract(&catalog()).is_ok());
    }

    #[test]
    fn non_utf8_schematic_is_an_io_error() {
        let schematic: &[u8] = b"<module>\xff</module>";
        let result = SketchArchive::from_reader(zip_of_bytes(&[("s.fz", schematic)]));
        assert!(matches!(result, Err(SketchError::Io(_))));
    }

    #[test]
    fn not_a_zip() {
        let result = SketchArchive::from_reader(Cursor::new(b"<module/>".to_vec()));
        assert!(matches!(result, Err(SketchError::Zip(_))));
    }
}
