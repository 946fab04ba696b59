use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use fzn_parts::{CatalogSource, PartRegistry};
use walkdir::WalkDir;

/// Subdirectories of a Fritzing part library, lowest precedence first.
pub const LIBRARY_LAYERS: &[&str] = &["obsolete", "contrib", "core", "user"];

fn is_part_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("fzp"))
}

/// Every `.fzp` below `dir`, in path order. Unreadable files are skipped.
pub fn read_source(dir: &Path) -> CatalogSource {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_part_document(e.path()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    let documents = paths
        .iter()
        .filter_map(|path| match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                None
            }
        })
        .collect();

    CatalogSource::new(dir.display().to_string(), documents)
}

/// Load the part library layers under `root`, then each of `extra_dirs`.
///
/// A missing library is not an error: bundled and templated parts still
/// resolve without it. A missing extra directory is.
pub fn load_catalog(root: &Path, extra_dirs: &[PathBuf]) -> Result<PartRegistry> {
    let mut sources = Vec::new();

    if root.is_dir() {
        for layer in LIBRARY_LAYERS {
            let dir = root.join(layer);
            if dir.is_dir() {
                sources.push(read_source(&dir));
            } else {
                log::debug!("No {layer} parts under {}", root.display());
            }
        }
    } else {
        log::warn!(
            "Part library {} not found; only bundled and generated parts will resolve",
            root.display()
        );
    }

    for dir in extra_dirs {
        if !dir.is_dir() {
            bail!("Part directory {} does not exist", dir.display());
        }
        sources.push(read_source(dir));
    }

    Ok(PartRegistry::load(&sources))
}
