//! Layered loading of trigger definitions.
//!
//! The vendor directory is read first, then the admin directory; an admin
//! definition replaces a vendor definition of the same name wholesale.
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::definition::{Layer, TriggerDefinition};
use crate::error::ConfigError;

/// Merged definitions keyed by name.
pub type Definitions = BTreeMap<String, TriggerDefinition>;

/// Load and merge both layers.
///
/// # Errors
///
/// Returns the first [`ConfigError`] encountered; a single malformed file
/// fails the whole load.
pub fn load(vendor_dir: &Path, admin_dir: &Path) -> Result<Definitions, ConfigError> {
    let mut merged = Definitions::new();

    for def in load_layer(vendor_dir, Layer::Vendor)? {
        merged.insert(def.name.clone(), def);
    }

    for def in load_layer(admin_dir, Layer::Admin)? {
        let source = def.source.clone();
        if let Some(replaced) = merged.insert(def.name.clone(), def) {
            tracing::debug!(
                "{} overrides {} ({})",
                source.display(),
                replaced.source.display(),
                replaced.name
            );
        }
    }

    Ok(merged)
}

/// Load every definition in one directory, in file-name order.
///
/// A missing directory yields no definitions.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the directory exists but cannot be read,
/// or [`ConfigError::Parse`] for a malformed or duplicate definition.
pub fn load_layer(dir: &Path, layer: Layer) -> Result<Vec<TriggerDefinition>, ConfigError> {
    let io_err = |path: &Path, source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{layer} directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(dir, e)),
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if is_definition_file(&path) {
            files.push(path);
        } else {
            tracing::debug!("ignoring {}", path.display());
        }
    }
    files.sort();

    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut defs = Vec::with_capacity(files.len());
    for file in files {
        let content = std::fs::read_to_string(&file).map_err(|e| io_err(&file, e))?;
        let def = TriggerDefinition::parse(&content, &file, layer)?;
        if let Some(first) = seen.insert(def.name.clone(), file.clone()) {
            return Err(ConfigError::Parse {
                file,
                reason: format!(
                    "name '{}' is already defined by {}",
                    def.name,
                    first.display()
                ),
            });
        }
        defs.push(def);
    }

    tracing::debug!("loaded {} {layer} definition(s) from {}", defs.len(), dir.display());
    Ok(defs)
}

/// Regular, non-hidden `*.toml` files (symlinks followed).
fn is_definition_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
    let toml = path.extension().is_some_and(|ext| ext == "toml");
    !hidden && toml && path.is_file()
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    struct Layers {
        _root: tempfile::TempDir,
        vendor: PathBuf,
        admin: PathBuf,
    }

    fn layers() -> Layers {
        let root = tempfile::tempdir().unwrap();
        let vendor = root.path().join("usr");
        let admin = root.path().join("etc");
        std::fs::create_dir_all(&vendor).unwrap();
        std::fs::create_dir_all(&admin).unwrap();
        Layers {
            _root: root,
            vendor,
            admin,
        }
    }

    fn write(dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn missing_directories_yield_empty_set() {
        let root = tempfile::tempdir().unwrap();
        let defs = load(&root.path().join("a"), &root.path().join("b")).unwrap();
        assert!(defs.is_empty());
    }

    #[test]
    fn admin_definition_replaces_vendor_wholesale() {
        let l = layers();
        write(
            &l.vendor,
            "fonts.toml",
            "binary = \"fc-cache\"\narguments = [\"-f\"]\npriority = 5\npaths = [\"/usr/share/fonts/**\"]\n",
        );
        write(&l.admin, "fonts.toml", "binary = \"/usr/local/bin/fc-cache\"\n");

        let defs = load(&l.vendor, &l.admin).unwrap();
        let fonts = &defs["fonts"];
        assert_eq!(fonts.layer, Layer::Admin);
        assert_eq!(fonts.binary, "/usr/local/bin/fc-cache");
        // No field-level merge: vendor-only fields are gone.
        assert!(fonts.arguments.is_empty());
        assert!(fonts.paths.is_empty());
        assert_eq!(fonts.priority, 0);
    }

    #[test]
    fn override_matches_declared_name_not_file_name() {
        let l = layers();
        write(&l.vendor, "10-ldconfig.toml", "name = \"ldconfig\"\nbinary = \"ldconfig\"\n");
        write(&l.admin, "local.toml", "name = \"ldconfig\"\nbinary = \"true\"\n");

        let defs = load(&l.vendor, &l.admin).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs["ldconfig"].binary, "true");
    }

    #[test]
    fn both_layers_contribute_distinct_names() {
        let l = layers();
        write(&l.vendor, "a.toml", "binary = \"true\"\n");
        write(&l.admin, "b.toml", "binary = \"true\"\n");

        let defs = load(&l.vendor, &l.admin).unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(defs["a"].layer, Layer::Vendor);
    }

    #[test]
    fn malformed_file_fails_whole_load() {
        let l = layers();
        write(&l.vendor, "good.toml", "binary = \"true\"\n");
        write(&l.admin, "broken.toml", "binary = \n");

        let err = load(&l.vendor, &l.admin).unwrap_err();
        match err {
            ConfigError::Parse { file, .. } => assert!(file.ends_with("broken.toml")),
            ConfigError::Io { .. } => panic!("expected a parse error"),
        }
    }

    #[test]
    fn duplicate_name_within_layer_is_rejected() {
        let l = layers();
        write(&l.vendor, "a.toml", "name = \"cache\"\nbinary = \"true\"\n");
        write(&l.vendor, "b.toml", "name = \"cache\"\nbinary = \"true\"\n");

        let err = load_layer(&l.vendor, Layer::Vendor).unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn non_toml_and_hidden_files_are_ignored() {
        let l = layers();
        write(&l.vendor, "README", "not a definition");
        write(&l.vendor, ".hidden.toml", "garbage");
        write(&l.vendor, "fonts.toml.rpmnew", "garbage");
        std::fs::create_dir(l.vendor.join("sub.toml")).unwrap();
        write(&l.vendor, "real.toml", "binary = \"true\"\n");

        let defs = load_layer(&l.vendor, Layer::Vendor).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "real");
    }

    #[test]
    fn path_that_is_a_file_is_an_io_error() {
        let l = layers();
        let file = l.vendor.join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let err = load_layer(&file, Layer::Vendor).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
