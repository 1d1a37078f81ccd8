//! A single trigger definition file.
//!
//! ```toml
//! description = "Updating dynamic library cache"
//! binary = "/sbin/ldconfig"
//! arguments = ["-X"]
//! paths = ["/usr/lib64/*.so*", "/etc/ld.so.conf.d/*"]
//! priority = 10
//! ```
//!
//! `name` defaults to the file stem. Unknown keys are rejected so that a
//! typo never silently disables part of a definition.
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::glob;

/// Which directory a definition was loaded from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Package-shipped defaults.
    #[default]
    Vendor,
    /// Administrator overrides; wins on name collision.
    Admin,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        })
    }
}

/// A named unit of post-transaction work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDefinition {
    /// Unique identifier; the file stem when omitted.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Watched path globs. Empty means the trigger is always dirty.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Absolute path or bare name looked up on `PATH`.
    pub binary: String,
    /// Arguments passed to `binary`.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Lower runs first.
    #[serde(default)]
    pub priority: i32,
    /// Disabled by the administrator; only `--force` runs it.
    #[serde(default)]
    pub skip: bool,
    /// Do not run inside a chroot.
    #[serde(default)]
    pub skip_chroot: bool,
    /// Do not run from a live medium.
    #[serde(default)]
    pub skip_live: bool,
    /// Stale paths deleted right before the binary runs.
    #[serde(default)]
    pub remove: Vec<String>,
    /// Globs protected from `remove`.
    #[serde(default)]
    pub remove_exclude: Vec<String>,
    /// Extra environment for the child process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Layer this definition was loaded from.
    #[serde(skip)]
    pub layer: Layer,
    /// File this definition was loaded from.
    #[serde(skip)]
    pub source: PathBuf,
}

impl TriggerDefinition {
    /// Parse and validate the contents of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is invalid or the
    /// definition breaks an invariant (empty name or binary, bad glob).
    pub fn parse(content: &str, file: &Path, layer: Layer) -> Result<Self, ConfigError> {
        let parse_err = |reason: String| ConfigError::Parse {
            file: file.to_path_buf(),
            reason,
        };

        let mut def: Self =
            toml::from_str(content).map_err(|e| parse_err(e.to_string().trim().to_string()))?;

        if def.name.is_empty() {
            def.name = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        def.layer = layer;
        def.source = file.to_path_buf();
        def.validate().map_err(parse_err)?;
        Ok(def)
    }

    /// Render the declarative fields back to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Whether this trigger declares no watched paths and therefore runs on
    /// every invocation.
    #[must_use]
    pub const fn always_dirty(&self) -> bool {
        self.paths.is_empty()
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.contains(',') || self.name.chars().any(char::is_whitespace) {
            return Err(format!(
                "name '{}' must not contain commas or whitespace",
                self.name
            ));
        }
        if self.binary.trim().is_empty() {
            return Err("binary must not be empty".to_string());
        }
        for (key, patterns) in [
            ("paths", &self.paths),
            ("remove", &self.remove),
            ("remove_exclude", &self.remove_exclude),
        ] {
            for pattern in patterns {
                glob::validate(pattern).map_err(|reason| format!("{key}: {reason}"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<TriggerDefinition, ConfigError> {
        TriggerDefinition::parse(content, Path::new("/etc/usysconf.d/ldconfig.toml"), Layer::Admin)
    }

    #[test]
    fn parse_full_definition() {
        let def = parse(
            r#"
name = "ld-cache"
description = "Updating dynamic library cache"
binary = "/sbin/ldconfig"
arguments = ["-X"]
paths = ["/usr/lib64/*.so*"]
priority = 10
skip_live = true

[env]
LC_ALL = "C"
"#,
        )
        .unwrap();
        assert_eq!(def.name, "ld-cache");
        assert_eq!(def.binary, "/sbin/ldconfig");
        assert_eq!(def.arguments, vec!["-X"]);
        assert_eq!(def.priority, 10);
        assert!(def.skip_live);
        assert!(!def.skip);
        assert_eq!(def.env.get("LC_ALL").map(String::as_str), Some("C"));
        assert_eq!(def.layer, Layer::Admin);
    }

    #[test]
    fn name_defaults_to_file_stem() {
        let def = parse("binary = \"/sbin/ldconfig\"\n").unwrap();
        assert_eq!(def.name, "ldconfig");
        assert!(def.always_dirty());
        assert_eq!(def.priority, 0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse("binary = \"x\"\nbinnary = \"y\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("ldconfig.toml"));
    }

    #[test]
    fn missing_binary_is_rejected() {
        assert!(parse("description = \"nothing to run\"\n").is_err());
    }

    #[test]
    fn empty_binary_is_rejected() {
        let err = parse("binary = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("binary must not be empty"));
    }

    #[test]
    fn name_with_comma_is_rejected() {
        let err = parse("name = \"a,b\"\nbinary = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("commas"));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = parse("binary = \"x\"\npaths = [\"/usr/share/[fonts\"]\n").unwrap_err();
        assert!(err.to_string().contains("paths"));
    }

    #[test]
    fn relative_watch_path_is_rejected() {
        let err = parse("binary = \"x\"\npaths = [\"usr/share/fonts\"]\n").unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn declarative_fields_survive_toml_rendering() {
        let original = parse(
            "name = \"fonts\"\ndescription = \"Rebuild font cache\"\nbinary = \"fc-cache\"\narguments = [\"-f\"]\npaths = [\"/usr/share/fonts/**\"]\npriority = -5\nskip = true\n",
        )
        .unwrap();
        let rendered = original.to_toml().unwrap();
        let reparsed = parse(&rendered).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn layer_display() {
        assert_eq!(Layer::Vendor.to_string(), "vendor");
        assert_eq!(Layer::Admin.to_string(), "admin");
    }
}
