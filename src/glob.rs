//! Absolute path globs: validation and expansion against the filesystem.
//!
//! `*`, `?` and `[..]` never cross a `/`; `**` matches any number of
//! directories. Expansion walks only below the literal prefix of each
//! pattern, so `/usr/share/icons/*/index.theme` never scans outside
//! `/usr/share/icons`.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

const META: &[char] = &['*', '?', '[', ']', '{', '}'];

fn matcher(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Check that `pattern` is an absolute, well-formed glob.
///
/// # Errors
///
/// Returns a human-readable reason when the pattern is rejected.
pub fn validate(pattern: &str) -> Result<(), String> {
    if !pattern.starts_with('/') {
        return Err(format!("'{pattern}' must be an absolute path"));
    }
    matcher(pattern).map_err(|e| format!("invalid glob '{pattern}': {e}"))?;
    Ok(())
}

/// Split `pattern` into its literal directory prefix and the number of path
/// components below it (`None` when `**` allows unlimited depth).
fn literal_base(pattern: &str) -> (PathBuf, Option<usize>) {
    let mut base = PathBuf::from("/");
    let mut components = pattern.split('/').filter(|c| !c.is_empty()).peekable();
    while let Some(component) = components.next_if(|c| !c.contains(META)) {
        base.push(component);
    }
    let rest: Vec<&str> = components.collect();
    let depth = (!rest.iter().any(|c| c.contains("**"))).then_some(rest.len());
    (base, depth)
}

/// Expand a single pattern into the existing paths it matches.
fn expand_one(pattern: &str, out: &mut BTreeSet<PathBuf>) {
    if !pattern.contains(META) {
        let path = Path::new(pattern);
        if path.symlink_metadata().is_ok() {
            out.insert(path.to_path_buf());
        }
        return;
    }

    let Ok(glob) = matcher(pattern) else {
        tracing::debug!("ignoring invalid glob '{pattern}'");
        return;
    };
    let (base, depth) = literal_base(pattern);

    let mut walker = WalkDir::new(&base).min_depth(1).follow_links(false);
    if let Some(depth) = depth {
        walker = walker.max_depth(depth);
    }
    for entry in walker.into_iter().filter_map(Result::ok) {
        if glob.is_match(entry.path()) {
            out.insert(entry.into_path());
        }
    }
}

/// Expand `patterns` into the sorted, de-duplicated set of existing paths.
#[must_use]
pub fn expand(patterns: &[String]) -> BTreeSet<PathBuf> {
    let mut out = BTreeSet::new();
    for pattern in patterns {
        expand_one(pattern, &mut out);
    }
    out
}

/// Expand `patterns`, dropping every path matched by one of `excludes`.
#[must_use]
pub fn expand_excluding(patterns: &[String], excludes: &[String]) -> BTreeSet<PathBuf> {
    let excluded: Vec<GlobMatcher> = excludes.iter().filter_map(|p| matcher(p).ok()).collect();
    expand(patterns)
        .into_iter()
        .filter(|path| !excluded.iter().any(|m| m.is_match(path)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"x").unwrap();
    }

    fn pattern(dir: &Path, suffix: &str) -> String {
        format!("{}/{suffix}", dir.display())
    }

    #[test]
    fn validate_rejects_relative_pattern() {
        let err = validate("share/fonts/*").unwrap_err();
        assert!(err.contains("absolute"));
    }

    #[test]
    fn validate_rejects_unclosed_class() {
        assert!(validate("/usr/[lib").is_err());
    }

    #[test]
    fn validate_accepts_recursive_glob() {
        assert!(validate("/usr/share/fonts/**/*.ttf").is_ok());
    }

    #[test]
    fn literal_base_stops_at_first_glob_component() {
        let (base, depth) = literal_base("/usr/share/icons/*/index.theme");
        assert_eq!(base, PathBuf::from("/usr/share/icons"));
        assert_eq!(depth, Some(2));
    }

    #[test]
    fn literal_base_recursive_has_no_depth_limit() {
        let (base, depth) = literal_base("/usr/share/fonts/**");
        assert_eq!(base, PathBuf::from("/usr/share/fonts"));
        assert_eq!(depth, None);
    }

    #[test]
    fn star_does_not_cross_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.so"));
        touch(&dir.path().join("nested/b.so"));

        let found = expand(&[pattern(dir.path(), "*.so")]);
        assert_eq!(found.len(), 1);
        assert!(found.contains(&dir.path().join("a.so")));
    }

    #[test]
    fn double_star_recurses() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.ttf"));
        touch(&dir.path().join("x/y/b.ttf"));
        touch(&dir.path().join("x/y/c.txt"));

        let found = expand(&[pattern(dir.path(), "**/*.ttf")]);
        assert!(found.contains(&dir.path().join("a.ttf")));
        assert!(found.contains(&dir.path().join("x/y/b.ttf")));
        assert!(!found.contains(&dir.path().join("x/y/c.txt")));
    }

    #[test]
    fn literal_pattern_matches_existing_path_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("ld.so.conf"));

        let found = expand(&[
            pattern(dir.path(), "ld.so.conf"),
            pattern(dir.path(), "missing.conf"),
        ]);
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![dir.path().join("ld.so.conf")]);
    }

    #[test]
    fn overlapping_patterns_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cache"));

        let found = expand(&[pattern(dir.path(), "*.cache"), pattern(dir.path(), "a.*")]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn missing_base_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand(&[pattern(dir.path(), "absent/*")]).is_empty());
    }

    #[test]
    fn excludes_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("hicolor/icon-theme.cache"));
        touch(&dir.path().join("Adwaita/icon-theme.cache"));

        let found = expand_excluding(
            &[pattern(dir.path(), "*/icon-theme.cache")],
            &[pattern(dir.path(), "hicolor/*")],
        );
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec![dir.path().join("Adwaita/icon-theme.cache")]
        );
    }
}
