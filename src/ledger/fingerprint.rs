//! Fingerprints summarizing a trigger's watched paths.
use std::fmt::Write as _;
use std::os::unix::ffi::OsStrExt as _;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

use crate::glob;

/// Compute the fingerprint of `patterns`.
///
/// The digest covers the patterns themselves and, for every matched path in
/// sorted order, the path, its size and its modification time. Returns
/// `None` when no patterns are declared: such a trigger is always dirty.
#[must_use]
pub fn fingerprint(patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    for pattern in patterns {
        hasher.update(pattern.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([0xffu8]);

    let mut matched = 0usize;
    for path in glob::expand(patterns) {
        // Symlinks are hashed by their target; a dangling link by itself.
        // Vanished between expansion and stat: leave it out.
        let Ok(meta) = path.metadata().or_else(|_| path.symlink_metadata()) else {
            continue;
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();

        hasher.update(path.as_os_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(meta.len().to_le_bytes());
        hasher.update(mtime.as_secs().to_le_bytes());
        hasher.update(mtime.subsec_nanos().to_le_bytes());
        matched += 1;
    }
    tracing::trace!("fingerprinted {matched} path(s)");

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(7 + 64);
    hex.push_str("sha256:");
    for b in &digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Some(hex)
}
