use anyhow::{Context, Result};
use plancritic_core::Patch;
use std::fs;
use std::path::Path;

/// Concatenate the patches' diffs, each newline terminated.
pub fn patches_to_diff(patches: &[Patch]) -> String {
    let mut out = String::new();
    for patch in patches {
        out.push_str(&patch.diff_unified);
        if !patch.diff_unified.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Write all diffs to `path`. Returns `false` without touching the
/// filesystem when there is nothing to write.
pub fn write_patch_file(patches: &[Patch], path: &Path) -> Result<bool> {
    if patches.is_empty() {
        return Ok(false);
    }
    fs::write(path, patches_to_diff(patches))
        .with_context(|| format!("failed to write patches to {}", path.display()))?;
    Ok(true)
}
