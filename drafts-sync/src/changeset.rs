//! Change-set resolution: which files differ between two revisions.

use std::path::Path;
use std::process::Command;

use crate::SyncError;

/// Extension of the files scanned for `DraftImage` elements.
pub const DEFAULT_EXTENSION: &str = ".jsx";

/// Paths changed between `before` and `current`, relative to `repo`.
///
/// Deleted paths are left out since there is nothing left to read. Both
/// revisions must be present locally; a shallow clone missing `before`
/// makes git fail, and that failure is returned as-is.
pub fn changed_files(repo: &Path, before: &str, current: &str) -> Result<Vec<String>, SyncError> {
    let args = [
        "diff",
        "--name-only",
        "--diff-filter=d",
        "-z",
        before,
        current,
    ];
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(SyncError::GitSpawn)?;

    if !output.status.success() {
        return Err(SyncError::Git {
            args: args.join(" "),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}

/// Keep only paths ending in `extension`, preserving order.
pub fn filter_by_extension(paths: Vec<String>, extension: &str) -> Vec<String> {
    paths
        .into_iter()
        .filter(|p| p.ends_with(extension))
        .collect()
}

/// [`changed_files`] filtered by [`filter_by_extension`].
pub fn resolve(
    repo: &Path,
    before: &str,
    current: &str,
    extension: &str,
) -> Result<Vec<String>, SyncError> {
    let all = changed_files(repo, before, current)?;
    let total = all.len();
    let matching = filter_by_extension(all, extension);
    tracing::info!(
        "{} changed file(s) between {} and {}, {} matching '{}'",
        total,
        short_sha(before),
        short_sha(current),
        matching.len(),
        extension
    );
    Ok(matching)
}

fn short_sha(rev: &str) -> &str {
    rev.get(..7).unwrap_or(rev)
}
