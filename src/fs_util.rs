use std::fs;
use std::path::Path;

/// Removes a day's transient archive file and extracted directory if they
/// exist. Removal errors are logged, never raised: cleanup must not be able
/// to fail a day that otherwise succeeded, and it runs after failed days too.
pub fn remove_day_artifacts(archive: &Path, extract_dir: &Path) {
    if archive.exists() {
        if let Err(err) = fs::remove_file(archive) {
            tracing::warn!(path = %archive.display(), %err, "could not remove archive file");
        }
    }
    if extract_dir.exists() {
        if let Err(err) = fs::remove_dir_all(extract_dir) {
            tracing::warn!(path = %extract_dir.display(), %err, "could not remove extracted directory");
        }
    }
}
