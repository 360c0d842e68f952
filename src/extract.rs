use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TrackerError;

/// Result of one extraction attempt. A failing archive degrades the day;
/// a missing tool is an environment problem and surfaces as an error.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    Extracted,
    Failed { reason: String },
}

pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<ExtractOutcome, TrackerError>;
}

/// Shells out to `7z`, which is the only widely available decoder for the
/// ppmd-compressed feed archives.
#[derive(Clone)]
pub struct SevenZipExtractor {
    tool: Option<PathBuf>,
}

impl SevenZipExtractor {
    pub fn new() -> Self {
        Self {
            tool: find_in_path("7z").or_else(|| find_in_path("7za")),
        }
    }

    fn require_tool(&self) -> Result<&PathBuf, TrackerError> {
        self.tool
            .as_ref()
            .ok_or_else(|| TrackerError::MissingTool("7z".to_string()))
    }
}

impl Default for SevenZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for SevenZipExtractor {
    fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<ExtractOutcome, TrackerError> {
        let tool = self.require_tool()?;
        let output = Command::new(tool)
            .arg("x")
            .arg(archive)
            .arg(format!("-o{}", destination.display()))
            .arg("-y")
            .output()
            .map_err(|err| TrackerError::Filesystem(err.to_string()))?;

        if output.status.success() {
            return Ok(ExtractOutcome::Extracted);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            format!("7z exited with {}", output.status)
        } else {
            stderr
        };
        Ok(ExtractOutcome::Failed { reason })
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for path in std::env::split_paths(&path_var) {
        let exe = path.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = path.join(name);
        if plain.exists() {
            return Some(plain);
        }
    }
    None
}
