//! Feedback reports: a snapshot of the session plus a user-supplied screenshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use convotree::Snapshot;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Files written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackFiles {
    pub state: PathBuf,
    pub screenshot: PathBuf,
}

/// Writes `state_<ts>.json` and `screenshot_<ts>.png` into one directory.
///
/// Reports made within the same second share a timestamp; the later one
/// replaces the earlier.
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    dir: PathBuf,
}

impl FeedbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, snapshot: &Snapshot, screenshot: &[u8]) -> Result<FeedbackFiles> {
        self.save_at(snapshot, screenshot, Local::now())
    }

    pub fn save_at(
        &self,
        snapshot: &Snapshot,
        screenshot: &[u8],
        at: DateTime<Local>,
    ) -> Result<FeedbackFiles> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create feedback directory: {}", self.dir.display())
        })?;
        let ts = at.format("%Y%m%d_%H%M%S");
        let files = FeedbackFiles {
            state: self.dir.join(format!("state_{ts}.json")),
            screenshot: self.dir.join(format!("screenshot_{ts}.png")),
        };

        let state = snapshot
            .to_json_pretty()
            .context("failed to serialize snapshot")?;
        let staged_state = stage(&self.dir, state.as_bytes())?;
        let staged_screenshot = stage(&self.dir, screenshot)?;

        persist(staged_screenshot, &files.screenshot)?;
        if let Err(e) = persist(staged_state, &files.state) {
            // A report is the pair; never leave a screenshot without its state.
            let _ = std::fs::remove_file(&files.screenshot);
            return Err(e);
        }
        tracing::info!(state = %files.state.display(), "saved feedback");
        Ok(files)
    }
}

/// Write through a temp file in the same directory, then rename into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    persist(stage(dir, bytes)?, path)
}

fn stage(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let mut tmp =
        NamedTempFile::new_in(dir).context("failed to create temp file for atomic write")?;
    tmp.write_all(bytes)
        .context("failed to write temp file for atomic write")?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}
