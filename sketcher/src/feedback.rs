use anyhow::{Context, Result};
use log::{info, warn};
use std::{fs::OpenOptions, io::Write, path::Path};

/// Append one line of feedback to `path`. Returns `false` when `text` is blank.
pub fn append(path: impl AsRef<Path>, text: &str) -> Result<bool> {
    let path = path.as_ref();

    // Multi-line feedback is folded so that the log stays one entry per line.
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.is_empty() {
        warn!("empty feedback, nothing saved");
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open feedback log {} failed", path.display()))?;
    writeln!(file, "{line}")?;

    info!("feedback saved to {}", path.display());
    Ok(true)
}
