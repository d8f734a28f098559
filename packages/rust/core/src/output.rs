//! Stage artifact persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use upscnews_shared::{Result, UpscNewsError};

/// Write `content` to `dir/filename`, creating `dir` on demand.
///
/// The content goes to a hidden temp file that is renamed over the target,
/// so readers never observe a half-written artifact.
#[instrument(skip_all, fields(dir = %dir.display(), file = %filename))]
pub fn persist_artifact(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| UpscNewsError::io(dir, e))?;

    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    if let Err(err) = write_temp(&temp, content) {
        let _ = std::fs::remove_file(&temp);
        return Err(err);
    }

    if let Err(e) = std::fs::rename(&temp, &target) {
        let _ = std::fs::remove_file(&temp);
        return Err(UpscNewsError::io(&target, e));
    }

    debug!(size = content.len(), "wrote artifact");
    Ok(target)
}

fn write_temp(temp: &Path, content: &str) -> Result<()> {
    // The handle is dropped (closed) when this function returns.
    let mut file = std::fs::File::create(temp).map_err(|e| UpscNewsError::io(temp, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| UpscNewsError::io(temp, e))?;
    file.sync_all().map_err(|e| UpscNewsError::io(temp, e))
}
