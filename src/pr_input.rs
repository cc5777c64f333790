use std::path::Path;

use crate::error::{ContribError, Result};
use crate::types::PullRequest;

/// Read merged PRs from a JSON array file.
pub fn load(path: &Path) -> Result<Vec<PullRequest>> {
    let contents = std::fs::read_to_string(path).map_err(|e| ContribError::PrDataRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ContribError::PrDataParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Like [`load`], but an unreadable or malformed file only costs the timing
/// analysis, not the run.
pub fn load_or_empty(path: Option<&Path>) -> Vec<PullRequest> {
    let Some(path) = path else {
        return Vec::new();
    };

    match load(path) {
        Ok(prs) => {
            tracing::info!(count = prs.len(), path = %path.display(), "loaded PR data");
            prs
        }
        Err(e) => {
            tracing::warn!(error = %e, "continuing without PR data");
            Vec::new()
        }
    }
}
