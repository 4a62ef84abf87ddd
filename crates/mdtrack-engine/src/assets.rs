//! Best-effort asset fetching.
//!
//! Remote image resources are published under several filename variants
//! (preferred format first, fallbacks after). For each key the fetcher
//! tries `<base>/<key>.<variant>` in variant order and stores the first
//! hit; a key with no reachable variant is skipped with a warning. A fetch
//! run never fails because of individual misses.

use mdtrack_core::errors::{Result, TrackError, TrackErrorKind};
use mdtrack_store::atomic::atomic_write;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where to fetch from and where to put the results.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// URL prefix the key/variant path is appended to
    pub base_url: String,
    /// Extension variants in preference order, e.g. `["webp", "png"]`
    pub variants: Vec<String>,
    /// Destination directory; keys may contain '/' subpaths
    pub dest: PathBuf,
}

/// Counts reported after a fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Keys newly downloaded
    pub fetched: usize,
    /// Keys already present on disk in some variant
    pub skipped: usize,
    /// Keys with no reachable variant
    pub missed: usize,
}

fn local_path(dest: &Path, key: &str, variant: &str) -> PathBuf {
    dest.join(format!("{}.{}", key, variant))
}

/// Download a single URL, returning the body on HTTP 200.
fn fetch_one(url: &str) -> Option<Vec<u8>> {
    match ureq::get(url).call() {
        Ok(response) => {
            let mut body = Vec::new();
            match response.into_reader().read_to_end(&mut body) {
                Ok(_) => Some(body),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed reading response body");
                    None
                }
            }
        }
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Variant not reachable");
            None
        }
    }
}

/// Fetch every key in the plan, best-effort.
///
/// # Errors
///
/// `Http` only for malformed inputs (empty base URL or variant list);
/// per-key fetch misses are counted, logged, and never fatal.
pub fn fetch_assets(plan: &FetchPlan, keys: &[String]) -> Result<FetchReport> {
    if plan.base_url.trim().is_empty() {
        return Err(TrackError::new(TrackErrorKind::Http)
            .with_op("fetch_assets")
            .with_message("base URL must not be empty"));
    }
    if plan.variants.is_empty() {
        return Err(TrackError::new(TrackErrorKind::Http)
            .with_op("fetch_assets")
            .with_message("at least one filename variant is required"));
    }

    let base = plan.base_url.trim_end_matches('/');
    let mut report = FetchReport::default();

    for key in keys {
        // Any variant already on disk satisfies the key
        if plan
            .variants
            .iter()
            .any(|v| local_path(&plan.dest, key, v).exists())
        {
            report.skipped += 1;
            continue;
        }

        let mut hit = false;
        for variant in &plan.variants {
            let url = format!("{}/{}.{}", base, key, variant);
            if let Some(body) = fetch_one(&url) {
                atomic_write(&local_path(&plan.dest, key, variant), &body)?;
                tracing::debug!(key = %key, variant = %variant, bytes = body.len(), "Fetched asset");
                report.fetched += 1;
                hit = true;
                break;
            }
        }
        if !hit {
            tracing::warn!(key = %key, "No variant reachable, skipping asset");
            report.missed += 1;
        }
    }

    tracing::info!(
        fetched = report.fetched,
        skipped = report.skipped,
        missed = report.missed,
        "Asset fetch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_base_url_is_rejected() {
        let plan = FetchPlan {
            base_url: "  ".to_string(),
            variants: vec!["png".to_string()],
            dest: PathBuf::from("/tmp/unused"),
        };
        let err = fetch_assets(&plan, &["a".to_string()]).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::Http);
    }

    #[test]
    fn test_empty_variants_are_rejected() {
        let plan = FetchPlan {
            base_url: "http://localhost:1".to_string(),
            variants: vec![],
            dest: PathBuf::from("/tmp/unused"),
        };
        let err = fetch_assets(&plan, &["a".to_string()]).unwrap_err();
        assert_eq!(err.kind(), TrackErrorKind::Http);
    }

    #[test]
    fn test_existing_files_are_skipped_without_network() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("chara")).unwrap();
        std::fs::write(dir.path().join("chara/1001.png"), b"img").unwrap();

        let plan = FetchPlan {
            // Port 1 is never listening; a network attempt would miss, not hang
            base_url: "http://127.0.0.1:1".to_string(),
            variants: vec!["webp".to_string(), "png".to_string()],
            dest: dir.path().to_path_buf(),
        };
        let report = fetch_assets(&plan, &["chara/1001".to_string()]).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.fetched, 0);
    }

    #[test]
    fn test_unreachable_keys_are_misses_not_errors() {
        let dir = TempDir::new().unwrap();
        let plan = FetchPlan {
            base_url: "http://127.0.0.1:1".to_string(),
            variants: vec!["png".to_string()],
            dest: dir.path().to_path_buf(),
        };
        let report = fetch_assets(&plan, &["nope".to_string()]).unwrap();
        assert_eq!(report.missed, 1);
    }
}
