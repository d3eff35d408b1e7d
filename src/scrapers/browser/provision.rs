//! Ordered provisioning strategies for the rendering-engine binary.
//!
//! Each strategy is independent and swallows its own failures; the
//! provisioner walks the list and stops at the first success. All four
//! failing means the rendering tier is unavailable, which the pipeline
//! treats as "fall back to the static fetch", never as a run failure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::version;
use super::AcquireError;
use crate::scrapers::http_client::HttpClient;

/// Executable names probed on the execution path.
pub const ENGINE_EXECUTABLE_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome-headless-shell",
];

/// Common engine installation paths to check.
pub const ENGINE_INSTALL_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Shared inputs for provisioning attempts.
pub struct ProvisionContext {
    /// Managed cache directory for downloaded engines.
    pub cache_dir: PathBuf,
    /// Client for release endpoints and downloads.
    pub http: HttpClient,
}

impl ProvisionContext {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            http: HttpClient::new(Duration::from_secs(10)),
        }
    }
}

/// One provisioning tier.
#[async_trait]
pub trait EngineStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Try to produce an engine executable. `None` means "nothing here,
    /// try the next tier"; strategies never propagate errors.
    async fn attempt(&self, ctx: &ProvisionContext) -> Option<PathBuf>;
}

/// Tier (a): engine binary already present in the managed cache.
struct ManagedCache;

#[async_trait]
impl EngineStrategy for ManagedCache {
    fn name(&self) -> &'static str {
        "managed-cache"
    }

    async fn attempt(&self, ctx: &ProvisionContext) -> Option<PathBuf> {
        let mut releases: Vec<PathBuf> = std::fs::read_dir(&ctx.cache_dir)
            .ok()?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();

        // Newest release directory first
        releases.sort();
        releases.reverse();

        releases
            .into_iter()
            .find_map(|release| version::find_engine_binary(&release))
    }
}

/// Tier (b): well-known executable names on the execution path.
struct ExecutionPath;

#[async_trait]
impl EngineStrategy for ExecutionPath {
    fn name(&self) -> &'static str {
        "execution-path"
    }

    async fn attempt(&self, _ctx: &ProvisionContext) -> Option<PathBuf> {
        for name in ENGINE_EXECUTABLE_NAMES {
            if let Ok(path) = which::which(name) {
                return Some(path);
            }
        }
        None
    }
}

/// Tier (c): fixed list of known installation paths.
struct KnownPaths;

#[async_trait]
impl EngineStrategy for KnownPaths {
    fn name(&self) -> &'static str {
        "known-paths"
    }

    async fn attempt(&self, _ctx: &ProvisionContext) -> Option<PathBuf> {
        ENGINE_INSTALL_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }
}

/// Tier (d): download an engine release matched to the locally detected
/// browser version.
struct VersionMatchedDownload;

#[async_trait]
impl EngineStrategy for VersionMatchedDownload {
    fn name(&self) -> &'static str {
        "version-matched-download"
    }

    async fn attempt(&self, ctx: &ProvisionContext) -> Option<PathBuf> {
        let candidates = probe_candidates();
        let detected = version::detect_browser_version(&candidates);
        let release = version::resolve_release(&ctx.http, detected.as_deref()).await;

        match version::download_engine(&ctx.http, &release, &ctx.cache_dir).await {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("Engine download for release {} failed: {}", release, e);
                None
            }
        }
    }
}

/// Browser binaries worth probing for a local version.
fn probe_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = ENGINE_EXECUTABLE_NAMES
        .iter()
        .filter_map(|name| which::which(name).ok())
        .collect();
    candidates.extend(
        ENGINE_INSTALL_PATHS
            .iter()
            .map(PathBuf::from)
            .filter(|path| path.exists()),
    );
    candidates
}

/// The provisioning tiers in fallback order.
pub fn strategies() -> Vec<Box<dyn EngineStrategy>> {
    vec![
        Box::new(ManagedCache),
        Box::new(ExecutionPath),
        Box::new(KnownPaths),
        Box::new(VersionMatchedDownload),
    ]
}

/// Walk the strategy table and return the first engine executable found.
pub async fn provision(ctx: &ProvisionContext) -> Result<PathBuf, AcquireError> {
    for strategy in strategies() {
        match strategy.attempt(ctx).await {
            Some(path) => {
                info!(
                    "Rendering engine provisioned via {}: {}",
                    strategy.name(),
                    path.display()
                );
                return Ok(path);
            }
            None => debug!("Provisioning strategy {} yielded nothing", strategy.name()),
        }
    }

    Err(AcquireError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = strategies().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "managed-cache",
                "execution-path",
                "known-paths",
                "version-matched-download"
            ]
        );
    }

    #[tokio::test]
    async fn test_managed_cache_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProvisionContext::new(dir.path().to_path_buf());
        assert_eq!(ManagedCache.attempt(&ctx).await, None);
    }

    #[tokio::test]
    async fn test_managed_cache_finds_cached_engine() {
        let dir = tempfile::tempdir().unwrap();
        let release = dir.path().join("120.0.6099.109");
        let nested = release.join("chrome-headless-shell-linux64");
        std::fs::create_dir_all(&nested).unwrap();
        let binary = nested.join(version::engine_binary_name());
        std::fs::write(&binary, b"").unwrap();

        let ctx = ProvisionContext::new(dir.path().to_path_buf());
        assert_eq!(ManagedCache.attempt(&ctx).await, Some(binary));
    }

    #[tokio::test]
    async fn test_managed_cache_prefers_newest_release() {
        let dir = tempfile::tempdir().unwrap();
        for release in ["119.0.6045.105", "121.0.6167.85"] {
            let nested = dir.path().join(release).join("chrome-headless-shell-linux64");
            std::fs::create_dir_all(&nested).unwrap();
            std::fs::write(nested.join(version::engine_binary_name()), b"").unwrap();
        }

        let ctx = ProvisionContext::new(dir.path().to_path_buf());
        let found = ManagedCache.attempt(&ctx).await.unwrap();
        assert!(found.to_string_lossy().contains("121.0.6167.85"));
    }

    #[tokio::test]
    async fn test_known_paths_missing_everywhere_is_none() {
        // Strategies must report "nothing" rather than erroring even when
        // no engine exists on this machine.
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProvisionContext::new(dir.path().to_path_buf());
        let _ = KnownPaths.attempt(&ctx).await;
    }
}
