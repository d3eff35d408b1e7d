//! Rendering-engine release resolution and managed downloads.
//!
//! Maps a locally detected browser version to a compatible headless engine
//! release through an ordered list of resolution tiers, then downloads and
//! unpacks the release archive into the managed cache.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use regex::Regex;
use tracing::{debug, info};

use crate::scrapers::http_client::HttpClient;

/// Last-resort engine release when every resolution tier comes up empty.
pub const STABLE_FALLBACK_RELEASE: &str = "119.0.6045.105";

/// Known-compatible releases keyed by browser major version.
pub const KNOWN_RELEASES: &[(u32, &str)] = &[
    (119, "119.0.6045.105"),
    (120, "120.0.6099.109"),
    (121, "121.0.6167.85"),
    (122, "122.0.6261.94"),
    (123, "123.0.6312.86"),
    (124, "124.0.6367.91"),
];

const LIVE_RELEASE_BASE: &str = "https://googlechromelabs.github.io/chrome-for-testing";
const LEGACY_RELEASE_BASE: &str = "https://chromedriver.storage.googleapis.com";
const DOWNLOAD_BASE: &str = "https://storage.googleapis.com/chrome-for-testing-public";

/// Platform slug used by the release archives.
pub fn platform_slug() -> &'static str {
    if cfg!(target_os = "windows") {
        "win64"
    } else if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            "mac-arm64"
        } else {
            "mac-x64"
        }
    } else {
        "linux64"
    }
}

/// Name of the engine executable inside a release archive.
pub fn engine_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "chrome-headless-shell.exe"
    } else {
        "chrome-headless-shell"
    }
}

/// Extract a dotted version number from probe output like
/// "Chromium 120.0.6099.224 Arch Linux".
pub fn parse_version(text: &str) -> Option<String> {
    let re = Regex::new(r"(\d+(?:\.\d+)+)").ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Major component of a dotted version string.
pub fn major_version(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}

/// Probe installed browser candidates with `--version`.
///
/// Stands in for an OS installation registry: the first candidate that
/// executes and reports a parseable version wins.
pub fn detect_browser_version(candidates: &[PathBuf]) -> Option<String> {
    for path in candidates {
        let output = match Command::new(path).arg("--version").output() {
            Ok(output) if output.status.success() => output,
            _ => continue,
        };

        let text = String::from_utf8_lossy(&output.stdout);
        if let Some(version) = parse_version(&text) {
            debug!("Detected browser {} at {}", version, path.display());
            return Some(version);
        }
    }

    None
}

/// Resolve a compatible engine release for the detected browser version.
///
/// Tiers, each tried only when the previous returns nothing:
/// 1. live compatibility endpoint
/// 2. legacy fixed-version endpoint
/// 3. static table keyed by major version
/// 4. hardcoded stable release
pub async fn resolve_release(http: &HttpClient, detected: Option<&str>) -> String {
    let major = detected.and_then(major_version);

    if let Some(release) = query_live_endpoint(http, major).await {
        return release;
    }

    if let Some(release) = query_legacy_endpoint(http, major).await {
        return release;
    }

    if let Some(major) = major {
        if let Some((_, release)) = KNOWN_RELEASES.iter().find(|(m, _)| *m == major) {
            return release.to_string();
        }
    }

    STABLE_FALLBACK_RELEASE.to_string()
}

async fn query_live_endpoint(http: &HttpClient, major: Option<u32>) -> Option<String> {
    let url = match major {
        Some(major) => format!("{}/LATEST_RELEASE_{}", LIVE_RELEASE_BASE, major),
        None => format!("{}/LATEST_RELEASE_STABLE", LIVE_RELEASE_BASE),
    };

    match http.fetch_text(&url).await {
        Ok(body) => parse_version(body.trim()),
        Err(e) => {
            debug!("Live release endpoint unavailable: {}", e);
            None
        }
    }
}

async fn query_legacy_endpoint(http: &HttpClient, major: Option<u32>) -> Option<String> {
    let url = match major {
        Some(major) => format!("{}/LATEST_RELEASE_{}", LEGACY_RELEASE_BASE, major),
        None => format!("{}/LATEST_RELEASE", LEGACY_RELEASE_BASE),
    };

    match http.fetch_text(&url).await {
        Ok(body) => parse_version(body.trim()),
        Err(e) => {
            debug!("Legacy release endpoint unavailable: {}", e);
            None
        }
    }
}

/// Download and unpack an engine release into the managed cache.
///
/// Returns the path of the extracted executable.
pub async fn download_engine(
    http: &HttpClient,
    release: &str,
    cache_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let slug = platform_slug();
    let url = format!(
        "{}/{}/{}/chrome-headless-shell-{}.zip",
        DOWNLOAD_BASE, release, slug, slug
    );

    info!("Downloading rendering engine {} from {}", release, url);

    let bytes = http
        .inner()
        .get(&url)
        .timeout(std::time::Duration::from_secs(120))
        .send()
        .await
        .context("engine download request failed")?
        .error_for_status()
        .context("engine download rejected")?
        .bytes()
        .await
        .context("engine download truncated")?;

    let staging = tempfile::tempdir().context("could not create staging directory")?;
    let archive_path = staging.path().join("engine.zip");
    fs::write(&archive_path, &bytes).context("could not write engine archive")?;

    let target = cache_dir.join(release);
    fs::create_dir_all(&target).context("could not create engine cache directory")?;
    unpack_archive(&archive_path, &target)?;

    let binary = find_engine_binary(&target)
        .ok_or_else(|| anyhow::anyhow!("archive did not contain {}", engine_binary_name()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&binary)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&binary, perms)?;
    }

    info!("Rendering engine unpacked to {}", binary.display());
    Ok(binary)
}

/// Unpack a zip archive into the target directory.
fn unpack_archive(archive_path: &Path, target: &Path) -> anyhow::Result<()> {
    let file = fs::File::open(archive_path).context("could not open engine archive")?;
    let mut archive = zip::ZipArchive::new(file).context("engine archive is not a zip")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}

/// Locate the engine executable under a directory (release archives nest
/// the binary inside a platform-named folder).
pub fn find_engine_binary(dir: &Path) -> Option<PathBuf> {
    find_binary_at_depth(dir, 3)
}

fn find_binary_at_depth(dir: &Path, depth: u32) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && path.file_name().is_some_and(|n| n == engine_binary_name()) {
            return Some(path);
        }
        if path.is_dir() {
            subdirs.push(path);
        }
    }

    if depth == 0 {
        return None;
    }

    subdirs
        .into_iter()
        .find_map(|sub| find_binary_at_depth(&sub, depth - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_from_probe_output() {
        assert_eq!(
            parse_version("Chromium 120.0.6099.224 Arch Linux"),
            Some("120.0.6099.224".to_string())
        );
        assert_eq!(
            parse_version("Google Chrome 121.0.6167.85"),
            Some("121.0.6167.85".to_string())
        );
        assert_eq!(parse_version("no digits here"), None);
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("120.0.6099.224"), Some(120));
        assert_eq!(major_version("garbage"), None);
    }

    #[test]
    fn test_known_releases_cover_fallback_major() {
        let (major, release) = KNOWN_RELEASES[0];
        assert_eq!(major, 119);
        assert_eq!(release, STABLE_FALLBACK_RELEASE);
    }

    #[test]
    fn test_find_engine_binary_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("chrome-headless-shell-linux64");
        std::fs::create_dir_all(&nested).unwrap();
        let binary = nested.join(engine_binary_name());
        std::fs::write(&binary, b"").unwrap();

        assert_eq!(find_engine_binary(dir.path()), Some(binary));
    }

    #[test]
    fn test_find_engine_binary_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_engine_binary(dir.path()), None);
    }

    #[test]
    fn test_detect_browser_version_handles_missing_binaries() {
        let candidates = vec![PathBuf::from("/nonexistent/browser")];
        assert_eq!(detect_browser_version(&candidates), None);
    }
}
