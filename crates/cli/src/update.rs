//! Weekly check against crates.io for a newer release.
//!
//! The check must never get in the user's way: short timeout, cached
//! result, and every failure collapses to a debug log line.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use difflens_transcript::style;
use serde::{Deserialize, Serialize};
use std::path::Path;

const CRATE_URL: &str = "https://crates.io/api/v1/crates/difflens";
const CACHE_FILE_NAME: &str = "update-check.json";
const CHECK_INTERVAL_DAYS: i64 = 7;
const REQUEST_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Serialize, Deserialize)]
struct UpdateCache {
    last_check: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latest_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_version: String,
}

/// Check for a newer release and print a dim one-liner if there is one.
pub async fn check_for_update() {
    if let Err(e) = check_inner().await {
        tracing::debug!("update check skipped: {:#}", e);
    }
}

async fn check_inner() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    let cache_path = crate::config::config_dir()?.join(CACHE_FILE_NAME);

    if let Some(cache) = read_cache(&cache_path) {
        if Utc::now() - cache.last_check < Duration::days(CHECK_INTERVAL_DAYS) {
            if let Some(latest) = &cache.latest_version {
                notify_if_newer(current, latest);
            }
            return Ok(());
        }
    }

    let latest = match fetch_latest_version().await {
        Ok(latest) => latest,
        Err(e) => {
            // Remember the attempt so an offline machine is not probed on
            // every run.
            write_cache(&cache_path, None)?;
            return Err(e);
        }
    };
    write_cache(&cache_path, Some(&latest))?;
    notify_if_newer(current, &latest);
    Ok(())
}

async fn fetch_latest_version() -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("difflens/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build http client")?;
    let response: CratesIoResponse = client
        .get(CRATE_URL)
        .send()
        .await
        .context("Failed to reach crates.io")?
        .error_for_status()
        .context("crates.io returned an error")?
        .json()
        .await
        .context("Failed to decode crates.io response")?;
    Ok(response.krate.max_version)
}

fn read_cache(path: &Path) -> Option<UpdateCache> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn write_cache(path: &Path, latest_version: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let cache = UpdateCache {
        last_check: Utc::now(),
        latest_version: latest_version.map(str::to_string),
    };
    let content = serde_json::to_string(&cache).context("Failed to serialize update cache")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn notify_if_newer(current: &str, latest: &str) {
    if is_newer(latest, current) {
        println!(
            "{}",
            style::dim(&format!(
                "A new version of difflens is available: {current} -> {latest} (cargo install difflens)"
            ))
        );
    }
}

/// Compare dotted version triples numerically. Anything non-numeric in a
/// component counts as zero, so "1.2.x" never beats "1.2.0".
fn is_newer(candidate: &str, current: &str) -> bool {
    triple(candidate) > triple(current)
}

fn triple(version: &str) -> [u64; 3] {
    let mut parts = [0u64; 3];
    for (i, part) in version.trim_start_matches('v').split('.').take(3).enumerate() {
        parts[i] = part
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap_or(0);
    }
    parts
}
