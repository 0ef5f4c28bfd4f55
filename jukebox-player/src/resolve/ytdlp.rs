//! yt-dlp backed resolver
//!
//! Runs `yt-dlp --dump-single-json` for each query and reads the direct
//! stream URL and metadata from its JSON output. Plain-text queries go
//! through the configured default search; only the first hit is used.

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::resolve::TrackResolver;
use crate::session::{Track, UNKNOWN_UPLOADER};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Reported durations are capped at one week
const MAX_DURATION_SECONDS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// Subset of yt-dlp's info JSON that we read
#[derive(Debug, Default, Deserialize)]
struct InfoJson {
    url: Option<String>,
    title: Option<String>,
    /// Seconds; yt-dlp reports fractional values for some extractors
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
    /// Present for search results and playlists
    entries: Option<Vec<InfoJson>>,
}

/// Resolver shelling out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    config: ResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.config.ytdlp_path);
        cmd.arg("--dump-single-json")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--no-check-certificate")
            .args(["--format", "bestaudio/best"])
            .args(["--default-search", self.config.default_search.as_str()]);

        if let Some(cookies) = self.config.cookies_file.as_ref().filter(|p| p.exists()) {
            cmd.arg("--cookies")
                .arg(cookies)
                .args(["--user-agent", self.config.user_agent.as_str()]);
        }

        cmd.arg("--").arg(query).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    async fn resolve(&self, query: &str, requester: &str) -> Result<Track> {
        let failure = |reason: String| Error::Resolution {
            query: query.to_string(),
            reason,
        };

        debug!(%query, "Resolving with yt-dlp");
        let output = self
            .command(query)
            .output()
            .await
            .map_err(|e| failure(format!("failed to run yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().last().unwrap_or("no output").trim().to_string();
            return Err(failure(format!("yt-dlp exited with {}: {reason}", output.status)));
        }

        parse_info(&output.stdout, query, requester)
    }
}

/// Build a track from yt-dlp JSON output
fn parse_info(stdout: &[u8], query: &str, requester: &str) -> Result<Track> {
    let failure = |reason: String| Error::Resolution {
        query: query.to_string(),
        reason,
    };

    let mut info: InfoJson = serde_json::from_slice(stdout)
        .map_err(|e| failure(format!("unreadable yt-dlp output: {e}")))?;

    if let Some(entries) = info.entries.take() {
        info = entries
            .into_iter()
            .next()
            .ok_or_else(|| failure("no search results".to_string()))?;
    }

    let url = info
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| failure("no playable stream".to_string()))?;

    let duration_seconds = info
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.round().min(MAX_DURATION_SECONDS) as u64)
        .unwrap_or(0);

    Ok(Track::new(
        url,
        info.title.unwrap_or_else(|| query.to_string()),
        duration_seconds,
        requester,
        info.uploader
            .or(info.channel)
            .unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
    ))
}
