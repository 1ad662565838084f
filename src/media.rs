use crate::config::RunConfig;
use crate::error::{AppError, Result};
use crate::unit::Unit;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Media source resolution and fetching through an external tool.
///
/// Both operations are delegated to yt-dlp, which reuses the operator's
/// browser login session for authentication. The `MediaTool` trait keeps
/// the orchestration logic testable without touching the real binary.

const RESOLVE_TIMEOUT_SECS: u64 = 60;

/// A playable media reference for one video unit.
///
/// `direct_url` is freshly time-limited; `page_url` is the authenticated
/// lesson page the download executor re-extracts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub page_url: String,
    pub direct_url: String,
}

/// A video unit paired with its playable source. Never persisted; lives for
/// one run only, since resolution is re-done per run.
#[derive(Debug, Clone)]
pub struct ResolvedVideo {
    pub unit: Unit,
    pub source: MediaSource,
    pub resolved_at: DateTime<Utc>,
}

/// External extraction and download capability.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Resolves a video unit to a playable source.
    ///
    /// # Errors
    /// `AuthRequired` when the browser session is missing or expired
    /// (run-fatal), `ExtractionFailed` for a per-unit failure.
    async fn resolve(&self, unit: &Unit) -> Result<MediaSource>;

    /// Fetches a resolved video into the destination template.
    ///
    /// # Errors
    /// `DownloadFailed` when the executor reports a non-zero status.
    async fn fetch(&self, video: &ResolvedVideo, template: &Path, config: &RunConfig)
        -> Result<()>;
}

/// Login-related failure patterns in yt-dlp's stderr. These are run-fatal:
/// an expired session fails every subsequent unit identically.
pub(crate) fn looks_like_auth_error(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    ["sign in", "log in", "login", "authentication", "cookies"]
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Drives the yt-dlp binary via subprocess.
pub struct YtDlpTool {
    program: String,
    cookie_browser: String,
    resolve_timeout: Duration,
}

impl YtDlpTool {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            program: config.ytdlp_program.clone(),
            cookie_browser: config.cookie_browser.clone(),
            resolve_timeout: Duration::from_secs(RESOLVE_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl MediaTool for YtDlpTool {
    async fn resolve(&self, unit: &Unit) -> Result<MediaSource> {
        debug!(seq = unit.sequence, url = %unit.view_url, "resolving media source");

        // On timeout the output future is dropped; kill_on_drop reaps the
        // child instead of leaving it running with its pipes open.
        let child = Command::new(&self.program)
            .arg("--cookies-from-browser")
            .arg(&self.cookie_browser)
            .arg("-g")
            .arg("-f")
            .arg("bv*+ba/b")
            .arg(&unit.view_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.resolve_timeout, child)
            .await
            .map_err(|_| {
                AppError::ExtractionFailed(format!(
                    "{} timed out resolving {}",
                    self.program, unit.view_url
                ))
            })?
            .map_err(|e| AppError::ExtractionFailed(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim().to_string();
            if looks_like_auth_error(&message) {
                return Err(AppError::AuthRequired(message));
            }
            return Err(AppError::ExtractionFailed(if message.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                message
            }));
        }

        // HLS cases return one line (muxed) or two (separate video/audio);
        // the first line is the video URL.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let direct_url = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                AppError::ExtractionFailed(format!("{} returned no URL", self.program))
            })?
            .to_string();

        Ok(MediaSource {
            page_url: unit.view_url.clone(),
            direct_url,
        })
    }

    async fn fetch(
        &self,
        video: &ResolvedVideo,
        template: &Path,
        config: &RunConfig,
    ) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("--cookies-from-browser")
            .arg(&self.cookie_browser)
            .arg("--no-overwrites")
            .arg("--continue")
            .arg("-N")
            .arg(config.threads.to_string())
            .arg("-S")
            .arg(&config.quality)
            .arg("--add-metadata")
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("-o")
            .arg(template)
            .arg(&video.source.page_url)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| AppError::DownloadFailed(format!("failed to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(AppError::DownloadFailed(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

/// Resolves every video unit to a playable source, in sequence order.
///
/// Per-unit extraction failures are recorded and resolution continues with
/// the next unit. `AuthRequired` aborts immediately: every remaining unit
/// would fail the same way.
pub async fn resolve_sources(
    units: &[Unit],
    tool: &dyn MediaTool,
) -> Result<(Vec<ResolvedVideo>, Vec<(Unit, AppError)>)> {
    let mut resolved = Vec::new();
    let mut failed = Vec::new();

    for unit in units.iter().filter(|u| u.is_video()) {
        match tool.resolve(unit).await {
            Ok(source) => resolved.push(ResolvedVideo {
                unit: unit.clone(),
                source,
                resolved_at: Utc::now(),
            }),
            Err(err @ AppError::AuthRequired(_)) => return Err(err),
            Err(err) => {
                warn!(seq = unit.sequence, title = %unit.title, error = %err, "extraction failed");
                failed.push((unit.clone(), err));
            }
        }
    }

    Ok((resolved, failed))
}
