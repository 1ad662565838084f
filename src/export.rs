use crate::config::RunConfig;
use crate::error::{AppError, Result};
use crate::media::ResolvedVideo;
use crate::summary::RunSummary;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// CSV export of resolved video URLs.
///
/// One row per resolved video in ascending sequence order, fixed header
/// `url,title,path`. The file is fully overwritten each run. Verification
/// is advisory annotation only: a unit whose probe fails is recorded in the
/// summary but its row is still written, so the CSV always reflects every
/// video unit found.

const PROBE_TIMEOUT_SECS: u64 = 15;

/// Liveness probe for a resolved URL.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<()>;
}

/// HEAD-request prober; follows redirects.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .head(url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| AppError::ProbeFailed(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| AppError::ProbeFailed(e.to_string()))?;
        Ok(())
    }
}

pub struct ExportWriter<'a> {
    prober: &'a dyn Prober,
    config: &'a RunConfig,
}

impl<'a> ExportWriter<'a> {
    pub fn new(prober: &'a dyn Prober, config: &'a RunConfig) -> Self {
        Self { prober, config }
    }

    /// Writes the CSV export for all resolved videos.
    ///
    /// With `verify` set, each URL is probed first; probe failures are
    /// recorded in the summary without dropping the row.
    pub async fn export(&self, resolved: &[ResolvedVideo]) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let path_column = self
            .config
            .output_root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string());

        let mut writer = csv::Writer::from_path(&self.config.csv_out)?;
        writer.write_record(["url", "title", "path"])?;

        for video in resolved {
            let unit = &video.unit;

            if self.config.verify {
                match self.prober.probe(&video.source.direct_url).await {
                    Ok(()) => summary.record_success(),
                    Err(e) => {
                        warn!(seq = unit.sequence, title = %unit.title, error = %e, "probe failed");
                        summary.record_failure(unit.clone(), e);
                    }
                }
            } else {
                summary.record_success();
            }

            let title = format!("{:02} - {}", unit.sequence, unit.title);
            writer.write_record([
                video.source.direct_url.as_str(),
                title.as_str(),
                path_column.as_str(),
            ])?;
        }

        writer.flush()?;
        info!(
            rows = resolved.len(),
            out = %self.config.csv_out.display(),
            "export written"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaSource;
    use crate::unit::{Unit, UnitKind};
    use chrono::Utc;
    use std::path::PathBuf;

    fn video(sequence: u32, title: &str) -> ResolvedVideo {
        ResolvedVideo {
            unit: Unit {
                sequence,
                title: title.to_string(),
                kind: UnitKind::Video,
                native_id: format!("k{sequence}"),
                view_url: String::new(),
            },
            source: MediaSource {
                page_url: format!("page-{sequence}"),
                direct_url: format!("https://cdn.example/{sequence}.m3u8"),
            },
            resolved_at: Utc::now(),
        }
    }

    struct NoopProber;

    #[async_trait]
    impl Prober for NoopProber {
        async fn probe(&self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    struct FailingProber {
        fail_url: String,
    }

    #[async_trait]
    impl Prober for FailingProber {
        async fn probe(&self, url: &str) -> Result<()> {
            if url == self.fail_url {
                return Err(AppError::ProbeFailed("410 Gone".into()));
            }
            Ok(())
        }
    }

    fn config_for(csv_out: PathBuf, verify: bool) -> RunConfig {
        RunConfig {
            csv_out,
            verify,
            output_root: Some(PathBuf::from("out")),
            ..RunConfig::default()
        }
    }

    #[tokio::test]
    async fn writes_header_and_rows_in_sequence_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("videos.csv");
        let config = config_for(out.clone(), false);
        let resolved = vec![video(2, "Intro"), video(3, "RAG"), video(5, "Agents")];

        let summary = ExportWriter::new(&NoopProber, &config)
            .export(&resolved)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "url,title,path");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "https://cdn.example/2.m3u8,02 - Intro,out");
        assert_eq!(lines[2], "https://cdn.example/3.m3u8,03 - RAG,out");
        assert_eq!(lines[3], "https://cdn.example/5.m3u8,05 - Agents,out");
        assert_eq!(summary.succeeded, 3);
        assert!(summary.is_success());
    }

    #[tokio::test]
    async fn overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("videos.csv");
        let config = config_for(out.clone(), false);
        let writer = ExportWriter::new(&NoopProber, &config);

        writer
            .export(&[video(1, "A"), video(2, "B"), video(3, "C")])
            .await
            .unwrap();
        writer.export(&[video(1, "A")]).await.unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn probe_failure_is_recorded_but_row_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("videos.csv");
        let config = config_for(out.clone(), true);
        let prober = FailingProber {
            fail_url: "https://cdn.example/3.m3u8".into(),
        };
        let resolved = vec![video(2, "Intro"), video(3, "RAG")];

        let summary = ExportWriter::new(&prober, &config)
            .export(&resolved)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("03 - RAG"));
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0.sequence, 3);
        assert_eq!(summary.succeeded, 1);
    }
}
