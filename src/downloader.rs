use crate::archive::ArchiveStore;
use crate::config::RunConfig;
use crate::error::Result;
use crate::media::{MediaTool, ResolvedVideo};
use crate::naming::{sanitize_title, target_stem};
use crate::summary::RunSummary;
use crate::unit::Unit;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Ordered download orchestration: builds one destination per resolved
/// video, consults the marker store for resume/skip, and drives the
/// external download executor one unit at a time in course order. The
/// executor parallelizes its own segment fetches internally.

/// A resolved video paired with its destination template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Output template handed to the executor; the executor substitutes the
    /// container extension.
    pub destination: PathBuf,
    pub sequence: u32,
    pub title: String,
}

/// Builds the destination template for one unit inside the course directory.
pub fn build_target(course_dir: &Path, unit: &Unit) -> DownloadTarget {
    DownloadTarget {
        destination: course_dir.join(format!("{}.%(ext)s", target_stem(unit.sequence, &unit.title))),
        sequence: unit.sequence,
        title: unit.title.clone(),
    }
}

/// Splits video units into those still pending and those already in the
/// marker store. Pre-archived units go straight to `skipped` without a
/// resolver call; a lesson that was downloaded and later removed from the
/// platform must not fail a re-run of a completed course.
pub fn partition_pending(
    units: &[Unit],
    archive: &dyn ArchiveStore,
) -> (Vec<Unit>, Vec<Unit>) {
    units
        .iter()
        .filter(|u| u.is_video())
        .cloned()
        .partition(|u| !archive.contains(&u.native_id))
}

pub struct Orchestrator<'a> {
    tool: &'a dyn MediaTool,
    config: &'a RunConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(tool: &'a dyn MediaTool, config: &'a RunConfig) -> Self {
        Self { tool, config }
    }

    /// Course directory under the output root, named after the course.
    pub fn course_dir(&self, course_title: &str) -> PathBuf {
        let root = self
            .config
            .output_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        root.join(sanitize_title(course_title))
    }

    /// Planned targets for the video units of an outline, in sequence order.
    /// Touches neither the network nor the filesystem.
    pub fn plan(&self, course_title: &str, units: &[Unit]) -> Vec<DownloadTarget> {
        let course_dir = self.course_dir(course_title);
        units
            .iter()
            .filter(|u| u.is_video())
            .map(|unit| build_target(&course_dir, unit))
            .collect()
    }

    /// Prints the planned target list.
    pub fn print_plan(&self, course_title: &str, units: &[Unit]) {
        println!("Planned downloads for \"{course_title}\":");
        for target in self.plan(course_title, units) {
            println!(
                "  {:02} - {} -> {}",
                target.sequence,
                target.title,
                target.destination.display()
            );
        }
    }

    /// Downloads every resolved video in ascending sequence order.
    ///
    /// Units already present in the marker store are skipped; a per-target
    /// failure is recorded and the remaining targets are still attempted.
    /// Successful downloads are appended to the marker store so an
    /// interrupted run resumes where it left off.
    pub async fn download(
        &self,
        course_title: &str,
        resolved: &[ResolvedVideo],
        archive: &mut dyn ArchiveStore,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::new();

        if self.config.dry_run {
            return Ok(summary);
        }

        let course_dir = self.course_dir(course_title);
        tokio::fs::create_dir_all(&course_dir).await?;
        info!(dir = %course_dir.display(), videos = resolved.len(), "starting downloads");

        for video in resolved {
            let unit = &video.unit;
            let target = build_target(&course_dir, unit);

            if archive.contains(&unit.native_id) {
                println!("[skip] {:02} - {} (already downloaded)", unit.sequence, unit.title);
                summary.record_skip();
                continue;
            }

            println!("[get ] {:02} - {}", unit.sequence, unit.title);
            match self.tool.fetch(video, &target.destination, self.config).await {
                Ok(()) => match archive.append(&unit.native_id) {
                    Ok(()) => summary.record_success(),
                    Err(e) => {
                        error!(seq = unit.sequence, error = %e, "failed to record completion marker");
                        summary.record_failure(unit.clone(), e);
                    }
                },
                Err(e) => {
                    error!(seq = unit.sequence, title = %unit.title, error = %e, "download failed");
                    summary.record_failure(unit.clone(), e);
                }
            }
        }

        Ok(summary)
    }
}
