/// Course video downloader and exporter for learn.deeplearning.ai.
///
/// Given any lesson URL, this library discovers the parent course, resolves
/// its full ordered outline from the catalog's public API, classifies and
/// sequences every unit, resolves each video unit to a playable source via
/// yt-dlp (reusing the operator's browser login session), and either
/// downloads the videos in course order with resume support or exports the
/// resolved URLs to CSV.
///
/// # Architecture
///
/// - `outline`: course reference extraction and catalog API client
/// - `unit`: outline flattening, sequencing, and video/other classification
/// - `media`: the external extraction/download capability behind `MediaTool`
/// - `archive`: the completed-items marker store used for resume/skip
/// - `downloader`: ordered download orchestration and run accounting
/// - `export`: CSV export with optional URL liveness probing
///
/// # Example
/// ```no_run
/// use coursedl::{CatalogClient, CourseRef};
///
/// async fn example() -> coursedl::Result<()> {
///     let course = CourseRef::parse(
///         "https://learn.deeplearning.ai/courses/my-course/lesson/abc/intro",
///     )?;
///     let raw = CatalogClient::new().fetch_outline(&course).await?;
///     let outline = coursedl::unit::sequence(&course, &raw);
///     println!("{}: {} units", outline.title, outline.units.len());
///     Ok(())
/// }
/// ```
pub mod archive;
pub mod config;
pub mod downloader;
pub mod error;
pub mod export;
pub mod media;
pub mod naming;
pub mod outline;
pub mod summary;
pub mod unit;

// Re-export commonly used items
pub use archive::{ArchiveStore, FileArchive, MemoryArchive};
pub use config::RunConfig;
pub use downloader::Orchestrator;
pub use error::{AppError, Result};
pub use export::{ExportWriter, HttpProber};
pub use media::{MediaTool, ResolvedVideo, YtDlpTool};
pub use outline::{CatalogClient, CourseRef};
pub use summary::RunSummary;
pub use unit::{CourseOutline, Unit, UnitKind};
