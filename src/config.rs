use serde::Deserialize;
use std::path::PathBuf;

/// Default parallel segment count handed to the download executor (`-N`).
pub const DEFAULT_THREADS: u32 = 8;

/// Default format sort rule handed to the download executor (`-S`).
pub const DEFAULT_QUALITY: &str = "res:1080,codec:h264";

/// Configuration for one run of the pipeline.
///
/// Supplied by the CLI layer and read-only for the core. Controls the
/// segment concurrency and quality rule passed through to yt-dlp, the
/// output root, and the dry-run / verify switches.
///
/// # Examples
///
/// ```
/// use coursedl::RunConfig;
///
/// let config = RunConfig::default();
/// assert!(config.threads >= 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Parallel segment fetch count per file (yt-dlp `-N`).
    pub threads: u32,
    /// Format/quality sort rule (yt-dlp `-S`).
    pub quality: String,
    /// Root directory for downloaded files; defaults to a directory named
    /// after the course title in the current directory.
    pub output_root: Option<PathBuf>,
    /// Resolve and print the plan without touching the network or disk.
    pub dry_run: bool,
    /// Probe each resolved URL with a HEAD request before exporting it.
    pub verify: bool,
    /// Destination of the CSV export.
    pub csv_out: PathBuf,
    /// Name or path of the external yt-dlp program.
    pub ytdlp_program: String,
    /// Browser whose login session yt-dlp reuses (`--cookies-from-browser`).
    pub cookie_browser: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            quality: DEFAULT_QUALITY.to_string(),
            output_root: None,
            dry_run: false,
            verify: false,
            csv_out: PathBuf::from("videos.csv"),
            ytdlp_program: String::from("yt-dlp"),
            cookie_browser: String::from("chrome"),
        }
    }
}
