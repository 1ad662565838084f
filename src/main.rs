use clap::{Parser, Subcommand};
use coursedl::config::{DEFAULT_QUALITY, DEFAULT_THREADS};
use coursedl::error::{AppError, Result};
use coursedl::downloader::partition_pending;
use coursedl::media::resolve_sources;
use coursedl::{
    CatalogClient, CourseRef, ExportWriter, FileArchive, HttpProber, Orchestrator, RunConfig,
    RunSummary, YtDlpTool,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_AUTH_REQUIRED: i32 = 2;

/// Course video downloader for learn.deeplearning.ai (browser login + yt-dlp).
#[derive(Parser)]
#[command(name = "coursedl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download every video of a course in course order.
    Download {
        /// Any lesson URL under the course, or the course homepage URL.
        url: String,
        /// Output root directory (a course-named folder is created inside).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Parallel segment fetch count per file.
        #[arg(long, default_value_t = DEFAULT_THREADS, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,
        /// Format sort rule passed to yt-dlp's -S.
        #[arg(long, default_value = DEFAULT_QUALITY)]
        quality: String,
        /// Resolve and print the download plan without downloading.
        #[arg(long)]
        dry_run: bool,
    },
    /// Export direct video URLs to a CSV file instead of downloading.
    Export {
        /// Any lesson URL under the course, or the course homepage URL.
        url: String,
        /// Output CSV path.
        #[arg(long, default_value = "videos.csv")]
        out: PathBuf,
        /// Value for the advisory `path` column.
        #[arg(long)]
        root: Option<PathBuf>,
        /// Verify each resolved URL with a HEAD request.
        #[arg(long)]
        verify: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(summary) => {
            summary.report();
            if !summary.is_success() {
                std::process::exit(EXIT_FAILURE);
            }
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            let code = match e {
                AppError::AuthRequired(_) => EXIT_AUTH_REQUIRED,
                _ => EXIT_FAILURE,
            };
            std::process::exit(code);
        }
    }
}

async fn run(command: Command) -> Result<RunSummary> {
    match command {
        Command::Download {
            url,
            out,
            threads,
            quality,
            dry_run,
        } => {
            let config = RunConfig {
                threads,
                quality,
                output_root: out,
                dry_run,
                ..RunConfig::default()
            };
            download(&url, &config).await
        }
        Command::Export {
            url,
            out,
            root,
            verify,
        } => {
            let config = RunConfig {
                csv_out: out,
                output_root: root,
                verify,
                ..RunConfig::default()
            };
            export(&url, &config).await
        }
    }
}

async fn download(url: &str, config: &RunConfig) -> Result<RunSummary> {
    let outline = fetch_outline(url).await?;
    let tool = YtDlpTool::new(config);
    let orchestrator = Orchestrator::new(&tool, config);

    if config.dry_run {
        orchestrator.print_plan(&outline.title, &outline.units);
        return Ok(RunSummary::new());
    }

    let course_dir = orchestrator.course_dir(&outline.title);
    tokio::fs::create_dir_all(&course_dir).await?;
    let mut archive = FileArchive::open(&course_dir)?;

    let (pending, already) = partition_pending(&outline.units, &archive);
    for unit in &already {
        println!("[skip] {:02} - {} (already downloaded)", unit.sequence, unit.title);
    }

    let (resolved, resolve_failures) = resolve_sources(&pending, &tool).await?;

    println!("[dir] {}", course_dir.display());
    let mut summary = orchestrator
        .download(&outline.title, &resolved, &mut archive)
        .await?;
    for _ in &already {
        summary.record_skip();
    }
    summary.absorb_failures(resolve_failures);
    Ok(summary)
}

async fn export(url: &str, config: &RunConfig) -> Result<RunSummary> {
    let outline = fetch_outline(url).await?;
    let tool = YtDlpTool::new(config);

    let (resolved, resolve_failures) = resolve_sources(&outline.units, &tool).await?;

    let prober = HttpProber::new();
    let mut summary = ExportWriter::new(&prober, config).export(&resolved).await?;
    summary.absorb_failures(resolve_failures);
    println!(
        "Exported {} rows to {}",
        resolved.len(),
        config.csv_out.display()
    );
    Ok(summary)
}

async fn fetch_outline(url: &str) -> Result<coursedl::CourseOutline> {
    let course = CourseRef::parse(url)?;
    println!("[course page] {}", course.base_url());

    let raw = CatalogClient::new().fetch_outline(&course).await?;
    let outline = coursedl::unit::sequence(&course, &raw);

    let videos: Vec<_> = outline.videos().collect();
    println!("[course] {}", outline.title);
    println!("[video units] {}", videos.len());
    for unit in &videos {
        println!("  {:02} - {} -> {}", unit.sequence, unit.title, unit.view_url);
    }

    Ok(outline)
}
