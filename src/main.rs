mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{Error, ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use slidepack_collection::SourceFile;
use slidepack_config::{Config, LogLevel, SlideLayout};
use slidepack_encode::Layout;
use slidepack_export::{
    DEFAULT_ARCHIVE_TEMPLATE, DEFAULT_SLIDESHOW_TEMPLATE, ExportOutcome, Exporter, LogProgress, Studio,
};
use slidepack_storage::backend::{LocalBackend, ReadOnlyBackend};
use slidepack_storage::{BackendHandle, StorageBackend};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config) {
        Ok(config) => config,
        Err(err) => return report(&err),
    };
    init_tracing(config.log_level.raised(cli.verbose));

    match run(cli, config).await {
        Ok(Some(path)) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        },
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

/// Print `err` with its whole cause tree.
fn report(err: &Error) -> ExitCode {
    eprintln!("{}", describe(err));
    ExitCode::FAILURE
}

fn describe(err: &Error) -> String {
    format!("error: {err:?}")
}

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn layout(setting: SlideLayout) -> Layout {
    match setting {
        SlideLayout::Widescreen => Layout::Widescreen16x9,
        SlideLayout::Standard => Layout::Standard4x3,
    }
}

/// Run one command, returning the path of the artifact written (if any).
async fn run(cli: Cli, config: Config) -> Result<Option<PathBuf>> {
    let output = cli.output.unwrap_or_else(|| config.output_dir.clone());
    let output = std::path::absolute(&output).or_raise(|| ErrorKind::Output(output.clone()))?;
    let sink: BackendHandle =
        Arc::new(LocalBackend::new("output", &output).or_raise(|| ErrorKind::Output(output.clone()))?);

    let mut exporter = Exporter::new(sink).or_raise(|| ErrorKind::Config)?.with_layout(layout(config.slides.layout));
    if config.naming.slideshow.is_some() || config.naming.archive.is_some() {
        exporter = exporter
            .with_naming(
                config.naming.slideshow.as_deref().unwrap_or(DEFAULT_SLIDESHOW_TEMPLATE),
                config.naming.archive.as_deref().unwrap_or(DEFAULT_ARCHIVE_TEMPLATE),
            )
            .or_raise(|| ErrorKind::Config)?;
    }

    let mut studio = Studio::new();
    let outcome = match cli.command {
        Command::Slides { files, title, to_archive } => {
            let files = open_inputs(&files).await?;
            let added = studio.slides_mut().add(files).or_raise(|| ErrorKind::NothingAccepted)?;
            tracing::info!(added, "Collected slides");
            if to_archive {
                studio.transfer_slides_to_archive().or_raise(|| ErrorKind::Export)?;
                exporter.export_archive(studio.archive(), &LogProgress).await
            } else {
                exporter.with_title(title).export_slideshow(studio.slides(), &LogProgress).await
            }
        },
        Command::Archive { files } => {
            let files = open_inputs(&files).await?;
            let added = studio.archive_mut().add(files).or_raise(|| ErrorKind::NothingAccepted)?;
            tracing::info!(added, "Collected files");
            exporter.export_archive(studio.archive(), &LogProgress).await
        },
    };
    match outcome.or_raise(|| ErrorKind::Export)? {
        ExportOutcome::Delivered { path, .. } => Ok(Some(output.join(path))),
        ExportOutcome::Skipped => {
            tracing::warn!("Nothing to export");
            Ok(None)
        },
    }
}

/// A read-only view of the directory `root`.
fn read_only(root: &Path) -> slidepack_storage::error::Result<BackendHandle> {
    let local = LocalBackend::new(root.display().to_string(), root)?;
    Ok(Arc::new(ReadOnlyBackend::new(Arc::new(local))))
}

/// Open every path given on the command line. Directories contribute every
/// visible file beneath them, in path order.
async fn open_inputs(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for path in paths {
        let input = || ErrorKind::Input(path.clone());
        let absolute = std::path::absolute(path).or_raise(input)?;
        if absolute.is_dir() {
            let backend = read_only(&absolute).or_raise(input)?;
            for info in backend.files().await.or_raise(input)? {
                files.push(SourceFile::open(&backend, &info.path).await.or_raise(input)?);
            }
        } else if let (true, Some(parent), Some(name)) = (absolute.is_file(), absolute.parent(), absolute.file_name()) {
            let backend = read_only(parent).or_raise(input)?;
            files.push(SourceFile::open(&backend, name).await.or_raise(input)?);
        } else {
            exn::bail!(input());
        }
    }
    tracing::debug!(count = files.len(), "Opened input files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n0000";

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("trip");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("Slide 10.png"), PNG).unwrap();
        fs::write(input.join("Slide 2.png"), PNG).unwrap();
        fs::write(input.join("notes.txt"), "hello").unwrap();
        (dir, input, output)
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    fn config(output: &Path) -> Config {
        Config { output_dir: output.to_path_buf(), ..Config::default() }
    }

    #[tokio::test]
    async fn test_slides_from_directory() {
        let (_dir, input, output) = fixture();
        let path = run(cli(&["slidepack", "slides", input.to_str().unwrap()]), config(&output)).await.unwrap().unwrap();
        assert!(path.starts_with(&output));
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("Presentation_"));
        assert!(path.extension().is_some_and(|ext| ext == "pptx"));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_archive_single_file() {
        let (_dir, input, output) = fixture();
        let file = input.join("notes.txt");
        let path = run(cli(&["slidepack", "archive", file.to_str().unwrap()]), config(&output)).await.unwrap().unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("Archived_Files_"));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_slides_to_archive() {
        let (_dir, input, output) = fixture();
        let args = ["slidepack", "slides", input.to_str().unwrap(), "--to-archive"];
        let path = run(cli(&args), config(&output)).await.unwrap().unwrap();
        assert!(path.extension().is_some_and(|ext| ext == "zip"));
    }

    #[tokio::test]
    async fn test_no_images_is_an_error() {
        let (_dir, input, output) = fixture();
        let file = input.join("notes.txt");
        let err = run(cli(&["slidepack", "slides", file.to_str().unwrap()]), config(&output)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NothingAccepted);
        assert!(fs::read_dir(&output).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_missing_input() {
        let (_dir, input, output) = fixture();
        let missing = input.join("missing.png");
        let err = run(cli(&["slidepack", "archive", missing.to_str().unwrap()]), config(&output)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Input(missing));
    }

    #[tokio::test]
    async fn test_failures_report_their_cause() {
        let (_dir, input, output) = fixture();
        let missing = input.join("missing.png");
        let err = run(cli(&["slidepack", "archive", missing.to_str().unwrap()]), config(&output)).await.unwrap_err();
        let message = describe(&err);
        assert!(message.starts_with("error: "));
        assert!(message.contains(&ErrorKind::Input(missing).to_string()));

        let err = Config::load(Some(input.join("missing.toml").as_path())).or_raise(|| ErrorKind::Config).unwrap_err();
        let message = describe(&err);
        assert!(message.starts_with("error: "));
        assert!(message.contains(&ErrorKind::Config.to_string()));
        assert!(message.contains("missing.toml"), "{message}");
    }

    #[test]
    fn test_layout_mapping() {
        assert_eq!(layout(SlideLayout::Widescreen), Layout::Widescreen16x9);
        assert_eq!(layout(SlideLayout::Standard), Layout::Standard4x3);
    }
}
