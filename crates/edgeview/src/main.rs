//! edgeview: send images to a remote detection service and collect the
//! results.
//!
//! Every image path is uploaded concurrently through one shared session.
//! The service's parameters are global, so dispatches are serialized
//! behind the session's queue; the printed history lists the most
//! recently completed upload first.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin edgeview -- [OPTIONS] <IMAGE>...
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, ValueEnum};
use edgeview_io::{ClientConfig, Session, Upload, UploadError};
use edgeview_protocol::{AlgorithmKind, DispatchError, HistoryEntry, ResultHistory};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Run edge and corner detection on a remote service.
#[derive(Parser)]
#[command(name = "edgeview", version)]
struct Cli {
    /// Images to analyze (PNG, JPEG, BMP, WebP).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Algorithm to run on every image.
    #[arg(long, value_enum, default_value_t = Algorithm::Canny)]
    algorithm: Algorithm,

    /// Gaussian sigma, sent to algorithms that use it.
    #[arg(long, default_value_t = edgeview_protocol::DEFAULT_SIGMA)]
    sigma: f64,

    /// Detection threshold, sent to algorithms that use it.
    #[arg(long, default_value_t = edgeview_protocol::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Base URL of the detection service.
    #[arg(long, env = "EDGEVIEW_SERVER", default_value = ClientConfig::DEFAULT_SERVER_URL)]
    server: String,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "EDGEVIEW_TIMEOUT_SECS",
        default_value_t = ClientConfig::DEFAULT_TIMEOUT_SECS,
        value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..)
    )]
    timeout_secs: u64,

    /// Write every history image into this directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Print the history as JSON instead of a text report.
    #[arg(long)]
    json: bool,
}

/// Detection algorithm selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Canny edges (uses sigma and threshold).
    Canny,
    /// Sobel gradient magnitude (uses sigma).
    Sobel,
    /// Harris corners.
    Harris,
    /// Shi-Tomasi corners (uses threshold).
    Shi,
    /// All four, returned together.
    All,
}

impl Algorithm {
    const fn kind(self) -> AlgorithmKind {
        match self {
            Self::Canny => AlgorithmKind::Canny,
            Self::Sobel => AlgorithmKind::Sobel,
            Self::Harris => AlgorithmKind::Harris,
            Self::Shi => AlgorithmKind::Shi,
            Self::All => AlgorithmKind::All,
        }
    }
}

/// Why one upload produced nothing.
#[derive(Debug, thiserror::Error)]
enum UploadFailure {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let algorithm = cli.algorithm.kind();

    let config = ClientConfig {
        server_url: cli.server.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        ..ClientConfig::from_env()
    };
    let session = match Session::connect(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error connecting to {}: {e}", config.server_url);
            return ExitCode::FAILURE;
        }
    };
    info!(server = %config.server_url, %algorithm, uploads = cli.images.len(), "starting");

    let handles: Vec<_> = cli
        .images
        .iter()
        .cloned()
        .map(|path| {
            let session = session.clone();
            let (sigma, threshold) = (cli.sigma, cli.threshold);
            tokio::spawn(async move {
                let result = analyze(&session, &path, algorithm, sigma, threshold).await;
                (path, result)
            })
        })
        .collect();

    let mut failures = 0_usize;
    for handle in handles {
        match handle.await {
            Ok((_, Ok(()))) => {}
            Ok((path, Err(e))) => {
                error!(path = %path.display(), error = %e, "upload failed");
                failures += 1;
            }
            Err(e) => {
                error!(error = %e, "upload task aborted");
                failures += 1;
            }
        }
    }

    if cli.json {
        match session.with_history(|history| serde_json::to_string_pretty(&history.entries())) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing history: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        session.with_history(print_report);
    }

    let history = session.history();

    if let Some(ref dir) = cli.out_dir
        && let Err(e) = write_images(dir, &history).await
    {
        eprintln!("Error writing images to {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    if failures > 0 {
        eprintln!("{failures} of {} uploads failed", cli.images.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn analyze(
    session: &Session,
    path: &Path,
    algorithm: AlgorithmKind,
    sigma: f64,
    threshold: f64,
) -> Result<(), UploadFailure> {
    let upload = Upload::read(path).await?;
    info!(upload = upload.name(), bytes = upload.bytes().len(), %algorithm, "upload read");
    let request = upload
        .into_request(algorithm.name())
        .with_sigma(sigma)
        .with_threshold(threshold);
    session.analyze(request).await?;
    Ok(())
}

fn print_report(history: &ResultHistory) {
    println!("History ({} entries, newest first)", history.len());
    println!("{}", "=".repeat(48));
    for entry in history {
        let (mime, payload) = split_data_url(&entry.image_source).unwrap_or(("?", ""));
        println!(
            "{}  {:<10} {:<12} {:>10} chars",
            entry.timestamp,
            entry.label,
            mime,
            payload.len()
        );
    }
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(source: &str) -> Option<(&str, &str)> {
    source.strip_prefix("data:")?.split_once(";base64,")
}

fn extension_for(mime: &str) -> &str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/bmp" => "bmp",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Decode every entry and write it as `NN-label.ext`, numbered from the
/// newest.
async fn write_images(dir: &Path, history: &[HistoryEntry]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    for (index, entry) in history.iter().enumerate() {
        let Some((mime, payload)) = split_data_url(&entry.image_source) else {
            eprintln!("Skipping {}: not a data URL", entry.label);
            continue;
        };
        let bytes = match STANDARD.decode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Skipping {}: {e}", entry.label);
                continue;
            }
        };
        let file = dir.join(format!(
            "{index:02}-{}.{}",
            entry.label.to_lowercase(),
            extension_for(mime)
        ));
        tokio::fs::write(&file, &bytes).await?;
        info!(path = %file.display(), bytes = bytes.len(), "wrote image");
    }
    Ok(())
}
