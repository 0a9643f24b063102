use std::path::PathBuf;
use std::process::ExitCode;

use eyre::Result;
use log::{debug, info, warn};
use loomx::config::Config;
use loomx::{Error, TranscriptBody};

mod cli;

use cli::Cli;

const USAGE: &str = "Usage: loomx <loom-url>

Example:
  loomx https://www.loom.com/share/abc123def456";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("loomx.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loomx")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nConfig is read from: {}\nLogs are written to: {}",
        loomx::config::config_path().display(),
        log_dir().join("loomx.log").display()
    )
}

/// Print a pipeline failure the way users see it
fn report(err: &Error) {
    eprintln!("Error: {err}");
    if let Error::Parse { source, .. } = err {
        eprintln!("{source}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    if let Err(e) = setup_logging() {
        // No writable data dir; log to stderr instead
        let _ = env_logger::try_init();
        warn!("Could not open log file: {e}");
    }

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let Some(url) = cli.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        println!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    };

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        Config::default()
    });

    if cli.verbose {
        let config_path = loomx::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let client = reqwest::Client::builder().timeout(config.timeout()).build()?;

    let doc = match loomx::fetch_document(&client, &config, url).await {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Pipeline failed: {e:?}");
            report(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.verbose {
        let paragraphs = match &doc.body {
            TranscriptBody::Paragraphs(p) => p.len(),
            TranscriptBody::Unavailable | TranscriptBody::Empty => 0,
        };
        eprintln!(
            "Video: {} ({})\nLanguage: {}\nParagraphs: {}",
            doc.title(),
            doc.video_id,
            doc.language.as_deref().unwrap_or("unknown"),
            paragraphs,
        );
    }

    print!("{}", loomx::output::render_markdown(&doc));
    Ok(ExitCode::SUCCESS)
}
