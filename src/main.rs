//! # Image Resizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento/salvataggio delle preferenze utente
//! - Avvio del motore su un worker in background e rendering dello stato
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (path, limiti, flag)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica le preferenze salvate e applica gli override da CLI
//! 4. Usa i path salvati se non ne vengono passati
//! 5. Avvia il run, mostra lo stato, riporta il riepilogo finale
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-resizer ~/Pictures/export --max-width 1600 --max-size 400 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use image_resizer::json_output::{JsonMessage, JsonSink};
use image_resizer::resize::ResizeAlgorithm;
use image_resizer::{BatchResizer, Config, ImageCrateCodec, ProgressManager, ProgressSink};

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(about = "Downscale images and re-encode them to fit a file-size budget")]
struct Args {
    /// Files or directories to process (defaults to the last saved ones)
    paths: Vec<PathBuf>,

    /// Max width in pixels (0 = unconstrained)
    #[arg(long)]
    max_width: Option<u32>,

    /// Max height in pixels (0 = unconstrained)
    #[arg(long)]
    max_height: Option<u32>,

    /// Max file size in KB (0 = unconstrained)
    #[arg(long)]
    max_size: Option<u64>,

    /// Leave .png images alone instead of converting them to .jpg
    #[arg(long)]
    no_convert_png: bool,

    /// Resampling filter
    #[arg(long, value_enum)]
    algorithm: Option<ResizeAlgorithm>,

    /// Dry run - don't actually replace files
    #[arg(long)]
    dry_run: bool,

    /// Output status as JSON lines
    #[arg(long)]
    json: bool,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist the effective settings and paths as new defaults
    #[arg(long)]
    save: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };

    if let Some(max_width) = args.max_width {
        config.max_width = max_width;
    }
    if let Some(max_height) = args.max_height {
        config.max_height = max_height;
    }
    if let Some(max_size) = args.max_size {
        config.max_size_kb = max_size;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if args.no_convert_png {
        config.convert_pngs = false;
    }
    config.dry_run = args.dry_run;
    config.json_output = args.json;
    if !args.paths.is_empty() {
        config.images = args.paths.clone();
    }

    config.validate()?;

    if config.images.is_empty() {
        return Err(anyhow::anyhow!("No images given and no saved paths to fall back to"));
    }

    if args.save {
        match &config_path {
            Some(path) => {
                config.save_to_file(path).await?;
                info!("Saved preferences to {}", path.display());
            }
            None => warn!("No config directory available, preferences not saved"),
        }
    }

    let policy = config.policy();
    if config.json_output {
        JsonMessage::start(&config.images, &policy, config.dry_run).emit();
    }
    if config.dry_run {
        info!("Dry run mode: no files will be modified");
    }

    let (stop_sender, stop_receiver) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current image");
            let _ = stop_sender.send(());
        }
    });

    let resizer = BatchResizer::new(policy, ImageCrateCodec::new(config.algorithm))?
        .with_dry_run(config.dry_run)
        .with_cancellation(stop_receiver);
    let (mut status, handle) = resizer.run_in_background(config.images.clone());

    let progress = (!config.json_output).then(ProgressManager::new);
    while let Some(message) = status.recv().await {
        match &progress {
            Some(progress) => progress.status(&message),
            None => JsonSink.status(&message),
        }
    }

    let outcome = handle.await?;
    match &progress {
        Some(progress) => progress.finish(&outcome.summary()),
        None => JsonMessage::finished(&outcome).emit(),
    }

    outcome.into_result()?;
    Ok(())
}
