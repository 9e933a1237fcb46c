//! # Batch Resizer Module
//!
//! Orchestratore del run: discovery → encoding → commit su disco, un file alla volta.
//!
//! ## Responsabilità:
//! - Collega `DirectoryWalker`, `SizeConstrainedEncoder` e `AtomicFileReplacer`
//! - Accumula il conteggio dei file modificati e i byte risparmiati (`RunOutcome`)
//! - Controlla la cancellazione cooperativa tra un file e l'altro
//! - Esegue il motore sincrono su un worker `spawn_blocking` con canale di stato
//!
//! ## Concorrenza:
//! Il motore è single-thread e completamente sincrono: ogni file viene
//! decodificato, ridimensionato, codificato e committato (o ripristinato) prima
//! del successivo, quindi in memoria c'è al massimo un'immagine decodificata.
//! L'unico confine concorrente è il canale di stato verso l'interfaccia.
//!
//! ## Dry run mode:
//! - Esegue decode, resample e ricerca qualità ma non scrive nulla
//! - Conta i file che *verrebbero* modificati
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut resizer = BatchResizer::new(config.policy(), ImageCrateCodec::default())?;
//! let outcome = resizer.run(&paths, &ProgressManager::new());
//! println!("{}", outcome.summary());
//! ```

use crate::codec::ImageCodec;
use crate::config::ResizePolicy;
use crate::encoder::{ImageTask, SizeConstrainedEncoder};
use crate::error::ResizeError;
use crate::progress::{format_size, ProgressSink};
use crate::replacer::AtomicFileReplacer;
use crate::walker::{DirectoryWalker, Eligibility};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The single externally observable result of a run
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub files_changed: usize,
    /// Original size of the changed files
    pub bytes_before: u64,
    /// Size of what replaced them
    pub bytes_after: u64,
    /// First error; processing stopped there
    pub error: Option<ResizeError>,
}

impl RunOutcome {
    pub fn bytes_saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }

    pub fn summary(&self) -> String {
        match &self.error {
            Some(error) => format!(
                "resized {} images, then failed: {}",
                self.files_changed, error
            ),
            None => format!(
                "resized {} images ({} saved)",
                self.files_changed,
                format_size(self.bytes_saved())
            ),
        }
    }

    pub fn into_result(self) -> Result<usize, ResizeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.files_changed),
        }
    }
}

/// Sequential resize run over files and directories
pub struct BatchResizer<C: ImageCodec> {
    policy: ResizePolicy,
    codec: C,
    dry_run: bool,
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl<C: ImageCodec> BatchResizer<C> {
    pub fn new(policy: ResizePolicy, codec: C) -> Result<Self, ResizeError> {
        policy.validate()?;
        Ok(Self {
            policy,
            codec,
            dry_run: false,
            stop_receiver: None,
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stop between files once a signal arrives on `stop_receiver`
    pub fn with_cancellation(mut self, stop_receiver: broadcast::Receiver<()>) -> Self {
        self.stop_receiver = Some(stop_receiver);
        self
    }

    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    /// Process every eligible file under `roots`, stopping at the first error
    pub fn run(&mut self, roots: &[PathBuf], sink: &dyn ProgressSink) -> RunOutcome {
        let Self {
            policy,
            codec,
            dry_run,
            stop_receiver,
        } = self;
        let eligibility = Eligibility::from_policy(policy);
        let mut bytes_before = 0u64;
        let mut bytes_after = 0u64;

        let (files_changed, error) = DirectoryWalker::walk(
            roots,
            |path| eligibility.is_eligible(path),
            |path| {
                if should_stop(stop_receiver) {
                    return Err(ResizeError::Cancelled);
                }
                match process_file(&*codec, policy, *dry_run, path, sink)? {
                    Some((before, after)) => {
                        bytes_before += before;
                        bytes_after += after;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            },
        );

        let outcome = RunOutcome {
            files_changed,
            bytes_before,
            bytes_after,
            error,
        };
        info!("{}", outcome.summary());
        sink.status(&outcome.summary());
        outcome
    }
}

impl<C: ImageCodec + Send + 'static> BatchResizer<C> {
    /// Run on a blocking worker. Status strings arrive on the returned channel;
    /// the handle resolves to the outcome once the run ends.
    pub fn run_in_background(
        mut self,
        roots: Vec<PathBuf>,
    ) -> (mpsc::UnboundedReceiver<String>, JoinHandle<RunOutcome>) {
        let (status_sender, status_receiver) = mpsc::unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || self.run(&roots, &status_sender));
        (status_receiver, handle)
    }
}

/// Controlla se è stato ricevuto un segnale di stop
fn should_stop(stop_receiver: &mut Option<broadcast::Receiver<()>>) -> bool {
    if let Some(receiver) = stop_receiver {
        match receiver.try_recv() {
            Ok(()) => {
                debug!("Stop signal received, cancelling run");
                return true;
            }
            Err(broadcast::error::TryRecvError::Empty) => return false,
            Err(broadcast::error::TryRecvError::Lagged(_)) => {
                debug!("Stop signal was lagged, cancelling run");
                return true;
            }
            Err(broadcast::error::TryRecvError::Closed) => return false,
        }
    }
    false
}

/// Encode one file and commit it. Returns `(original_len, new_len)` when it changed.
fn process_file<C: ImageCodec + ?Sized>(
    codec: &C,
    policy: &ResizePolicy,
    dry_run: bool,
    path: &Path,
    sink: &dyn ProgressSink,
) -> Result<Option<(u64, u64)>, ResizeError> {
    let Some(task) = ImageTask::scan(path)? else {
        return Ok(None);
    };

    let Some(result) = SizeConstrainedEncoder::new(codec, policy).process(&task, sink)? else {
        return Ok(None);
    };

    if dry_run {
        info!(
            "Dry run: would write {} bytes to {}",
            result.encoded.len(),
            result.target_path.display()
        );
    } else {
        AtomicFileReplacer::replace(&task.path, &result.target_path, &result.encoded)?;
    }

    Ok(Some((task.original_len, result.encoded.len() as u64)))
}
