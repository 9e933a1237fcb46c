//! # Atomic File Replacement Module
//!
//! Sostituzione sicura del contenuto di un file con i byte appena codificati.
//!
//! ## Protocollo:
//! 1. `original` viene rinominato in `original.backup` (fallimento ⇒ abort, nulla toccato)
//! 2. Il nuovo contenuto viene scritto in `new_path` (create/truncate)
//! 3. Scrittura fallita ⇒ il backup torna al nome originale, l'errore viene propagato
//! 4. Scrittura riuscita ⇒ il backup viene rimosso; se la rimozione fallisce
//!    resta un file `.backup` orfano, segnalato solo nei log
//!
//! ## Garanzie:
//! - Il contenuto originale non va mai perso per un errore in questa routine
//! - Il rollback è affidato a `BackupGuard` (RAII): ogni uscita senza commit,
//!   panic inclusi, riporta il backup al suo posto
//! - Con `new_path != original` (conversione PNG → JPEG) un artefatto parziale
//!   in `new_path` viene rimosso prima del ripristino, ma solo se il file non
//!   esisteva già: un file preesistente non viene mai toccato

use crate::error::ResizeError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Suffix appended to the original name while a replacement is in flight
pub const BACKUP_SUFFIX: &str = ".backup";

/// `photo.jpg` -> `photo.jpg.backup`
pub fn backup_path(original: &Path) -> PathBuf {
    let mut name = OsString::from(original.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Holds the original under its backup name until committed or dropped
struct BackupGuard {
    original: PathBuf,
    backup: PathBuf,
    committed: bool,
}

impl BackupGuard {
    fn create(original: &Path) -> Result<Self, ResizeError> {
        let backup = backup_path(original);
        fs::rename(original, &backup).map_err(|e| ResizeError::fs(original, e))?;
        debug!("Backed up {} to {}", original.display(), backup.display());

        Ok(Self {
            original: original.to_path_buf(),
            backup,
            committed: false,
        })
    }

    fn commit(mut self) {
        self.committed = true;
        if let Err(e) = fs::remove_file(&self.backup) {
            warn!("Could not remove backup {}: {}", self.backup.display(), e);
        }
    }
}

impl Drop for BackupGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::rename(&self.backup, &self.original) {
            Ok(()) => debug!("Restored {} from backup", self.original.display()),
            Err(e) => error!(
                "Failed to restore {} from {}: {}",
                self.original.display(),
                self.backup.display(),
                e
            ),
        }
    }
}

/// Crash-safe swap of a file's content
pub struct AtomicFileReplacer;

impl AtomicFileReplacer {
    /// Replace `original` with `content` written at `new_path`
    pub fn replace(original: &Path, new_path: &Path, content: &[u8]) -> Result<(), ResizeError> {
        Self::replace_with(original, new_path, |path| write_file(path, content))
    }

    /// Same protocol with a caller-provided write step
    pub fn replace_with<F>(original: &Path, new_path: &Path, write: F) -> Result<(), ResizeError>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let guard = BackupGuard::create(original)?;
        // only a file this call created may be cleaned up on failure
        let preexisting = new_path.exists();

        if let Err(e) = write(new_path) {
            if new_path != original && !preexisting && new_path.is_file() {
                if let Err(cleanup) = fs::remove_file(new_path) {
                    warn!("Could not remove partial {}: {}", new_path.display(), cleanup);
                }
            }
            drop(guard);
            return Err(ResizeError::fs(new_path, e));
        }

        guard.commit();
        Ok(())
    }
}

fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
