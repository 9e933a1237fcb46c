//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore del motore di ridimensionamento.
//!
//! ## Responsabilità:
//! - Definisce `ResizeError` enum per categorizzare tutti gli errori possibili
//! - Mantiene il path del file coinvolto per messaggi utili all'utente
//! - Integra con `thiserror` per error chaining via `#[source]`
//!
//! ## Categorie di errori:
//! - `Decode`: Dati immagine illeggibili, corrotti o formato non supportato
//! - `Encode`: Errore del codec durante la misura o l'encoding finale
//! - `FileSystem`: stat/open/rename/write/delete falliti
//! - `Walk`: Errore durante l'enumerazione ricorsiva delle directory
//! - `InvalidRange`: Ricerca qualità invocata con intervallo vuoto
//! - `Cancelled`: Run interrotto dall'utente tra un file e l'altro
//! - `Validation`: Parametri di configurazione non validi
//!
//! ## Esempio:
//! ```rust,ignore
//! let bytes = std::fs::read(path).map_err(|e| ResizeError::fs(path, e))?;
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Errors produced while resizing and re-encoding images
#[derive(thiserror::Error, Debug)]
pub enum ResizeError {
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("JPEG encoding failed at quality {quality}: {source}")]
    Encode {
        quality: u8,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("empty quality range [{low}, {high}]")]
    InvalidRange { low: u8, high: u8 },

    #[error("cancelled by user")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl ResizeError {
    /// Shorthand for wrapping an I/O failure with the path it happened on
    pub fn fs(path: &Path, source: io::Error) -> Self {
        Self::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
