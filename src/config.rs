//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ResizePolicy`, il valore immutabile passato a ogni componente del motore
//! - Definisce la struct `Config` con le preferenze persistite dell'utente
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `images`: Ultimi file/directory elaborati (default: nessuno)
//! - `max_width`: Larghezza massima in pixel (default: 1200, 0 = nessun limite)
//! - `max_height`: Altezza massima in pixel (default: 0 = nessun limite)
//! - `max_size_kb`: Dimensione massima del file in KB (default: 250, 0 = nessun limite)
//! - `convert_pngs`: Converte i PNG in JPEG (default: true)
//! - `algorithm`: Filtro di resampling (default: Lanczos)
//! - `dry_run`: Simulazione senza modifiche (default: false, solo per il run corrente)
//! - `json_output`: Stato in JSON per uso programmatico (default: false, solo per il run corrente)
//!
//! ## Validazione:
//! - Controlla che i limiti in pixel restino entro il massimo JPEG (65535)
//! - Controlla che `max_size_kb * 1024` non vada in overflow
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     max_width: 1600,
//!     max_size_kb: 500,
//!     ..Default::default()
//! };
//! config.validate()?;
//! let policy = config.policy();
//! ```

use crate::error::ResizeError;
use crate::resize::ResizeAlgorithm;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest dimension a baseline JPEG can carry
pub const MAX_JPEG_DIMENSION: u32 = 65_535;

/// Limits applied to every image of a run. Zero means unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizePolicy {
    pub max_width: u32,
    pub max_height: u32,
    pub max_size_bytes: u64,
    /// Transcode PNG sources into JPEG
    pub convert_secondary_format: bool,
}

impl ResizePolicy {
    pub fn validate(&self) -> Result<(), ResizeError> {
        if self.max_width > MAX_JPEG_DIMENSION || self.max_height > MAX_JPEG_DIMENSION {
            return Err(ResizeError::Validation(format!(
                "width and height limits must not exceed {} pixels",
                MAX_JPEG_DIMENSION
            )));
        }
        Ok(())
    }

    pub fn has_size_budget(&self) -> bool {
        self.max_size_bytes != 0
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files or directories processed last time
    pub images: Vec<PathBuf>,
    /// Max width in pixels (0 = unconstrained)
    pub max_width: u32,
    /// Max height in pixels (0 = unconstrained)
    pub max_height: u32,
    /// Max file size in KB (0 = unconstrained)
    pub max_size_kb: u64,
    /// Convert .png images to .jpg
    pub convert_pngs: bool,
    /// Resampling filter
    pub algorithm: ResizeAlgorithm,
    /// Dry run - don't actually replace files. Per-run only, never persisted.
    #[serde(skip)]
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use. Per-run only, never persisted.
    #[serde(skip)]
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            max_width: 1200,
            max_height: 0,
            max_size_kb: 250,
            convert_pngs: true,
            algorithm: ResizeAlgorithm::default(),
            dry_run: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_size_kb.checked_mul(1024).is_none() {
            return Err(anyhow::anyhow!("Max size of {} KB is too large", self.max_size_kb));
        }

        self.policy().validate()?;

        Ok(())
    }

    /// Build the immutable policy for a run
    pub fn policy(&self) -> ResizePolicy {
        ResizePolicy {
            max_width: self.max_width,
            max_height: self.max_height,
            max_size_bytes: self.max_size_kb.saturating_mul(1024),
            convert_secondary_format: self.convert_pngs,
        }
    }

    /// Default location of the preferences file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-resizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
