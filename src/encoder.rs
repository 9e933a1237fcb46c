//! # Size-Constrained Encoder Module
//!
//! Decide se un'immagine va ridimensionata e/o ricodificata e produce i byte finali.
//!
//! ## Pipeline per file:
//! 1. **Decode** del file sorgente (`DecodeError` se corrotto/non supportato)
//! 2. **Resample** a due passate contro `max_width` / `max_height`
//! 3. **Short-circuit**: nessun resample e file su disco già entro budget ⇒ noop
//! 4. **Qualità**: 100 senza budget; altrimenti misura a 100 e, solo se serve,
//!    ricerca binaria su `[0, 100]` con encoding verso un `ByteCounter`
//! 5. **Encoding finale** alla qualità scelta
//! 6. **Path di output**: stesso path, o estensione `.jpg` per i PNG convertiti
//!
//! Lo short-circuit guarda la dimensione *originale* su disco, non quella di un
//! encoding: un file conforme non viene mai aperto in scrittura.

use crate::byte_counter::ByteCounter;
use crate::codec::{DecodedImage, ImageCodec, SourceFormat, TARGET_EXTENSION};
use crate::config::ResizePolicy;
use crate::error::ResizeError;
use crate::progress::ProgressSink;
use crate::quality_search::{find_quality, MAX_QUALITY, MIN_QUALITY};
use crate::resize::constrain_dimensions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One eligible file, scanned before processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub path: PathBuf,
    /// Byte length on disk at scan time
    pub original_len: u64,
    pub format: SourceFormat,
}

impl ImageTask {
    /// Stat `path` and detect its format. `None` if the extension is not an image we handle.
    pub fn scan(path: &Path) -> Result<Option<Self>, ResizeError> {
        let Some(format) = SourceFormat::from_path(path) else {
            return Ok(None);
        };
        let metadata = std::fs::metadata(path).map_err(|e| ResizeError::fs(path, e))?;

        Ok(Some(Self {
            path: path.to_path_buf(),
            original_len: metadata.len(),
            format,
        }))
    }
}

/// Bytes ready to be committed to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeResult {
    /// Whether the dimensions changed
    pub was_modified: bool,
    pub encoded: Vec<u8>,
    /// Where the bytes go; differs from the source when a PNG is converted
    pub target_path: PathBuf,
    pub quality: u8,
}

/// Drives resampling and the quality search for a single image
pub struct SizeConstrainedEncoder<'a, C: ImageCodec + ?Sized> {
    codec: &'a C,
    policy: &'a ResizePolicy,
}

impl<'a, C: ImageCodec + ?Sized> SizeConstrainedEncoder<'a, C> {
    pub fn new(codec: &'a C, policy: &'a ResizePolicy) -> Self {
        Self { codec, policy }
    }

    /// Process one task. `Ok(None)` is a noop: nothing to write.
    pub fn process(&self, task: &ImageTask, sink: &dyn ProgressSink) -> Result<Option<EncodeResult>, ResizeError> {
        if task.format.is_secondary() && !self.policy.convert_secondary_format {
            debug!("PNG conversion disabled, leaving {}", task.path.display());
            return Ok(None);
        }

        let image = self.codec.decode(&task.path)?;
        sink.status(&format!("resizing: {}", task.path.display()));

        let (image, was_modified) = constrain_dimensions(self.codec, image, self.policy);

        if !was_modified && self.within_budget(task.original_len) {
            debug!(
                "{} already compliant ({} bytes), skipping",
                task.path.display(),
                task.original_len
            );
            return Ok(None);
        }

        let quality = self.choose_quality(&image)?;
        let mut encoded = Vec::new();
        self.codec.encode(&image, quality, &mut encoded)?;

        let target_path = self.target_path(task);
        info!(
            "Re-encoded {} at {}x{} quality {}: {} -> {} bytes",
            task.path.display(),
            image.width(),
            image.height(),
            quality,
            task.original_len,
            encoded.len()
        );

        Ok(Some(EncodeResult {
            was_modified,
            encoded,
            target_path,
            quality,
        }))
    }

    fn within_budget(&self, on_disk_len: u64) -> bool {
        !self.policy.has_size_budget() || on_disk_len <= self.policy.max_size_bytes
    }

    /// Highest quality that fits the budget, measuring as few encodes as possible
    fn choose_quality(&self, image: &DecodedImage) -> Result<u8, ResizeError> {
        if !self.policy.has_size_budget() {
            return Ok(MAX_QUALITY);
        }

        let budget = self.policy.max_size_bytes;
        let full = self.measure(image, MAX_QUALITY)?;
        if full <= budget {
            return Ok(MAX_QUALITY);
        }

        debug!("Max quality encode is {} bytes, searching for <= {}", full, budget);
        find_quality(budget, MIN_QUALITY, MAX_QUALITY, |quality| self.measure(image, quality))
    }

    fn measure(&self, image: &DecodedImage, quality: u8) -> Result<u64, ResizeError> {
        let mut counter = ByteCounter::new();
        self.codec.encode(image, quality, &mut counter)?;
        Ok(counter.count())
    }

    fn target_path(&self, task: &ImageTask) -> PathBuf {
        if task.format.is_secondary() && self.policy.convert_secondary_format {
            task.path.with_extension(TARGET_EXTENSION)
        } else {
            task.path.clone()
        }
    }
}
