//! # Image Resize Module
//!
//! Questo modulo decide **se** e **come** ridimensionare un'immagine decodificata
//! rispetto ai limiti di larghezza/altezza della `ResizePolicy`.
//!
//! ## Caratteristiche
//! - **Solo downscaling**: un limite scatta solo se la dimensione corrente lo supera
//! - **Aspect ratio preservato**: la dimensione non vincolata viene derivata
//! - **Due passate indipendenti**: prima la larghezza, poi l'altezza
//! - **Filtro configurabile**: Lanczos3 di default, come per i thumbnails di qualità
//!
//! ## Strategia a due passate
//! I limiti non vengono risolti insieme: la seconda passata lavora sul risultato
//! della prima. Con entrambi i limiti impostati e certi aspect ratio il risultato
//! può quindi violare uno dei due. `constrain_dimensions` è l'unico punto di
//! ingresso per i chiamanti, così una strategia congiunta può sostituire
//! `two_pass` senza toccarli.
//!
//! ## Esempio:
//! ```text
//! 2000x1000, max_width=1200  -> 1200x600
//! 1000x2000, max_height=500  -> 250x500
//! ```

use crate::codec::{DecodedImage, ImageCodec};
use crate::config::ResizePolicy;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Algoritmi di resize disponibili
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeAlgorithm {
    /// Lanczos3 - Migliore qualità per downscaling (default)
    Lanczos,
    /// Catmull-Rom - Buon bilanciamento qualità/velocità
    CatmullRom,
    /// Gaussian - Risultato morbido
    Gaussian,
    /// Triangle - Veloce, qualità accettabile per anteprime
    Triangle,
    /// Nearest - Pixel perfetto, nessuna interpolazione
    Nearest,
}

impl Default for ResizeAlgorithm {
    fn default() -> Self {
        Self::Lanczos
    }
}

impl ResizeAlgorithm {
    /// Converte l'algoritmo nel filtro del crate `image`
    pub fn to_filter_type(self) -> FilterType {
        match self {
            ResizeAlgorithm::Lanczos => FilterType::Lanczos3,
            ResizeAlgorithm::CatmullRom => FilterType::CatmullRom,
            ResizeAlgorithm::Gaussian => FilterType::Gaussian,
            ResizeAlgorithm::Triangle => FilterType::Triangle,
            ResizeAlgorithm::Nearest => FilterType::Nearest,
        }
    }
}

/// Compute the output size for a resample request.
///
/// A zero target means "derive from the aspect ratio"; the derived side is
/// rounded to the nearest pixel and never collapses below 1.
pub fn scaled_dimensions(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    match (target_width, target_height) {
        (0, 0) => (width, height),
        (w, 0) => (w, proportional(height, w, width)),
        (0, h) => (proportional(width, h, height), h),
        (w, h) => (w, h),
    }
}

fn proportional(other: u32, target: u32, current: u32) -> u32 {
    if current == 0 {
        return other;
    }
    let (other, target, current) = (u64::from(other), u64::from(target), u64::from(current));
    let scaled = (other * target + current / 2) / current;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Apply the policy's dimension limits. Returns the (possibly new) image and
/// whether any resampling happened.
pub fn constrain_dimensions<C>(codec: &C, image: DecodedImage, policy: &ResizePolicy) -> (DecodedImage, bool)
where
    C: ImageCodec + ?Sized,
{
    two_pass(codec, image, policy.max_width, policy.max_height)
}

/// Width limit first, then height limit on the result of the first pass.
fn two_pass<C>(codec: &C, image: DecodedImage, max_width: u32, max_height: u32) -> (DecodedImage, bool)
where
    C: ImageCodec + ?Sized,
{
    let mut image = image;
    let mut modified = false;

    if max_width != 0 && image.width() > max_width {
        debug!("Width {} exceeds {}, resampling", image.width(), max_width);
        image = codec.resample(&image, max_width, 0);
        modified = true;
    }
    if max_height != 0 && image.height() > max_height {
        debug!("Height {} exceeds {}, resampling", image.height(), max_height);
        image = codec.resample(&image, 0, max_height);
        modified = true;
    }

    (image, modified)
}
