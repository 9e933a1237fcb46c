//! # Codec Module
//!
//! Capacità "black box" usate dal motore: decode, resample ed encode JPEG.
//!
//! ## Responsabilità:
//! - Definisce il trait `ImageCodec` che separa *cosa* fare da *come* farlo
//! - Fornisce `ImageCrateCodec`, l'implementazione di produzione basata sul crate `image`
//! - Rileva il formato sorgente (`SourceFormat`) dall'estensione del file
//!
//! ## Formati:
//! | Formato | Input | Output |
//! |---------|-------|--------|
//! | JPEG    | ✅    | ✅ (codec target) |
//! | PNG     | ✅    | ❌ (convertito in JPEG se la policy lo consente) |
//!
//! Il motore non implementa né il filtro di resampling né l'entropy coder JPEG:
//! li orchestra soltanto. Nei test il trait viene implementato da codec finti
//! deterministici per simulare dimensioni di encoding arbitrarie.

use crate::error::ResizeError;
use crate::resize::{scaled_dimensions, ResizeAlgorithm};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Write;
use std::path::Path;

/// Canonical extension of the target codec
pub const TARGET_EXTENSION: &str = "jpg";

/// Source formats the engine knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    /// Lossless secondary format, only handled when conversion is enabled
    Png,
}

impl SourceFormat {
    /// Detect the format from the lowercased file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn is_secondary(self) -> bool {
        matches!(self, Self::Png)
    }
}

/// In-memory pixel buffer of one image being processed
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
}

impl DecodedImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

/// Decode, resample and encode capabilities consumed by the engine
pub trait ImageCodec {
    /// Decode the file at `path`
    fn decode(&self, path: &Path) -> Result<DecodedImage, ResizeError>;

    /// Scale to the given size; a zero side is derived from the aspect ratio
    fn resample(&self, image: &DecodedImage, width: u32, height: u32) -> DecodedImage;

    /// Encode as JPEG at `quality` (0-100) into `sink`
    fn encode(&self, image: &DecodedImage, quality: u8, sink: &mut dyn Write) -> Result<(), ResizeError>;
}

/// Production codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec {
    algorithm: ResizeAlgorithm,
}

impl ImageCrateCodec {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ResizeError> {
        let reader = image::io::Reader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| ResizeError::fs(path, e))?;

        let pixels = reader.decode().map_err(|source| ResizeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        // JPEG has no alpha: flatten once here instead of on every trial encode
        let pixels = match pixels {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => pixels,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };

        Ok(DecodedImage::new(pixels))
    }

    fn resample(&self, image: &DecodedImage, width: u32, height: u32) -> DecodedImage {
        let (width, height) = scaled_dimensions(image.width(), image.height(), width, height);
        DecodedImage::new(
            image
                .pixels()
                .resize_exact(width, height, self.algorithm.to_filter_type()),
        )
    }

    fn encode(&self, image: &DecodedImage, quality: u8, sink: &mut dyn Write) -> Result<(), ResizeError> {
        // the encoder's scale starts at 1
        let mut encoder = JpegEncoder::new_with_quality(sink, quality.clamp(1, 100));

        let result = match image.pixels() {
            DynamicImage::ImageRgb8(rgb) => encoder.encode_image(rgb),
            DynamicImage::ImageLuma8(gray) => encoder.encode_image(gray),
            other => encoder.encode_image(&other.to_rgb8()),
        };

        result.map_err(|source| ResizeError::Encode { quality, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_counter::ByteCounter;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        })
    }

    #[test]
    fn test_source_format_detection() {
        assert_eq!(SourceFormat::from_path(Path::new("a/b.JPG")), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_path(Path::new("b.jpeg")), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_path(Path::new("c.Png")), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
        assert!(SourceFormat::Png.is_secondary());
        assert!(!SourceFormat::Jpeg.is_secondary());
    }

    #[test]
    fn test_decode_png_flattens_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpha.png");
        RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 128])).save(&path).unwrap();

        let decoded = ImageCrateCodec::default().decode(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert!(matches!(decoded.pixels(), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"\xFF\xD8\xFF\xE0 definitely not a jpeg").unwrap();

        let err = ImageCrateCodec::default().decode(&path).unwrap_err();
        assert!(matches!(err, ResizeError::Decode { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_decode_missing_file_is_fs_error() {
        let dir = TempDir::new().unwrap();
        let err = ImageCrateCodec::default()
            .decode(&dir.path().join("missing.jpg"))
            .unwrap_err();
        assert!(matches!(err, ResizeError::FileSystem { .. }));
    }

    #[test]
    fn test_encode_produces_decodable_jpeg() {
        let codec = ImageCrateCodec::default();
        let image = DecodedImage::new(DynamicImage::ImageRgb8(gradient(32, 16)));

        let mut bytes = Vec::new();
        codec.encode(&image, 90, &mut bytes).unwrap();

        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let back = image::load_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (32, 16));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let codec = ImageCrateCodec::default();
        let image = DecodedImage::new(DynamicImage::ImageRgb8(gradient(64, 64)));

        let size_at = |quality| {
            let mut counter = ByteCounter::new();
            codec.encode(&image, quality, &mut counter).unwrap();
            counter.count()
        };
        assert!(size_at(10) < size_at(100));
    }

    #[test]
    fn test_resample_derives_missing_side() {
        let codec = ImageCrateCodec::new(ResizeAlgorithm::Triangle);
        let image = DecodedImage::new(DynamicImage::ImageRgb8(gradient(100, 40)));
        let resized = codec.resample(&image, 50, 0);
        assert_eq!((resized.width(), resized.height()), (50, 20));
    }
}
