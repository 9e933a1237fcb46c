//! # Directory Walker Module
//!
//! Discovery ricorsiva dei file candidati sotto una o più radici.
//!
//! ## Responsabilità:
//! - Una radice file viene testata direttamente; una directory viene visitata ricorsivamente
//! - Filtra per estensione (case-insensitive) secondo la policy di eleggibilità
//! - Consegna ogni file eleggibile al visitor, uno alla volta
//!
//! ## Eleggibilità:
//! - `.jpg`, `.jpeg` sempre
//! - `.png` solo se la conversione è abilitata
//! - Tutto il resto viene saltato in silenzio (non è un errore)
//!
//! ## Error handling:
//! Fail-fast: il primo errore (enumerazione o visitor) interrompe tutto il
//! resto del run. Il conteggio parziale accumulato fino a quel momento viene
//! restituito insieme all'errore.
//!
//! L'elenco di ogni directory viene letto per intero prima di visitarne i
//! file, così i `.jpg` creati da una conversione non vengono rivisitati.

use crate::config::ResizePolicy;
use crate::error::ResizeError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Which files are candidates for processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    convert_pngs: bool,
}

impl Eligibility {
    pub fn new(convert_pngs: bool) -> Self {
        Self { convert_pngs }
    }

    pub fn from_policy(policy: &ResizePolicy) -> Self {
        Self::new(policy.convert_secondary_format)
    }

    /// Check the lowercased extension of `path`
    pub fn is_eligible(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                matches!(ext_lower.as_str(), "jpg" | "jpeg") || (self.convert_pngs && ext_lower == "png")
            }
            None => false,
        }
    }
}

/// Recursive enumeration of eligible files
pub struct DirectoryWalker;

impl DirectoryWalker {
    /// Feed every eligible file under `roots` to `visit`.
    ///
    /// `visit` returns `Ok(true)` when it modified the file. Returns the number
    /// of modified files and the error that stopped the walk, if any.
    pub fn walk<E, V>(roots: &[PathBuf], eligible: E, mut visit: V) -> (usize, Option<ResizeError>)
    where
        E: Fn(&Path) -> bool,
        V: FnMut(&Path) -> Result<bool, ResizeError>,
    {
        let mut count = 0;

        for root in roots {
            let entries = WalkDir::new(root).follow_links(true).sort_by_file_name();

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return (count, Some(e.into())),
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                if !eligible(path) {
                    debug!("Skipping ineligible file: {}", path.display());
                    continue;
                }

                match visit(path) {
                    Ok(true) => count += 1,
                    Ok(false) => {}
                    Err(e) => return (count, Some(e)),
                }
            }
        }

        (count, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_eligibility_by_extension() {
        let with_png = Eligibility::new(true);
        let without_png = Eligibility::new(false);

        assert!(with_png.is_eligible(Path::new("a.jpg")));
        assert!(with_png.is_eligible(Path::new("a.JPEG")));
        assert!(with_png.is_eligible(Path::new("a.PnG")));
        assert!(!with_png.is_eligible(Path::new("a.txt")));
        assert!(!with_png.is_eligible(Path::new("a.jpg.backup")));
        assert!(!with_png.is_eligible(Path::new("jpg")));

        assert!(without_png.is_eligible(Path::new("a.jpg")));
        assert!(!without_png.is_eligible(Path::new("a.png")));
    }

    #[test]
    fn test_walk_recurses_and_filters() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("sub").join("b.png"));
        touch(&dir.path().join("c.txt"));

        let eligibility = Eligibility::new(true);
        let mut seen = Vec::new();
        let (count, error) = DirectoryWalker::walk(
            &[dir.path().to_path_buf()],
            |p| eligibility.is_eligible(p),
            |p| {
                seen.push(p.file_name().unwrap().to_string_lossy().into_owned());
                Ok(true)
            },
        );

        assert!(error.is_none());
        assert_eq!(count, 2);
        seen.sort();
        assert_eq!(seen, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_file_root_is_processed_directly() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.jpeg");
        touch(&file);

        let (count, error) = DirectoryWalker::walk(&[file.clone()], |_| true, |p| Ok(p == file));
        assert!(error.is_none());
        assert_eq!(count, 1);
    }

    #[test]
    fn test_noop_files_are_not_counted() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let (count, error) = DirectoryWalker::walk(&[dir.path().to_path_buf()], |_| true, |p| {
            Ok(p.file_name().unwrap() == "b.jpg")
        });
        assert!(error.is_none());
        assert_eq!(count, 1);
    }

    #[test]
    fn test_error_stops_walk_with_partial_count() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("c.jpg"));

        let mut visited = 0;
        let (count, error) = DirectoryWalker::walk(&[dir.path().to_path_buf()], |_| true, |p| {
            visited += 1;
            if p.file_name().unwrap() == "b.jpg" {
                Err(ResizeError::Cancelled)
            } else {
                Ok(true)
            }
        });

        assert_eq!(count, 1);
        assert_eq!(visited, 2);
        assert!(matches!(error, Some(ResizeError::Cancelled)));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (count, error) = DirectoryWalker::walk(
            &[dir.path().join("does-not-exist")],
            |_| true,
            |_| Ok(true),
        );
        assert_eq!(count, 0);
        assert!(matches!(error, Some(ResizeError::Walk(_))));
    }

    #[test]
    fn test_error_in_first_root_skips_later_roots() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("later").join("a.jpg"));

        let mut visited = 0;
        let (_, error) = DirectoryWalker::walk(
            &[dir.path().join("missing"), dir.path().join("later")],
            |_| true,
            |_| {
                visited += 1;
                Ok(true)
            },
        );
        assert!(error.is_some());
        assert_eq!(visited, 0);
    }
}
