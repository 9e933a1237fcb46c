//! # Progress Reporting Module
//!
//! Questo modulo gestisce il canale di stato verso l'utente.
//!
//! ## Responsabilità:
//! - Definisce il trait `ProgressSink`: riceve stringhe di stato leggibili
//! - Spinner visuale con `indicatif` per feedback real-time
//! - Canale `tokio::sync::mpsc` non limitato tra worker e interfaccia
//! - Formattazione human-readable delle dimensioni
//!
//! ## Semantica del canale:
//! - Fire-and-forget: nessun acknowledgment, nessuna backpressure
//! - Un messaggio per file all'inizio dell'elaborazione
//! - Un messaggio finale di riepilogo (file modificati o errore)
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] resizing: /photos/2023/IMG_001.jpg
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Receives human-readable status strings
pub trait ProgressSink {
    fn status(&self, message: &str);
}

/// Discards every message
impl ProgressSink for () {
    fn status(&self, _message: &str) {}
}

/// Forwards messages across the worker/UI boundary. A closed receiver is ignored.
impl ProgressSink for UnboundedSender<String> {
    fn status(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

/// Manages the terminal spinner for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a spinner for a run of unknown length
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressManager {
    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
