//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per comunicazione con
//! front-end esterni (GUI, script).
//!
//! ## Responsabilità:
//! - Emette messaggi JSON su stdout, uno per riga
//! - Implementa `ProgressSink` così il canale di stato può essere reso in JSON
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run con la policy effettiva
//! - `status`: Messaggio di stato libero (un file in elaborazione, riepilogo)
//! - `complete`: Fine del run con statistiche finali
//! - `error`: Run interrotto dal primo errore, con i file già modificati

use crate::batch::RunOutcome;
use crate::config::ResizePolicy;
use crate::progress::ProgressSink;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del run
    Start {
        paths: Vec<PathBuf>,
        max_width: u32,
        max_height: u32,
        max_size_bytes: u64,
        convert_pngs: bool,
        dry_run: bool,
    },

    /// Messaggio di stato
    Status { message: String },

    /// Run completato
    Complete {
        files_changed: usize,
        bytes_saved: u64,
    },

    /// Run interrotto
    Error {
        message: String,
        files_changed: usize,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(paths: &[PathBuf], policy: &ResizePolicy, dry_run: bool) -> Self {
        Self::Start {
            paths: paths.to_vec(),
            max_width: policy.max_width,
            max_height: policy.max_height,
            max_size_bytes: policy.max_size_bytes,
            convert_pngs: policy.convert_secondary_format,
            dry_run,
        }
    }

    /// Messaggio finale: `complete` o `error` a seconda dell'esito
    pub fn finished(outcome: &RunOutcome) -> Self {
        match &outcome.error {
            Some(error) => Self::Error {
                message: error.to_string(),
                files_changed: outcome.files_changed,
            },
            None => Self::Complete {
                files_changed: outcome.files_changed,
                bytes_saved: outcome.bytes_saved(),
            },
        }
    }
}

/// Renders status strings as `status` JSON lines
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSink;

impl ProgressSink for JsonSink {
    fn status(&self, message: &str) {
        JsonMessage::Status {
            message: message.to_string(),
        }
        .emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResizeError;

    #[test]
    fn test_status_is_tagged() {
        let json = serde_json::to_string(&JsonMessage::Status {
            message: "resizing: a.jpg".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"status","message":"resizing: a.jpg"}"#);
    }

    #[test]
    fn test_finished_reports_partial_count_on_error() {
        let outcome = RunOutcome {
            files_changed: 3,
            error: Some(ResizeError::Cancelled),
            ..RunOutcome::default()
        };
        assert_eq!(
            JsonMessage::finished(&outcome),
            JsonMessage::Error {
                message: "cancelled by user".to_string(),
                files_changed: 3,
            }
        );
    }

    #[test]
    fn test_finished_reports_savings() {
        let outcome = RunOutcome {
            files_changed: 2,
            bytes_before: 900,
            bytes_after: 400,
            error: None,
        };
        assert_eq!(
            JsonMessage::finished(&outcome),
            JsonMessage::Complete {
                files_changed: 2,
                bytes_saved: 500,
            }
        );
    }

    #[test]
    fn test_start_carries_policy() {
        let policy = ResizePolicy {
            max_width: 1200,
            max_size_bytes: 256_000,
            convert_secondary_format: true,
            ..ResizePolicy::default()
        };
        let message = JsonMessage::start(&[PathBuf::from("photos")], &policy, false);
        let json: serde_json::Value = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "start");
        assert_eq!(json["max_width"], 1200);
        assert_eq!(json["max_size_bytes"], 256_000);
        assert_eq!(json["convert_pngs"], true);
    }
}
