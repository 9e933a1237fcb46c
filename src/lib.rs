//! # Image Resizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare del motore di ridimensionamento
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri front-end
//!
//! ## Architettura dei moduli:
//! - `config`: `ResizePolicy` immutabile e preferenze persistite
//! - `error`: Tipi di errore custom per ogni fase
//! - `byte_counter`: Sink che conta i byte senza materializzare l'output
//! - `quality_search`: Ricerca binaria della qualità JPEG sotto un budget
//! - `codec`: Decode/resample/encode come capacità esterne (`ImageCodec`)
//! - `resize`: Limiti di larghezza/altezza a due passate
//! - `encoder`: Decide resample/ricodifica e produce i byte finali
//! - `replacer`: Sostituzione dei file con backup e rollback
//! - `walker`: Discovery ricorsiva dei file eleggibili
//! - `batch`: Orchestratore del run e worker in background
//! - `progress` / `json_output`: Canale di stato verso l'utente
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_resizer::{BatchResizer, Config, ImageCrateCodec};
//!
//! let config = Config::default();
//! let mut resizer = BatchResizer::new(config.policy(), ImageCrateCodec::default())?;
//! let outcome = resizer.run(&paths, &());
//! println!("{}", outcome.summary());
//! ```

pub mod batch;
pub mod byte_counter;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod error;
pub mod json_output;
pub mod progress;
pub mod quality_search;
pub mod replacer;
pub mod resize;
pub mod walker;

pub use batch::{BatchResizer, RunOutcome};
pub use codec::{DecodedImage, ImageCodec, ImageCrateCodec, SourceFormat};
pub use config::{Config, ResizePolicy};
pub use encoder::{EncodeResult, ImageTask, SizeConstrainedEncoder};
pub use error::ResizeError;
pub use progress::{ProgressManager, ProgressSink};
pub use replacer::AtomicFileReplacer;
pub use walker::{DirectoryWalker, Eligibility};
