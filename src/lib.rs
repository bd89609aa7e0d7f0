//! quizmill — turn study material into quiz questions with an LLM.
//!
//! The pipeline: a source adapter pulls raw text out of a file (plain text,
//! PDF, or image via OCR), the normalizer and chunker shape it into
//! model-sized pieces, the gateway runs each piece through an
//! OpenAI-compatible chat endpoint with rate limiting and retries, and the
//! parser plus post-processor turn the responses into validated, deduplicated
//! [`Question`]s. [`QuestionExtractor`] ties it together with caching,
//! progress reporting, and cooperative cancellation.
//!
//! ```no_run
//! use quizmill::{ExtractorConfig, FileKind, QuestionExtractor};
//!
//! let extractor = QuestionExtractor::new(ExtractorConfig::default());
//! let questions = extractor.process_file(
//!     std::path::Path::new("notes.txt"),
//!     FileKind::Text,
//!     None,
//! );
//! println!("extracted {} questions", questions.len());
//! ```

pub mod cancel;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod notes;
pub mod orchestrator;
pub mod pipeline;
pub mod question;
pub mod source;
pub mod store;
pub mod tracing_init;

pub use cancel::CancelToken;
pub use config::{ExtractorConfig, GatewayConfig, PipelineConfig};
pub use error::{ExtractError, ExtractResult, GatewayError};
pub use gateway::{ModelClient, ModelGateway};
pub use notes::NoteStore;
pub use orchestrator::QuestionExtractor;
pub use question::Question;
pub use source::FileKind;
pub use store::SaveReport;
