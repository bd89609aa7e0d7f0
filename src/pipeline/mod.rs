//! Forward-only processing stages: normalize → chunk → prompt → parse → post-process.

pub mod chunker;
pub mod normalizer;
pub mod parser;
pub mod postprocess;
pub mod prompt;

pub use chunker::split;
pub use normalizer::normalize;
pub use parser::parse as parse_response;
pub use postprocess::process as post_process;
pub use prompt::{build as build_prompt, build_followup};
