//! Sex validation service: reads an uploaded table, predicts sex from each
//! first name and reconciles it with the declared value.

pub mod http;
pub mod pipeline;
pub mod schema;

pub use http::{router, AppState};
pub use pipeline::{annotate, process_file, PipelineError, Processed};
