//! `validasexo-model`: first-name sex classifier.
//!
//! The `SexClassifier` trait is the only thing the rest of the workspace sees;
//! `ArtifactClassifier` adapts a trained model + vectorizer artifact to it.

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod names;
pub mod vectorizer;

pub use artifact::ArtifactClassifier;
pub use classifier::{ClassProbabilities, Label, Prediction, SexClassifier};
pub use error::ModelError;
pub use names::first_name;
