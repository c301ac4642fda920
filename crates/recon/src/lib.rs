//! `validasexo-recon`: declared-sex validation.
//!
//! Pure engine crate: receives normalized declared values and predicted
//! labels, returns validated values and statuses. No IO dependencies.

pub mod model;
pub mod normalize;
pub mod reconcile;

pub use model::{DeclaredSex, ReconSummary, Reconciled, Status, ValidatedSex};
pub use normalize::normalize_declared;
pub use reconcile::reconcile;
