//! Invoice audit: combines per-line VAT verdicts, the vendor CVR verdict
//! and the VAT total into a Green / Review / Red classification.

mod classify;
mod engine;
mod reconcile;
mod result;

pub use classify::{AuditStatus, classify};
pub use engine::Auditor;
pub use reconcile::{VatReconciliation, reconcile};
pub use result::{AuditResult, LineVerdict};
