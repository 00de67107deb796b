//! `skucheck-recon`: SKU extraction and reconciliation engine.
//!
//! Pure engine crate: receives page text and pre-loaded input records,
//! returns the found / not-found partition. No network or spreadsheet IO.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod group;
pub mod model;
pub mod table;

pub use config::{DuplicatePolicy, ExportSelection, ReportSort, SkuCheckConfig};
pub use engine::reconcile;
pub use error::ReconError;
pub use extract::extract_identifiers;
pub use group::group_of;
pub use model::{
    DuplicateWarning, FoundSku, InputSet, ReconOutcome, ReconSummary, ReferenceGroup, RunMeta,
    RunReport, SkuRecord,
};
pub use table::{normalize_key, ReferenceTable};
