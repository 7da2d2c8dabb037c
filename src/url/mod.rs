//! URL discovery for Docs-Scribe
//!
//! The collector renders one seed page and turns its anchors into the ordered,
//! de-duplicated list of same-site pages the batch will process.

mod collector;

pub use collector::UrlCollector;
