//! Scope model - merging and visibility
//!
//! Adapter symbols are first merged into canonical records, then each record
//! is classified by walking its scope chain.

pub mod merge;
pub mod visibility;

pub use merge::{CanonicalRecord, DeclarationMerger, MergedSite, RecordId, ScopeKey, SymbolArena};
pub use visibility::{Visibility, VisibilityClassifier};
