//! Program Adapter boundary
//!
//! The adapter wraps the external program-analysis engine. It reports
//! documents, symbols with their scope chains and per-site export status,
//! references and aliases. Everything after this boundary is deterministic
//! graph construction.

pub mod framework;
pub mod facts_file;

pub use framework::{AliasFacts, DocumentFacts, ProgramAdapter, ProgramFacts, ReferenceSite};
pub use facts_file::FactsFile;
