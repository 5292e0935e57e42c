//! # lsif-moniker - Moniker and visibility graph builder
//!
//! Builds a semantic identity graph over a type-checked program.
//!
//! lsif-moniker provides:
//! - A visibility classifier deciding global, scoped and local exports
//! - A declaration merge resolver collapsing merged and overloaded declarations
//! - Stable moniker identifiers derived from export paths or content digests
//! - A two-phase alias linker producing `attach` edges for re-exports
//! - An append-only, strictly ordered graph emitter with sequential ids

pub mod uri;
pub mod symbol;
pub mod vertex;
pub mod edge;
pub mod graph;
pub mod adapter;
pub mod scope;
pub mod moniker;
pub mod linker;
pub mod indexer;
pub mod output;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use uri::DocumentUri;
pub use symbol::{SymbolFacts, SymbolHandle, SymbolKind};
pub use vertex::{Position, Span, Vertex};
pub use edge::{Edge, EdgeLabel};
pub use graph::{Element, ElementData, ElementId, Graph};
pub use adapter::{ProgramAdapter, ProgramFacts};
pub use indexer::{Indexer, IndexerOptions};

/// Result type alias for lsif-moniker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lsif-moniker operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program adapter reported facts that cannot describe a real program
    #[error("Adapter inconsistency: {0}")]
    AdapterInconsistency(String),

    #[error("Moniker collision: `{identifier}` is claimed by more than one symbol")]
    MonikerCollision { identifier: String },

    /// An edge referenced an element that was not emitted before it
    #[error("Emission order violated: {0}")]
    EmissionOrder(String),

    #[error("Invalid kind: {0}")]
    InvalidKind(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
