pub mod alias_linker;

pub use alias_linker::{AliasLinker, AliasLinkerStats, CanonicalMoniker};
