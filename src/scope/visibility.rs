//! Visibility Classifier
//!
//! Walks the scope chain of a canonical record from its top-level container
//! down to the record itself:
//! 1. The top level starts global (script files, `declare global`, ambient
//!    modules) or module-scoped (exported or not from a module file)
//! 2. Each exported member keeps the state of its container, narrowed to
//!    `ScopedExport` when the container is not globally reachable
//! 3. A private body or a non-exported member makes the symbol local

use serde::Serialize;
use super::merge::{CanonicalRecord, RecordId, ScopeKey, SymbolArena};
use crate::symbol::DeclScope;

/// Visibility class of a canonical symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Reachable from the program root through exported containers only
    GlobalExport,
    /// Exported from a container that is not itself globally reachable
    ScopedExport,
    /// Not exported at some level, or declared in a private body
    Local,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::GlobalExport => "global-export",
            Visibility::ScopedExport => "scoped-export",
            Visibility::Local => "local",
        }
    }

    /// Whether the symbol is exported from its immediate container
    pub fn is_export(&self) -> bool {
        !matches!(self, Visibility::Local)
    }

    /// Visibility of a member given the visibility of its container
    fn member_of(container: Visibility, member_exported: bool) -> Visibility {
        match (container, member_exported) {
            (_, false) => Visibility::Local,
            (Visibility::GlobalExport, true) => Visibility::GlobalExport,
            (_, true) => Visibility::ScopedExport,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies canonical records; a pure function of the scope chain.
pub struct VisibilityClassifier<'a> {
    arena: &'a SymbolArena,
}

impl<'a> VisibilityClassifier<'a> {
    pub fn new(arena: &'a SymbolArena) -> Self {
        Self { arena }
    }

    /// Classify one record
    pub fn classify(&self, id: RecordId) -> Visibility {
        let chain = self.arena.scope_chain(id);
        let mut links = chain.iter().rev().map(|id| self.arena.record(*id));

        let Some(top) = links.next() else {
            return Visibility::Local;
        };
        links.fold(Self::top_level(top), |container, record| {
            if record.scope == DeclScope::Local {
                Visibility::Local
            } else {
                Visibility::member_of(container, record.exported)
            }
        })
    }

    /// Classify every record, indexed by `RecordId`
    pub fn classify_all(&self) -> Vec<Visibility> {
        self.arena
            .records()
            .iter()
            .map(|record| self.classify(record.id))
            .collect()
    }

    fn top_level(record: &CanonicalRecord) -> Visibility {
        match (&record.scope, &record.key) {
            (DeclScope::Local, _) => Visibility::Local,
            (_, ScopeKey::Module(_)) if record.exported => Visibility::GlobalExport,
            (_, ScopeKey::Module(_)) => Visibility::Local,
            _ => Visibility::GlobalExport,
        }
    }
}
