//! Core adapter framework
//!
//! Defines the trait every program adapter implements and the fact types it
//! hands to the core. The core never parses or type-checks source text.

use crate::Result;
use crate::symbol::{SymbolFacts, SymbolHandle};
use crate::vertex::{DocumentKind, Span};
use serde::{Deserialize, Serialize};

/// One analyzed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFacts {
    /// Absolute file path
    pub path: String,
    /// Declaration-only or source; derived from the file name when absent
    #[serde(default)]
    pub kind: Option<DocumentKind>,
    /// The file has import/export syntax
    #[serde(default)]
    pub module: bool,
}

impl DocumentFacts {
    /// A script file (no module syntax)
    pub fn script(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            module: false,
        }
    }

    /// A file with module syntax
    pub fn module(path: impl Into<String>) -> Self {
        Self {
            module: true,
            ..Self::script(path)
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind.unwrap_or_else(|| DocumentKind::from_path(&self.path))
    }
}

/// A reference to a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSite {
    pub file: String,
    pub span: Span,
    pub text: String,
    /// The referenced symbol, with aliases already resolved
    pub target: SymbolHandle,
}

impl ReferenceSite {
    pub fn new(file: impl Into<String>, span: Span, text: impl Into<String>, target: u32) -> Self {
        Self {
            file: file.into(),
            span,
            text: text.into(),
            target: SymbolHandle(target),
        }
    }
}

/// A statically known alias: the target becomes visible under `name` in `container`.
///
/// Covers `export { a as b }`, `export = x`, `export default x` and
/// `export import y = N.a`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasFacts {
    /// File holding the alias statement
    pub file: String,
    pub span: Span,
    /// Container the alias is exported from; `None` means the file itself
    #[serde(default)]
    pub container: Option<SymbolHandle>,
    /// Exported name, or a sentinel for assignment/default exports
    pub name: String,
    pub target: SymbolHandle,
}

impl AliasFacts {
    /// `export { target as name }`
    pub fn export_specifier(
        file: impl Into<String>,
        span: Span,
        container: Option<u32>,
        name: impl Into<String>,
        target: u32,
    ) -> Self {
        Self {
            file: file.into(),
            span,
            container: container.map(SymbolHandle),
            name: name.into(),
            target: SymbolHandle(target),
        }
    }

    /// `export = target`
    pub fn export_assignment(file: impl Into<String>, span: Span, container: Option<u32>, target: u32) -> Self {
        Self::export_specifier(file, span, container, crate::moniker::EXPORT_ASSIGNMENT, target)
    }

    /// `export default target`
    pub fn export_default(file: impl Into<String>, span: Span, container: Option<u32>, target: u32) -> Self {
        Self::export_specifier(file, span, container, crate::moniker::EXPORT_DEFAULT, target)
    }
}

/// Everything the core needs to know about the analyzed program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFacts {
    /// Project root; module names are computed relative to it
    pub root: String,
    pub documents: Vec<DocumentFacts>,
    pub symbols: Vec<SymbolFacts>,
    #[serde(default)]
    pub references: Vec<ReferenceSite>,
    #[serde(default)]
    pub aliases: Vec<AliasFacts>,
}

impl ProgramFacts {
    /// Create empty facts for a project root
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, document: DocumentFacts) -> Self {
        self.documents.push(document);
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolFacts) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn with_reference(mut self, reference: ReferenceSite) -> Self {
        self.references.push(reference);
        self
    }

    pub fn with_alias(mut self, alias: AliasFacts) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Look up a document by path
    pub fn document(&self, path: &str) -> Option<&DocumentFacts> {
        self.documents.iter().find(|document| document.path == path)
    }
}

/// Trait for program adapters
///
/// An adapter is responsible for:
/// 1. Listing the analyzed documents
/// 2. Reporting every symbol with its scope chain and declaration sites
/// 3. Reporting references and statically known aliases
///
/// Adapters must be deterministic: identical input yields identical facts.
pub trait ProgramAdapter {
    /// Get the adapter name (for display)
    fn name(&self) -> &str;

    /// Produce the facts for the whole program
    fn analyze(&self) -> Result<ProgramFacts>;
}

/// In-memory facts act as their own adapter
impl ProgramAdapter for ProgramFacts {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn analyze(&self) -> Result<ProgramFacts> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{DeclarationSite, SymbolKind};

    #[test]
    fn test_in_memory_adapter() {
        let facts = ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script("/@test/a.ts"))
            .with_symbol(
                SymbolFacts::new(1, "x", SymbolKind::Variable)
                    .declared_at(DeclarationSite::new("/@test/a.ts", Span::on_line(0, 4, 5))),
            );

        let analyzed = facts.analyze().unwrap();
        assert_eq!(analyzed, facts);
        assert!(analyzed.document("/@test/a.ts").is_some());
        assert!(analyzed.document("/@test/b.ts").is_none());
    }

    #[test]
    fn test_document_kind_defaults_from_path() {
        assert_eq!(DocumentFacts::script("/p/a.d.ts").kind(), DocumentKind::Declaration);
        let explicit = DocumentFacts {
            kind: Some(DocumentKind::Source),
            ..DocumentFacts::module("/p/a.d.ts")
        };
        assert_eq!(explicit.kind(), DocumentKind::Source);
        assert!(explicit.module);
    }

    #[test]
    fn test_alias_sentinels() {
        let alias = AliasFacts::export_assignment("/p/a.d.ts", Span::on_line(2, 4, 33), Some(2), 1);
        assert_eq!(alias.name, "export=");
        assert_eq!(alias.container, Some(SymbolHandle(2)));

        let default = AliasFacts::export_default("/p/m.ts", Span::on_line(0, 0, 20), None, 3);
        assert_eq!(default.name, "default");
        assert_eq!(default.container, None);
    }
}
