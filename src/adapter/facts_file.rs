//! Facts file adapter
//!
//! Reads program facts that a front-end (the type checker integration)
//! serialized to JSON.

use crate::Result;
use super::framework::{ProgramAdapter, ProgramFacts};
use std::path::{Path, PathBuf};

/// Adapter backed by a JSON facts file on disk
#[derive(Debug, Clone)]
pub struct FactsFile {
    path: PathBuf,
}

impl FactsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize facts to a file that `FactsFile` can read back
    pub fn write(path: &Path, facts: &ProgramFacts) -> Result<()> {
        let contents = serde_json::to_string_pretty(facts)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl ProgramAdapter for FactsFile {
    fn name(&self) -> &str {
        "facts-file"
    }

    fn analyze(&self) -> Result<ProgramFacts> {
        tracing::debug!("Reading program facts from {}", self.path.display());
        let contents = std::fs::read_to_string(&self.path)?;
        let facts: ProgramFacts = serde_json::from_str(&contents)?;
        tracing::debug!(
            documents = facts.documents.len(),
            symbols = facts.symbols.len(),
            "Loaded program facts"
        );
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DocumentFacts;
    use crate::symbol::{DeclarationSite, SymbolFacts, SymbolKind};
    use crate::vertex::Span;
    use crate::Error;

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        let facts = ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script("/@test/a.ts"))
            .with_symbol(
                SymbolFacts::new(1, "x", SymbolKind::Variable)
                    .declared_at(DeclarationSite::new("/@test/a.ts", Span::on_line(0, 4, 5))),
            );

        FactsFile::write(&path, &facts).unwrap();
        let adapter = FactsFile::new(&path);
        assert_eq!(adapter.analyze().unwrap(), facts);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FactsFile::new(dir.path().join("absent.json"));
        assert!(matches!(adapter.analyze(), Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        std::fs::write(&path, "{\"root\": ").unwrap();
        assert!(matches!(FactsFile::new(&path).analyze(), Err(Error::Json(_))));
    }
}
