//! Vertex types - the nodes of the identity graph
//!
//! Four vertex labels make up the graph:
//! - `document`: one analyzed file
//! - `range`: one lexical occurrence of a symbol
//! - `resultSet`: the aggregation point for all occurrences of one symbol
//! - `moniker`: the stable identity of a symbol

use crate::uri::DocumentUri;
use serde::{Deserialize, Serialize};

/// A zero-based line/character position inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A lexical span `start..end` inside one document.
///
/// Ordering compares the start position first, then the end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    /// Span on a single line
    pub fn on_line(line: u32, start_character: u32, end_character: u32) -> Self {
        Self::new(line, start_character, line, end_character)
    }
}

/// Whether a document is a regular source file or a declaration-only file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Source,
    Declaration,
}

impl DocumentKind {
    /// Derive the kind from a file name (`.d.ts`, `.d.mts`, `.d.cts` are declaration-only)
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if [".d.ts", ".d.mts", ".d.cts"].iter().any(|suffix| lower.ends_with(suffix)) {
            DocumentKind::Declaration
        } else {
            DocumentKind::Source
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVertex {
    pub uri: DocumentUri,
    #[serde(rename = "languageId")]
    pub language_id: String,
    pub kind: DocumentKind,
}

/// Whether a range defines its symbol or refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeTagType {
    Definition,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTag {
    #[serde(rename = "type")]
    pub tag_type: RangeTagType,
    pub text: String,
    /// LSP symbol kind number
    pub kind: u32,
    #[serde(rename = "fullRange", default, skip_serializing_if = "Option::is_none")]
    pub full_range: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeVertex {
    #[serde(flatten)]
    pub span: Span,
    pub tag: RangeTag,
}

/// Uniqueness scope of a moniker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessLevel {
    /// Unique only inside the owning document
    Document,
    /// Unique across the whole analyzed group
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonikerKind {
    /// Part of a public surface
    Export,
    /// Internal only
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonikerVertex {
    pub scheme: String,
    pub identifier: String,
    pub unique: UniquenessLevel,
    pub kind: MonikerKind,
}

/// A vertex of the identity graph, tagged by its `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "camelCase")]
pub enum Vertex {
    Document(DocumentVertex),
    Range(RangeVertex),
    ResultSet,
    Moniker(MonikerVertex),
}

impl Vertex {
    pub fn label(&self) -> &'static str {
        match self {
            Vertex::Document(_) => "document",
            Vertex::Range(_) => "range",
            Vertex::ResultSet => "resultSet",
            Vertex::Moniker(_) => "moniker",
        }
    }

    pub fn as_moniker(&self) -> Option<&MonikerVertex> {
        match self {
            Vertex::Moniker(moniker) => Some(moniker),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeVertex> {
        match self {
            Vertex::Range(range) => Some(range),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_kind_from_path() {
        assert_eq!(DocumentKind::from_path("/p/a.d.ts"), DocumentKind::Declaration);
        assert_eq!(DocumentKind::from_path("/p/a.ts"), DocumentKind::Source);
        assert_eq!(DocumentKind::from_path("/p/types.D.MTS"), DocumentKind::Declaration);
    }

    #[test]
    fn test_span_ordering() {
        let first = Span::on_line(0, 4, 5);
        let second = Span::on_line(0, 10, 11);
        let next_line = Span::on_line(1, 0, 1);
        assert!(first < second);
        assert!(second < next_line);
    }

    #[test]
    fn test_range_vertex_shape() {
        let vertex = Vertex::Range(RangeVertex {
            span: Span::on_line(2, 13, 21),
            tag: RangeTag {
                tag_type: RangeTagType::Definition,
                text: "onDetach".to_string(),
                kind: 7,
                full_range: Some(Span::on_line(2, 13, 29)),
            },
        });

        assert_eq!(
            serde_json::to_value(&vertex).unwrap(),
            json!({
                "label": "range",
                "start": {"line": 2, "character": 13},
                "end": {"line": 2, "character": 21},
                "tag": {
                    "type": "definition",
                    "text": "onDetach",
                    "kind": 7,
                    "fullRange": {"start": {"line": 2, "character": 13}, "end": {"line": 2, "character": 29}}
                }
            })
        );
    }

    #[test]
    fn test_result_set_has_only_label() {
        assert_eq!(serde_json::to_value(&Vertex::ResultSet).unwrap(), json!({"label": "resultSet"}));
    }
}
