//! Symbol facts - what the program adapter reports about each declaration
//!
//! Every declared entity of the analyzed program is described by:
//! - a `SymbolKind`: the syntactic kind of the declaration
//! - a `SymbolHandle`: the adapter's own handle, valid only for one run
//! - a parent container and a `DeclScope` describing where it lives
//! - one or more `DeclarationSite`s with per-site export status

use crate::vertex::Span;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Syntactic kinds of declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Ambient module block (`declare module 'x' { }`)
    Module,
    /// Namespace / internal module
    Namespace,
    Class,
    Interface,
    Enum,
    EnumMember,
    TypeAlias,
    TypeParameter,
    Function,
    Method,
    /// Constructor or construct signature
    Constructor,
    /// Call or index signature
    Signature,
    Property,
    Variable,
    Constant,
    Parameter,
}

impl SymbolKind {
    /// Get the string representation of the symbol kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum_member",
            SymbolKind::TypeAlias => "type_alias",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Signature => "signature",
            SymbolKind::Property => "property",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Parameter => "parameter",
        }
    }

    /// LSP `SymbolKind` number carried in range tags
    pub fn lsp_kind(&self) -> u32 {
        match self {
            SymbolKind::Module => 2,
            SymbolKind::Namespace => 3,
            SymbolKind::Class => 5,
            SymbolKind::Method | SymbolKind::Signature => 6,
            SymbolKind::Property => 7,
            SymbolKind::Constructor => 9,
            SymbolKind::Enum => 10,
            SymbolKind::Interface => 11,
            SymbolKind::Function => 12,
            SymbolKind::Variable | SymbolKind::Parameter => 13,
            SymbolKind::Constant => 14,
            SymbolKind::EnumMember => 22,
            SymbolKind::TypeAlias | SymbolKind::TypeParameter => 26,
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Module,
            SymbolKind::Namespace,
            SymbolKind::Class,
            SymbolKind::Interface,
            SymbolKind::Enum,
            SymbolKind::EnumMember,
            SymbolKind::TypeAlias,
            SymbolKind::TypeParameter,
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Constructor,
            SymbolKind::Signature,
            SymbolKind::Property,
            SymbolKind::Variable,
            SymbolKind::Constant,
            SymbolKind::Parameter,
        ]
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "module" | "ambient_module" => Ok(SymbolKind::Module),
            "namespace" | "ns" => Ok(SymbolKind::Namespace),
            "class" => Ok(SymbolKind::Class),
            "interface" => Ok(SymbolKind::Interface),
            "enum" => Ok(SymbolKind::Enum),
            "enum_member" => Ok(SymbolKind::EnumMember),
            "type_alias" | "type" => Ok(SymbolKind::TypeAlias),
            "type_parameter" => Ok(SymbolKind::TypeParameter),
            "function" | "fn" => Ok(SymbolKind::Function),
            "method" => Ok(SymbolKind::Method),
            "constructor" | "construct_signature" => Ok(SymbolKind::Constructor),
            "signature" | "call_signature" | "index_signature" => Ok(SymbolKind::Signature),
            "property" | "field" => Ok(SymbolKind::Property),
            "variable" | "var" | "let" => Ok(SymbolKind::Variable),
            "constant" | "const" => Ok(SymbolKind::Constant),
            "parameter" | "param" => Ok(SymbolKind::Parameter),
            _ => Err(Error::InvalidKind(format!("Unknown symbol kind: {}", s))),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The adapter's handle for a symbol.
///
/// Handles are not stable across runs and never appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolHandle(pub u32);

/// Where a declaration lives relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclScope {
    /// Member of the parent container, or of the file root without a parent
    #[default]
    Member,
    /// Top-level of a `declare global` block
    Global,
    /// Inside a function or block body
    Local,
}

/// Special export forms whose path segment is a sentinel instead of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportForm {
    /// `export default ...`
    Default,
    /// `export = ...`
    Assignment,
}

impl ExportForm {
    pub fn sentinel(&self) -> &'static str {
        match self {
            ExportForm::Default => crate::moniker::EXPORT_DEFAULT,
            ExportForm::Assignment => crate::moniker::EXPORT_ASSIGNMENT,
        }
    }
}

/// One place where a symbol is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSite {
    /// Path of the declaring document
    pub file: String,
    /// Span of the identifying name
    pub span: Span,
    /// Span of the whole declaration, when longer than the name
    #[serde(default)]
    pub full_span: Option<Span>,
    /// Exported from its immediate container at this site
    #[serde(default)]
    pub exported: bool,
    /// Site-specific kind when it differs from the symbol's kind
    #[serde(default)]
    pub kind: Option<SymbolKind>,
    /// Display text; defaults to the symbol name
    #[serde(default)]
    pub text: Option<String>,
}

impl DeclarationSite {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span,
            full_span: None,
            exported: false,
            kind: None,
            text: None,
        }
    }

    /// Mark the site as exported from its container
    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn with_full_span(mut self, full_span: Span) -> Self {
        self.full_span = Some(full_span);
        self
    }

    pub fn with_kind(mut self, kind: SymbolKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Everything the adapter knows about one of its symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFacts {
    pub handle: SymbolHandle,
    /// `None` for anonymous declarations such as construct signatures
    pub name: Option<String>,
    pub kind: SymbolKind,
    #[serde(default)]
    pub parent: Option<SymbolHandle>,
    #[serde(default)]
    pub scope: DeclScope,
    #[serde(default)]
    pub export_form: Option<ExportForm>,
    pub declarations: Vec<DeclarationSite>,
}

impl SymbolFacts {
    /// Create a named symbol without declarations
    pub fn new(handle: u32, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            handle: SymbolHandle(handle),
            name: Some(name.into()),
            kind,
            parent: None,
            scope: DeclScope::Member,
            export_form: None,
            declarations: Vec::new(),
        }
    }

    /// Create an anonymous symbol
    pub fn anonymous(handle: u32, kind: SymbolKind) -> Self {
        Self {
            name: None,
            ..Self::new(handle, String::new(), kind)
        }
    }

    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(SymbolHandle(parent));
        self
    }

    pub fn with_scope(mut self, scope: DeclScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_export_form(mut self, form: ExportForm) -> Self {
        self.export_form = Some(form);
        self
    }

    /// Add a declaration site
    pub fn declared_at(mut self, site: DeclarationSite) -> Self {
        self.declarations.push(site);
        self
    }

    /// Whether any site exports the symbol
    pub fn is_exported(&self) -> bool {
        self.declarations.iter().any(|site| site.exported)
    }
}
