//! Moniker Identity Builder
//!
//! Turns a classified canonical record into `(identifier, unique, kind)`.
//!
//! Export identifiers have the form `<prefix>:<dotted export path>`:
//! - `:x`, `:N.a` for symbols of the program's global scope
//! - `chrome:debugger` for members of the ambient module `chrome`
//! - `x:` for the quoted ambient module `'x'` itself
//! - `lib/util:helper` for exports of the module file `lib/util.ts`
//!
//! Local identifiers are a 128-bit BLAKE3 digest rendered as padded base64,
//! so they never leak names and never depend on adapter handles.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use crate::scope::{CanonicalRecord, RecordId, ScopeKey, SymbolArena, Visibility};
use crate::uri::module_name;
use crate::vertex::{MonikerKind, MonikerVertex, UniquenessLevel};

/// Final path segment of an `export =` assignment
pub const EXPORT_ASSIGNMENT: &str = "export=";
/// Final path segment of an `export default`
pub const EXPORT_DEFAULT: &str = "default";

/// Leading part of an export identifier, before the `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPrefix {
    /// Program global scope; renders as the empty string
    Global,
    /// Declared name of an ambient module, without quotes
    Ambient(String),
    /// Module name of a module file
    Module(String),
}

impl PathPrefix {
    pub fn as_str(&self) -> &str {
        match self {
            PathPrefix::Global => "",
            PathPrefix::Ambient(name) | PathPrefix::Module(name) => name,
        }
    }
}

/// A prefix plus the dotted export path below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportPath {
    pub prefix: PathPrefix,
    pub segments: Vec<String>,
}

impl ExportPath {
    pub fn new(prefix: PathPrefix) -> Self {
        Self {
            prefix,
            segments: Vec::new(),
        }
    }

    /// Path extended by one segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            prefix: self.prefix.clone(),
            segments,
        }
    }

    pub fn identifier(&self) -> String {
        format!("{}:{}", self.prefix.as_str(), self.segments.join("."))
    }
}

/// The identity of one moniker vertex, without its scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonikerIdentity {
    pub identifier: String,
    pub unique: UniquenessLevel,
    pub kind: MonikerKind,
}

impl MonikerIdentity {
    /// Public, group-unique identity
    pub fn export(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            unique: UniquenessLevel::Group,
            kind: MonikerKind::Export,
        }
    }

    /// Internal, document-unique identity
    pub fn local(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            unique: UniquenessLevel::Document,
            kind: MonikerKind::Local,
        }
    }

    pub fn to_vertex(&self, scheme: &str) -> MonikerVertex {
        MonikerVertex {
            scheme: scheme.to_string(),
            identifier: self.identifier.clone(),
            unique: self.unique,
            kind: self.kind,
        }
    }
}

/// Derives moniker identities from canonical records
pub struct MonikerBuilder<'a> {
    arena: &'a SymbolArena,
    root: &'a str,
}

impl<'a> MonikerBuilder<'a> {
    pub fn new(arena: &'a SymbolArena, root: &'a str) -> Self {
        Self { arena, root }
    }

    /// Build the canonical identity of a record.
    ///
    /// Returns `None` when no identifier can be computed: anonymous symbols,
    /// or exports below an anonymous container.
    pub fn build(&self, id: RecordId, visibility: Visibility) -> Option<MonikerIdentity> {
        self.arena.record(id).name.as_ref()?;
        match visibility {
            Visibility::GlobalExport => self
                .export_path(id)
                .map(|path| MonikerIdentity::export(path.identifier())),
            Visibility::ScopedExport | Visibility::Local => {
                Some(MonikerIdentity::local(self.local_identifier(id)))
            }
        }
    }

    /// Export path from the top-level container down to the record.
    ///
    /// A quoted module (`declare module 'x'`) lives outside the global value
    /// space, so its own path is the bare `x:` prefix.
    pub fn export_path(&self, id: RecordId) -> Option<ExportPath> {
        let record = self.arena.record(id);
        let segment = segment(record)?;
        if is_external_module(record) {
            return Some(ExportPath::new(PathPrefix::Ambient(segment)));
        }
        match record.parent {
            Some(parent) => Some(self.member_path(parent)?.child(segment)),
            None => Some(ExportPath::new(self.top_level_prefix(record)).child(segment)),
        }
    }

    /// Path under which members of `container` are exported.
    ///
    /// Members of an ambient module use the module name as prefix instead
    /// of continuing the module's own global path.
    pub fn member_path(&self, container: RecordId) -> Option<ExportPath> {
        let record = self.arena.record(container);
        if record.is_ambient_module() {
            return Some(ExportPath::new(PathPrefix::Ambient(segment(record)?)));
        }
        self.export_path(container)
    }

    /// Path under which a file's own top-level exports live
    pub fn file_path(&self, file: &str, module: bool) -> ExportPath {
        if module {
            ExportPath::new(PathPrefix::Module(module_name(self.root, file)))
        } else {
            ExportPath::new(PathPrefix::Global)
        }
    }

    /// Digest identifier of a record: declaring file, internal scope path and
    /// canonical position.
    pub fn local_identifier(&self, id: RecordId) -> String {
        let record = self.arena.record(id);
        let site = record.canonical_site();
        let scope_path: Vec<&str> = self
            .arena
            .scope_chain(id)
            .iter()
            .rev()
            .map(|id| self.arena.record(*id).name.as_deref().unwrap_or("<anonymous>"))
            .collect();

        digest_identifier(&format!(
            "{}|{}|{}:{}",
            site.file,
            scope_path.join("."),
            site.span.start.line,
            site.span.start.character
        ))
    }

    fn top_level_prefix(&self, record: &CanonicalRecord) -> PathPrefix {
        match &record.key {
            ScopeKey::Module(file) => PathPrefix::Module(module_name(self.root, file)),
            _ => PathPrefix::Global,
        }
    }
}

/// Path segment contributed by a record
fn segment(record: &CanonicalRecord) -> Option<String> {
    if let Some(form) = record.export_form {
        return Some(form.sentinel().to_string());
    }
    let name = record.name.as_deref()?;
    if record.is_ambient_module() {
        Some(unquote(name).to_string())
    } else {
        Some(name.to_string())
    }
}

/// Ambient module declared with a string literal name
fn is_external_module(record: &CanonicalRecord) -> bool {
    record.is_ambient_module()
        && record
            .name
            .as_deref()
            .is_some_and(|name| unquote(name).len() != name.len())
}

fn unquote(name: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = name.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    name
}

/// 128-bit digest of `representation` as standard padded base64
pub fn digest_identifier(representation: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(representation.as_bytes());
    let mut digest = [0u8; 16];
    hasher.finalize_xof().fill(&mut digest);
    STANDARD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use crate::adapter::{DocumentFacts, ProgramFacts};
    use crate::scope::{DeclarationMerger, VisibilityClassifier};
    use crate::symbol::{DeclScope, DeclarationSite, ExportForm, SymbolFacts, SymbolHandle, SymbolKind};
    use crate::vertex::Span;

    const ROOT: &str = "/@test";

    fn site(file: &str, line: u32) -> DeclarationSite {
        DeclarationSite::new(file, Span::on_line(line, 10, 11))
    }

    /// Canonical identity of each handle, in the order given
    fn identities(facts: &ProgramFacts, handles: &[u32]) -> Vec<Option<MonikerIdentity>> {
        let arena = DeclarationMerger::new(facts).unwrap().merge().unwrap();
        let classifier = VisibilityClassifier::new(&arena);
        let builder = MonikerBuilder::new(&arena, ROOT);
        handles
            .iter()
            .map(|handle| {
                let id = arena.resolve(SymbolHandle(*handle)).unwrap();
                builder.build(id, classifier.classify(id))
            })
            .collect()
    }

    #[test]
    fn test_export_path_identifiers() {
        assert_eq!(ExportPath::new(PathPrefix::Global).child("x").identifier(), ":x");
        assert_eq!(
            ExportPath::new(PathPrefix::Ambient("chrome".into())).child("debugger").child("onDetach").identifier(),
            "chrome:debugger.onDetach"
        );
        assert_eq!(ExportPath::new(PathPrefix::Module("lib/util".into())).child("helper").identifier(), "lib/util:helper");
    }

    #[test]
    fn test_global_and_namespace_exports() {
        let file = "/@test/a.ts";
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "N", SymbolKind::Namespace).declared_at(site(file, 0)))
            .with_symbol(
                SymbolFacts::new(2, "a", SymbolKind::Constant)
                    .with_parent(1)
                    .declared_at(site(file, 1).exported()),
            );

        let ids = identities(&facts, &[1, 2]);
        assert_eq!(ids[0], Some(MonikerIdentity::export(":N")));
        assert_eq!(ids[1], Some(MonikerIdentity::export(":N.a")));
    }

    #[test]
    fn test_local_identifier_is_a_stable_digest() {
        let file = "/@test/a.ts";
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "N", SymbolKind::Namespace).declared_at(site(file, 0)))
            .with_symbol(
                SymbolFacts::new(2, "a", SymbolKind::Constant)
                    .with_parent(1)
                    .declared_at(site(file, 1)),
            );

        let first = identities(&facts, &[2]).remove(0).unwrap();
        let second = identities(&facts, &[2]).remove(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.kind, MonikerKind::Local);
        assert_eq!(first.unique, UniquenessLevel::Document);
        assert_eq!(first.identifier.len(), 24);
        assert!(first.identifier.ends_with("=="));
        assert_eq!(STANDARD.decode(&first.identifier).unwrap().len(), 16);
    }

    #[test]
    fn test_same_named_locals_get_distinct_digests() {
        let file = "/@test/a.ts";
        let local = |handle, line| {
            SymbolFacts::new(handle, "i", SymbolKind::Variable)
                .with_parent(1)
                .with_scope(DeclScope::Local)
                .declared_at(site(file, line))
        };
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "f", SymbolKind::Function).declared_at(site(file, 0)))
            .with_symbol(local(2, 1))
            .with_symbol(local(3, 2));

        let ids = identities(&facts, &[2, 3]);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_ambient_module_prefix() {
        let file = "/@test/a.d.ts";
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "'applicationinsights'", SymbolKind::Module).declared_at(site(file, 0)))
            .with_symbol(
                SymbolFacts::new(2, "setup", SymbolKind::Function)
                    .with_parent(1)
                    .declared_at(site(file, 1).exported()),
            );

        let ids = identities(&facts, &[1, 2]);
        assert_eq!(ids[0], Some(MonikerIdentity::export("applicationinsights:")));
        assert_eq!(ids[1], Some(MonikerIdentity::export("applicationinsights:setup")));
    }

    #[test]
    fn test_quoted_module_does_not_share_global_value_path() {
        let (script, declarations) = ("/@test/a.ts", "/@test/b.d.ts");
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(script))
            .with_document(DocumentFacts::script(declarations))
            .with_symbol(SymbolFacts::new(1, "x", SymbolKind::Variable).declared_at(site(script, 0)))
            .with_symbol(SymbolFacts::new(2, "'x'", SymbolKind::Module).declared_at(site(declarations, 0)))
            .with_symbol(SymbolFacts::new(3, "chrome", SymbolKind::Module).declared_at(site(declarations, 1)));

        let ids = identities(&facts, &[1, 2, 3]);
        assert_eq!(ids[0], Some(MonikerIdentity::export(":x")));
        assert_eq!(ids[1], Some(MonikerIdentity::export("x:")));
        assert_eq!(ids[2], Some(MonikerIdentity::export(":chrome")));
    }

    #[test]
    fn test_module_file_prefix_and_default_sentinel() {
        let file = "/@test/lib/util.ts";
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::module(file))
            .with_symbol(SymbolFacts::new(1, "helper", SymbolKind::Function).declared_at(site(file, 0).exported()))
            .with_symbol(
                SymbolFacts::new(2, "Main", SymbolKind::Class)
                    .with_export_form(ExportForm::Default)
                    .declared_at(site(file, 1).exported()),
            )
            .with_symbol(
                SymbolFacts::new(3, "run", SymbolKind::Method)
                    .with_parent(2)
                    .declared_at(site(file, 2).exported()),
            );

        let ids = identities(&facts, &[1, 2, 3]);
        assert_eq!(ids[0], Some(MonikerIdentity::export("lib/util:helper")));
        assert_eq!(ids[1], Some(MonikerIdentity::export("lib/util:default")));
        assert_eq!(ids[2], Some(MonikerIdentity::export("lib/util:default.run")));
    }

    #[test]
    fn test_anonymous_symbols_have_no_identity() {
        let file = "/@test/a.d.ts";
        let facts = ProgramFacts::new(ROOT)
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "TestConstructor", SymbolKind::Interface).declared_at(site(file, 0)))
            .with_symbol(
                SymbolFacts::anonymous(2, SymbolKind::Constructor)
                    .with_parent(1)
                    .declared_at(site(file, 0).exported()),
            );

        let ids = identities(&facts, &[1, 2]);
        assert_eq!(ids[0], Some(MonikerIdentity::export(":TestConstructor")));
        assert_eq!(ids[1], None);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'fs'"), "fs");
        assert_eq!(unquote("\"node:path\""), "node:path");
        assert_eq!(unquote("chrome"), "chrome");
        assert_eq!(unquote("'half"), "'half");
    }
}
