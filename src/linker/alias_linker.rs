//! Alias Linker
//!
//! Export specifiers, `export =` and `export default` re-publish a symbol
//! under another path. The linker runs after canonical monikers exist:
//! phase 1 resolves every alias, phase 2 emits one export moniker per
//! alias path and attaches it to the canonical moniker of its target.
//!
//! An alias declared inside a container that is not globally reachable
//! only becomes public when another alias reaches that container.

use crate::adapter::{AliasFacts, ProgramFacts};
use crate::edge::Edge;
use crate::graph::{ElementId, Graph};
use crate::moniker::{ExportPath, MonikerBuilder, MonikerIdentity};
use crate::scope::{RecordId, SymbolArena, Visibility};
use crate::vertex::Vertex;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// The moniker vertex bound to a record's result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMoniker {
    pub vertex: ElementId,
    pub identifier: String,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AliasLinkerStats {
    pub total: usize,
    pub linked: usize,
    pub skipped: usize,
    pub attached: usize,
    pub duplicates: usize,
}

impl fmt::Display for AliasLinkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alias Linker Stats:")?;
        writeln!(f, "  Total Aliases: {}", self.total)?;
        writeln!(f, "  ✅ Linked: {}", self.linked)?;
        writeln!(f, "  🙈 Hidden Container: {}", self.skipped)?;
        writeln!(f, "  🔗 Attach Edges: {}", self.attached)?;
        writeln!(f, "  ♻️  Duplicate Identifiers: {}", self.duplicates)
    }
}

/// An alias whose container is reachable, resolved to its full path
#[derive(Debug, Clone)]
struct AliasPlan {
    path: ExportPath,
    target: RecordId,
}

/// An alias declared inside a container, followed whenever a path
/// reaches that container
#[derive(Debug, Clone)]
struct MemberAlias {
    order: usize,
    name: String,
    target: RecordId,
}

/// State of one phase 2 walk
#[derive(Default)]
struct LinkState {
    seen: HashSet<String>,
    reached: HashSet<usize>,
    visiting: Vec<RecordId>,
}

/// Second pipeline phase: alias monikers and `attach` edges.
///
/// Runs after every canonical moniker has been emitted, so attach edges
/// always point backwards.
pub struct AliasLinker<'a> {
    facts: &'a ProgramFacts,
    arena: &'a SymbolArena,
    visibility: &'a [Visibility],
    builder: &'a MonikerBuilder<'a>,
    canonical: &'a [Option<CanonicalMoniker>],
    scheme: &'a str,
}

impl<'a> AliasLinker<'a> {
    pub fn new(
        facts: &'a ProgramFacts,
        arena: &'a SymbolArena,
        visibility: &'a [Visibility],
        builder: &'a MonikerBuilder<'a>,
        canonical: &'a [Option<CanonicalMoniker>],
        scheme: &'a str,
    ) -> Self {
        Self {
            facts,
            arena,
            visibility,
            builder,
            canonical,
            scheme,
        }
    }

    pub fn run(&self, graph: &mut Graph) -> Result<AliasLinkerStats> {
        let mut stats = AliasLinkerStats {
            total: self.facts.aliases.len(),
            ..AliasLinkerStats::default()
        };

        // --- Phase 1: resolve every alias before emitting anything ---
        let aliases = self.ordered_aliases();
        let mut plans = Vec::with_capacity(aliases.len());
        let mut members: HashMap<RecordId, Vec<MemberAlias>> = HashMap::new();
        let mut pending = Vec::new();
        for (order, alias) in aliases.iter().enumerate() {
            let target = self.resolve_target(alias)?;
            let container = self.resolve_container(alias)?;
            if let Some(container) = container {
                members.entry(container).or_default().push(MemberAlias {
                    order,
                    name: alias.name.clone(),
                    target,
                });
            }
            match self.root_path(alias, container)? {
                Some(base) => plans.push(AliasPlan {
                    path: base.child(alias.name.clone()),
                    target,
                }),
                None => pending.push(order),
            }
        }

        // --- Phase 2: emit alias monikers ---
        let mut state = LinkState {
            seen: self
                .canonical
                .iter()
                .flatten()
                .map(|moniker| moniker.identifier.clone())
                .collect(),
            ..LinkState::default()
        };
        stats.linked = plans.len();
        for plan in plans {
            self.link(graph, plan.target, plan.path, &members, &mut state, &mut stats)?;
        }

        for order in pending {
            if state.reached.contains(&order) {
                stats.linked += 1;
            } else {
                let alias = aliases[order];
                tracing::warn!(
                    alias = %alias.name,
                    file = %alias.file,
                    "Skipping alias exported from a hidden container"
                );
                stats.skipped += 1;
            }
        }

        Ok(stats)
    }

    /// Aliases by file, then position, then adapter order
    fn ordered_aliases(&self) -> Vec<&'a AliasFacts> {
        let mut aliases: Vec<(usize, &AliasFacts)> = self.facts.aliases.iter().enumerate().collect();
        aliases.sort_by(|(a_index, a), (b_index, b)| {
            (a.file.as_str(), a.span.start, a_index).cmp(&(b.file.as_str(), b.span.start, b_index))
        });
        aliases.into_iter().map(|(_, alias)| alias).collect()
    }

    fn resolve_target(&self, alias: &AliasFacts) -> Result<RecordId> {
        self.arena.resolve(alias.target).ok_or_else(|| {
            Error::AdapterInconsistency(format!(
                "alias `{}` in {} targets unknown symbol {}",
                alias.name, alias.file, alias.target.0
            ))
        })
    }

    fn resolve_container(&self, alias: &AliasFacts) -> Result<Option<RecordId>> {
        let Some(handle) = alias.container else {
            return Ok(None);
        };
        let container = self.arena.resolve(handle).ok_or_else(|| {
            Error::AdapterInconsistency(format!(
                "alias `{}` in {} has unknown container {}",
                alias.name, alias.file, handle.0
            ))
        })?;
        Ok(Some(container))
    }

    /// Base path of an alias that is public on its own: a file-level alias,
    /// or one inside a globally exported container
    fn root_path(&self, alias: &AliasFacts, container: Option<RecordId>) -> Result<Option<ExportPath>> {
        match container {
            None => {
                let document = self.facts.document(&alias.file).ok_or_else(|| {
                    Error::AdapterInconsistency(format!(
                        "alias `{}` is declared in unknown document {}",
                        alias.name, alias.file
                    ))
                })?;
                Ok(Some(self.builder.file_path(&alias.file, document.module)))
            }
            Some(container) if self.visibility[container.index()] == Visibility::GlobalExport => {
                Ok(self.builder.member_path(container))
            }
            Some(_) => Ok(None),
        }
    }

    /// Attach `path` to `id`, then walk the exported members and member
    /// aliases below it
    fn link(
        &self,
        graph: &mut Graph,
        id: RecordId,
        path: ExportPath,
        members: &HashMap<RecordId, Vec<MemberAlias>>,
        state: &mut LinkState,
        stats: &mut AliasLinkerStats,
    ) -> Result<()> {
        if state.visiting.contains(&id) {
            tracing::debug!(identifier = %path.identifier(), "Alias cycle");
            return Ok(());
        }

        if let Some(canonical) = &self.canonical[id.index()] {
            let identifier = path.identifier();
            if identifier == canonical.identifier || !state.seen.insert(identifier.clone()) {
                tracing::debug!(identifier = %identifier, "Alias identifier already emitted");
                stats.duplicates += 1;
            } else {
                let vertex = graph.emit_vertex(Vertex::Moniker(
                    MonikerIdentity::export(identifier).to_vertex(self.scheme),
                ));
                graph.emit_edge(Edge::attach(vertex, canonical.vertex))?;
                stats.attached += 1;
            }
        }

        state.visiting.push(id);
        let record = self.arena.record(id);
        for child in &record.children {
            let member = self.arena.record(*child);
            if !member.exported || self.visibility[child.index()] == Visibility::Local {
                continue;
            }
            let Some(name) = &member.name else {
                continue;
            };
            self.link(graph, *child, path.child(name.clone()), members, state, stats)?;
        }
        for alias in members.get(&id).into_iter().flatten() {
            state.reached.insert(alias.order);
            self.link(graph, alias.target, path.child(alias.name.clone()), members, state, stats)?;
        }
        state.visiting.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::DocumentFacts;
    use crate::edge::EdgeLabel;
    use crate::indexer::{Indexer, IndexerOptions};
    use crate::symbol::{DeclarationSite, SymbolFacts, SymbolKind};
    use crate::vertex::Span;

    fn index(facts: &ProgramFacts) -> Graph {
        Indexer::new(IndexerOptions::default()).index_facts(facts).unwrap()
    }

    fn identifiers(graph: &Graph) -> Vec<String> {
        graph.monikers().map(|(_, m)| m.identifier.clone()).collect()
    }

    /// `namespace Outer { namespace Inner { export const v } ; export import Alias = Inner }`
    fn namespace_alias(outer_exported: bool) -> ProgramFacts {
        let file = "/@test/a.ts";
        let outer = DeclarationSite::new(file, Span::on_line(0, 10, 15));
        ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "Outer", SymbolKind::Namespace).declared_at(outer))
            .with_symbol(
                SymbolFacts::new(2, "Inner", SymbolKind::Namespace)
                    .with_parent(1)
                    .declared_at(DeclarationSite::new(file, Span::on_line(1, 14, 19))),
            )
            .with_symbol(
                SymbolFacts::new(3, "v", SymbolKind::Constant)
                    .with_parent(2)
                    .declared_at(DeclarationSite::new(file, Span::on_line(2, 21, 22)).exported()),
            )
            .with_symbol({
                let mut hidden = SymbolFacts::new(4, "Hidden", SymbolKind::Namespace)
                    .declared_at(DeclarationSite::new(file, Span::on_line(4, 10, 16)));
                if !outer_exported {
                    hidden = hidden.with_scope(crate::symbol::DeclScope::Local);
                }
                hidden
            })
            .with_alias(AliasFacts::export_specifier(
                file,
                Span::on_line(3, 18, 23),
                Some(if outer_exported { 1 } else { 4 }),
                "Alias",
                2,
            ))
    }

    #[test]
    fn test_alias_walks_exported_members() {
        let graph = index(&namespace_alias(true));
        let ids = identifiers(&graph);
        assert!(ids.contains(&":Outer.Alias".to_string()));
        assert!(ids.contains(&":Outer.Alias.v".to_string()));
        assert_eq!(graph.edges_by_label(EdgeLabel::Attach).count(), 2);
    }

    #[test]
    fn test_alias_in_hidden_container_is_skipped() {
        let graph = index(&namespace_alias(false));
        assert_eq!(graph.edges_by_label(EdgeLabel::Attach).count(), 0);
        assert!(!identifiers(&graph).iter().any(|id| id.contains("Alias")));
    }

    /// `declare namespace chrome { namespace _d { namespace _inner { export const v } export { _inner as inner } } export { _d as debugger } }`
    fn nested_alias_chain() -> ProgramFacts {
        let file = "/@test/chrome.d.ts";
        let site = |line, start, end| DeclarationSite::new(file, Span::on_line(line, start, end));
        ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script(file))
            .with_symbol(SymbolFacts::new(1, "chrome", SymbolKind::Module).declared_at(site(0, 18, 24)))
            .with_symbol(
                SymbolFacts::new(2, "_d", SymbolKind::Namespace)
                    .with_parent(1)
                    .declared_at(site(1, 14, 16)),
            )
            .with_symbol(
                SymbolFacts::new(3, "_inner", SymbolKind::Namespace)
                    .with_parent(2)
                    .declared_at(site(2, 18, 24)),
            )
            .with_symbol(
                SymbolFacts::new(4, "v", SymbolKind::Constant)
                    .with_parent(3)
                    .declared_at(site(3, 25, 26).exported()),
            )
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(5, 22, 27), Some(2), "inner", 3))
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(7, 18, 26), Some(1), "debugger", 2))
    }

    #[test]
    fn test_alias_inside_aliased_container_is_followed() {
        let graph = index(&nested_alias_chain());
        let ids = identifiers(&graph);
        let aliases: Vec<&str> = ids.iter().filter(|id| id.starts_with("chrome:")).map(String::as_str).collect();
        assert_eq!(aliases, vec!["chrome:debugger", "chrome:debugger.inner", "chrome:debugger.inner.v"]);
        assert_eq!(graph.edges_by_label(EdgeLabel::Attach).count(), 3);
    }

    #[test]
    fn test_self_referencing_alias_terminates() {
        let file = "/@test/a.d.ts";
        let facts = ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script(file))
            .with_symbol(
                SymbolFacts::new(1, "chrome", SymbolKind::Module)
                    .declared_at(DeclarationSite::new(file, Span::on_line(0, 18, 24))),
            )
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(1, 18, 22), Some(1), "self", 1));

        let graph = index(&facts);
        assert_eq!(identifiers(&graph), vec![":chrome", "chrome:self"]);
        assert_eq!(graph.edges_by_label(EdgeLabel::Attach).count(), 1);
    }

    #[test]
    fn test_alias_equal_to_canonical_is_not_repeated() {
        let file = "/@test/a.ts";
        let facts = ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script(file))
            .with_symbol(
                SymbolFacts::new(1, "x", SymbolKind::Variable)
                    .declared_at(DeclarationSite::new(file, Span::on_line(0, 4, 5))),
            )
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(1, 9, 10), None, "x", 1))
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(2, 9, 10), None, "y", 1))
            .with_alias(AliasFacts::export_specifier(file, Span::on_line(3, 9, 10), None, "y", 1));

        let graph = index(&facts);
        assert_eq!(identifiers(&graph), vec![":x", ":y"]);
        assert_eq!(graph.edges_by_label(EdgeLabel::Attach).count(), 1);
    }

    #[test]
    fn test_unknown_alias_target_is_inconsistent() {
        let file = "/@test/a.ts";
        let facts = ProgramFacts::new("/@test")
            .with_document(DocumentFacts::script(file))
            .with_alias(AliasFacts::export_default(file, Span::on_line(0, 0, 1), None, 9));

        let err = Indexer::new(IndexerOptions::default()).index_facts(&facts).unwrap_err();
        assert!(matches!(err, Error::AdapterInconsistency(_)));
    }

    #[test]
    fn test_stats_display() {
        let stats = AliasLinkerStats {
            total: 3,
            linked: 2,
            skipped: 1,
            attached: 4,
            duplicates: 0,
        };
        let text = stats.to_string();
        assert!(text.contains("Total Aliases: 3"));
        assert!(text.contains("Attach Edges: 4"));
    }
}
