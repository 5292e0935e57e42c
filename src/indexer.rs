//! Indexer - one run from adapter facts to a finished graph
//!
//! Pipeline:
//! 1. Merge adapter symbols into canonical records
//! 2. Classify every record
//! 3. Emit documents, result sets, ranges and `next`/`contains` edges
//! 4. Emit canonical monikers in result set creation order
//! 5. Emit alias monikers and `attach` edges
//!
//! The graph is owned by the run and returned only when every step
//! succeeded.

use std::collections::{HashMap, HashSet};
use crate::adapter::{ProgramAdapter, ProgramFacts};
use crate::edge::Edge;
use crate::graph::{ElementId, Graph};
use crate::linker::{AliasLinker, CanonicalMoniker};
use crate::moniker::MonikerBuilder;
use crate::scope::{DeclarationMerger, RecordId, SymbolArena, Visibility, VisibilityClassifier};
use crate::uri::DocumentUri;
use crate::vertex::{DocumentVertex, MonikerKind, RangeTag, RangeTagType, RangeVertex, Span, Vertex};
use crate::{Error, Result};

/// Options of an indexing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerOptions {
    /// Moniker scheme written on every moniker vertex
    pub scheme: String,
    /// `languageId` of document vertices
    pub language_id: String,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            scheme: "tsc".to_string(),
            language_id: "typescript".to_string(),
        }
    }
}

pub struct Indexer {
    options: IndexerOptions,
}

/// One range to emit, with its sort key inside the document
struct Occurrence {
    span: Span,
    tag: RangeTag,
    record: RecordId,
    seq: usize,
}

/// Result sets in creation order
struct ResultSets {
    by_record: Vec<Option<ElementId>>,
    order: Vec<RecordId>,
}

impl Indexer {
    pub fn new(options: IndexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    /// Analyze the program through `adapter` and build its graph
    pub fn index(&self, adapter: &dyn ProgramAdapter) -> Result<Graph> {
        tracing::info!(adapter = adapter.name(), "Analyzing program");
        let facts = adapter.analyze()?;
        self.index_facts(&facts)
    }

    /// Build the graph for already collected facts
    pub fn index_facts(&self, facts: &ProgramFacts) -> Result<Graph> {
        validate_documents(facts)?;
        let arena = DeclarationMerger::new(facts)?.merge()?;
        let references = resolve_references(facts, &arena)?;
        let visibility = VisibilityClassifier::new(&arena).classify_all();
        let builder = MonikerBuilder::new(&arena, &facts.root);

        let mut graph = Graph::new();
        let result_sets = self.emit_documents(&mut graph, facts, &arena, &references)?;
        let canonical = self.emit_monikers(&mut graph, &arena, &visibility, &builder, &result_sets)?;

        let linker = AliasLinker::new(facts, &arena, &visibility, &builder, &canonical, &self.options.scheme);
        let alias_stats = linker.run(&mut graph)?;
        tracing::debug!("{}", alias_stats);

        tracing::info!(
            documents = facts.documents.len(),
            symbols = arena.len(),
            monikers = canonical.iter().flatten().count(),
            aliases = alias_stats.attached,
            elements = graph.last_id(),
            "Indexed program"
        );
        Ok(graph)
    }

    fn emit_documents(
        &self,
        graph: &mut Graph,
        facts: &ProgramFacts,
        arena: &SymbolArena,
        references: &[RecordId],
    ) -> Result<ResultSets> {
        let mut occurrences = collect_occurrences(facts, arena, references);
        let mut result_sets = ResultSets {
            by_record: vec![None; arena.len()],
            order: Vec::new(),
        };

        let mut documents: Vec<_> = facts.documents.iter().collect();
        documents.sort_by(|a, b| a.path.cmp(&b.path));

        for document in documents {
            let document_id = graph.emit_vertex(Vertex::Document(DocumentVertex {
                uri: DocumentUri::from_path(&document.path),
                language_id: self.options.language_id.clone(),
                kind: document.kind(),
            }));

            let mut ranges = Vec::new();
            for occurrence in occurrences.remove(document.path.as_str()).unwrap_or_default() {
                let result_set = match result_sets.by_record[occurrence.record.index()] {
                    Some(id) => id,
                    None => {
                        let id = graph.emit_vertex(Vertex::ResultSet);
                        result_sets.by_record[occurrence.record.index()] = Some(id);
                        result_sets.order.push(occurrence.record);
                        id
                    }
                };
                let range = graph.emit_vertex(Vertex::Range(RangeVertex {
                    span: occurrence.span,
                    tag: occurrence.tag,
                }));
                graph.emit_edge(Edge::next(range, result_set))?;
                ranges.push(range);
            }

            if !ranges.is_empty() {
                graph.emit_edge(Edge::contains(document_id, ranges))?;
            }
        }

        Ok(result_sets)
    }

    fn emit_monikers(
        &self,
        graph: &mut Graph,
        arena: &SymbolArena,
        visibility: &[Visibility],
        builder: &MonikerBuilder<'_>,
        result_sets: &ResultSets,
    ) -> Result<Vec<Option<CanonicalMoniker>>> {
        let mut canonical = vec![None; arena.len()];
        let mut group_identifiers = HashSet::new();

        for &id in &result_sets.order {
            let Some(result_set) = result_sets.by_record[id.index()] else {
                continue;
            };
            let Some(identity) = builder.build(id, visibility[id.index()]) else {
                tracing::debug!(
                    symbol = arena.record(id).name.as_deref().unwrap_or("<anonymous>"),
                    "No moniker for symbol without a representable path"
                );
                continue;
            };
            if identity.kind == MonikerKind::Export && !group_identifiers.insert(identity.identifier.clone()) {
                return Err(Error::MonikerCollision {
                    identifier: identity.identifier,
                });
            }

            let vertex = graph.emit_vertex(Vertex::Moniker(identity.to_vertex(&self.options.scheme)));
            graph.emit_edge(Edge::moniker(result_set, vertex))?;
            canonical[id.index()] = Some(CanonicalMoniker {
                vertex,
                identifier: identity.identifier,
            });
        }

        Ok(canonical)
    }
}

fn validate_documents(facts: &ProgramFacts) -> Result<()> {
    let mut paths = HashSet::with_capacity(facts.documents.len());
    for document in &facts.documents {
        if !paths.insert(document.path.as_str()) {
            return Err(Error::AdapterInconsistency(format!(
                "document {} reported twice", document.path
            )));
        }
    }
    Ok(())
}

/// Canonical record of every reference, in adapter order
fn resolve_references(facts: &ProgramFacts, arena: &SymbolArena) -> Result<Vec<RecordId>> {
    facts
        .references
        .iter()
        .map(|reference| {
            if facts.document(&reference.file).is_none() {
                return Err(Error::AdapterInconsistency(format!(
                    "reference `{}` in unknown document {}", reference.text, reference.file
                )));
            }
            arena.resolve(reference.target).ok_or_else(|| {
                Error::AdapterInconsistency(format!(
                    "reference `{}` in {} targets unknown symbol {}",
                    reference.text, reference.file, reference.target.0
                ))
            })
        })
        .collect()
}

/// Definitions and references grouped by file, each group in emission order:
/// by start position, definitions before references, then end position.
fn collect_occurrences<'f>(
    facts: &'f ProgramFacts,
    arena: &SymbolArena,
    references: &[RecordId],
) -> HashMap<&'f str, Vec<Occurrence>> {
    let mut by_file: HashMap<&str, Vec<Occurrence>> = HashMap::new();
    let mut seq = 0;

    for record in arena.records() {
        for site in &record.sites {
            let Some(document) = facts.document(&site.file) else {
                continue;
            };
            by_file.entry(document.path.as_str()).or_default().push(Occurrence {
                span: site.span,
                tag: RangeTag {
                    tag_type: RangeTagType::Definition,
                    text: site.text.clone(),
                    kind: site.kind.lsp_kind(),
                    full_range: site.full_span,
                },
                record: record.id,
                seq,
            });
            seq += 1;
        }
    }

    for (reference, &record) in facts.references.iter().zip(references) {
        by_file.entry(reference.file.as_str()).or_default().push(Occurrence {
            span: reference.span,
            tag: RangeTag {
                tag_type: RangeTagType::Reference,
                text: reference.text.clone(),
                kind: arena.record(record).kind.lsp_kind(),
                full_range: None,
            },
            record,
            seq,
        });
        seq += 1;
    }

    for occurrences in by_file.values_mut() {
        occurrences.sort_by_key(|o| (o.span.start, o.tag.tag_type, o.span.end, o.seq));
    }
    by_file
}
