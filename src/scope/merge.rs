//! Declaration Merge Resolver
//!
//! Collapses every declaration site that denotes one logical symbol into a
//! single canonical record: overload signatures, a namespace merged with an
//! interface or value of the same name, the same global interface declared
//! in several files, and ambient module augmentations.
//!
//! Records live in an arena and each one holds its ordered list of sites.
//! Sites are ordered by (file path, position); the first one is canonical.
//! That order never depends on the order in which the adapter lists files
//! or symbols.

use std::collections::{HashMap, HashSet};
use crate::adapter::ProgramFacts;
use crate::symbol::{DeclScope, DeclarationSite, ExportForm, SymbolFacts, SymbolHandle, SymbolKind};
use crate::vertex::Span;
use crate::{Error, Result};

/// Index of a canonical record in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The declaration space a named symbol is merged in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    /// The program's global scope (script files, ambient declarations)
    Global,
    /// Top level of one module file
    Module(String),
    /// Members of a canonical container
    Container(RecordId),
    /// Never merged: private bodies and anonymous declarations
    Unique(SymbolHandle),
}

/// A declaration site after merging, with kind and text resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSite {
    pub file: String,
    pub span: Span,
    pub full_span: Option<Span>,
    pub exported: bool,
    pub kind: SymbolKind,
    pub text: String,
}

impl MergedSite {
    fn from_declaration(site: &DeclarationSite, facts: &SymbolFacts) -> Self {
        Self {
            file: site.file.clone(),
            span: site.span,
            full_span: site.full_span,
            exported: site.exported,
            kind: site.kind.unwrap_or(facts.kind),
            text: site.text.clone().or_else(|| facts.name.clone()).unwrap_or_default(),
        }
    }

    fn order_key(&self) -> (&str, Span) {
        (self.file.as_str(), self.span)
    }
}

/// One logical symbol.
///
/// `sites` is never empty; `sites[0]` is the canonical site.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub id: RecordId,
    pub name: Option<String>,
    /// Kind of the canonical site
    pub kind: SymbolKind,
    pub parent: Option<RecordId>,
    pub scope: DeclScope,
    pub key: ScopeKey,
    /// Exported from its container by at least one site
    pub exported: bool,
    pub export_form: Option<ExportForm>,
    pub sites: Vec<MergedSite>,
    /// Named members, ordered by their canonical site
    pub children: Vec<RecordId>,
    /// Adapter handles merged into this record
    pub handles: Vec<SymbolHandle>,
}

impl CanonicalRecord {
    pub fn canonical_site(&self) -> &MergedSite {
        &self.sites[0]
    }

    /// Top-level `declare module` block
    pub fn is_ambient_module(&self) -> bool {
        self.kind == SymbolKind::Module && self.parent.is_none()
    }
}

/// Arena of canonical records
#[derive(Debug, Default)]
pub struct SymbolArena {
    records: Vec<CanonicalRecord>,
    by_handle: HashMap<SymbolHandle, RecordId>,
}

impl SymbolArena {
    pub fn record(&self, id: RecordId) -> &CanonicalRecord {
        &self.records[id.index()]
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Canonical record an adapter handle was merged into
    pub fn resolve(&self, handle: SymbolHandle) -> Option<RecordId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get scope chain from a record up to its top-level container
    pub fn scope_chain(&self, id: RecordId) -> Vec<RecordId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.record(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }
}

/// Builds the arena from adapter facts
pub struct DeclarationMerger<'a> {
    symbols: HashMap<SymbolHandle, &'a SymbolFacts>,
    module_files: HashSet<&'a str>,
    order: Vec<SymbolHandle>,
    arena: SymbolArena,
    by_key: HashMap<(ScopeKey, String), RecordId>,
}

impl<'a> DeclarationMerger<'a> {
    /// Validate the facts and prepare a merger.
    ///
    /// Duplicate handles, symbols without declarations, and sites or parents
    /// pointing at unknown documents or symbols are adapter inconsistencies.
    pub fn new(facts: &'a ProgramFacts) -> Result<Self> {
        let documents: HashSet<&str> = facts.documents.iter().map(|d| d.path.as_str()).collect();
        let module_files = facts
            .documents
            .iter()
            .filter(|d| d.module)
            .map(|d| d.path.as_str())
            .collect();

        let mut symbols = HashMap::with_capacity(facts.symbols.len());
        for symbol in &facts.symbols {
            if symbols.insert(symbol.handle, symbol).is_some() {
                return Err(Error::AdapterInconsistency(format!(
                    "symbol handle {} reported twice", symbol.handle.0
                )));
            }
            if symbol.declarations.is_empty() {
                return Err(Error::AdapterInconsistency(format!(
                    "symbol {} ({}) has no declaration sites",
                    symbol.handle.0,
                    symbol.name.as_deref().unwrap_or("<anonymous>")
                )));
            }
            if let Some(site) = symbol.declarations.iter().find(|s| !documents.contains(s.file.as_str())) {
                return Err(Error::AdapterInconsistency(format!(
                    "symbol {} is declared in unknown document {}", symbol.handle.0, site.file
                )));
            }
        }
        for symbol in &facts.symbols {
            if let Some(parent) = symbol.parent.filter(|p| !symbols.contains_key(p)) {
                return Err(Error::AdapterInconsistency(format!(
                    "symbol {} has unknown parent {}", symbol.handle.0, parent.0
                )));
            }
        }

        // Process in site order so record ids do not depend on adapter order
        let mut order: Vec<(&SymbolFacts, (&str, Span))> = facts
            .symbols
            .iter()
            .filter_map(|s| {
                s.declarations
                    .iter()
                    .map(|site| (site.file.as_str(), site.span))
                    .min()
                    .map(|key| (s, key))
            })
            .collect();
        order.sort_by(|(a, a_key), (b, b_key)| a_key.cmp(b_key).then(a.handle.cmp(&b.handle)));

        Ok(Self {
            symbols,
            module_files,
            order: order.into_iter().map(|(s, _)| s.handle).collect(),
            arena: SymbolArena::default(),
            by_key: HashMap::new(),
        })
    }

    /// Merge all symbols into canonical records
    pub fn merge(mut self) -> Result<SymbolArena> {
        let order = std::mem::take(&mut self.order);
        let mut visiting = Vec::new();
        for handle in order {
            self.resolve(handle, &mut visiting)?;
        }

        self.finalize();
        tracing::debug!(
            symbols = self.symbols.len(),
            records = self.arena.len(),
            "Merged declarations"
        );
        Ok(self.arena)
    }

    fn resolve(&mut self, handle: SymbolHandle, visiting: &mut Vec<SymbolHandle>) -> Result<RecordId> {
        if let Some(id) = self.arena.resolve(handle) {
            return Ok(id);
        }
        if visiting.contains(&handle) {
            return Err(Error::AdapterInconsistency(format!(
                "scope chain of symbol {} is cyclic", handle.0
            )));
        }
        let facts: &'a SymbolFacts = self.symbols.get(&handle).copied().ok_or_else(|| {
            Error::AdapterInconsistency(format!("unknown symbol {}", handle.0))
        })?;

        visiting.push(handle);
        let parent = match facts.parent {
            Some(parent) => Some(self.resolve(parent, visiting)?),
            None => None,
        };
        visiting.pop();

        let key = self.scope_key(facts, parent);
        let existing = match (&key, &facts.name) {
            (ScopeKey::Unique(_), _) | (_, None) => None,
            (key, Some(name)) => self.by_key.get(&(key.clone(), name.clone())).copied(),
        };

        let id = match existing {
            Some(id) => {
                self.merge_into(id, facts);
                id
            }
            None => self.create(facts, parent, key),
        };
        self.arena.by_handle.insert(handle, id);
        Ok(id)
    }

    fn scope_key(&self, facts: &SymbolFacts, parent: Option<RecordId>) -> ScopeKey {
        if facts.scope == DeclScope::Local || facts.name.is_none() {
            return ScopeKey::Unique(facts.handle);
        }
        if let Some(parent) = parent {
            return ScopeKey::Container(parent);
        }
        if facts.kind == SymbolKind::Module || facts.scope == DeclScope::Global {
            return ScopeKey::Global;
        }

        let file = facts
            .declarations
            .iter()
            .map(|site| site.file.as_str())
            .min()
            .unwrap_or_default();
        if self.module_files.contains(file) {
            ScopeKey::Module(file.to_string())
        } else {
            ScopeKey::Global
        }
    }

    fn create(&mut self, facts: &SymbolFacts, parent: Option<RecordId>, key: ScopeKey) -> RecordId {
        let id = RecordId(self.arena.records.len() as u32);
        let sites: Vec<MergedSite> = facts
            .declarations
            .iter()
            .map(|site| MergedSite::from_declaration(site, facts))
            .collect();

        if let (Some(name), false) = (&facts.name, matches!(key, ScopeKey::Unique(_))) {
            self.by_key.insert((key.clone(), name.clone()), id);
        }
        if let Some(parent) = parent {
            self.arena.records[parent.index()].children.push(id);
        }

        self.arena.records.push(CanonicalRecord {
            id,
            name: facts.name.clone(),
            kind: facts.kind,
            parent,
            scope: facts.scope,
            key,
            exported: facts.is_exported(),
            export_form: facts.export_form,
            sites,
            children: Vec::new(),
            handles: vec![facts.handle],
        });
        id
    }

    fn merge_into(&mut self, id: RecordId, facts: &SymbolFacts) {
        let record = &mut self.arena.records[id.index()];
        tracing::debug!(
            name = record.name.as_deref().unwrap_or_default(),
            handle = facts.handle.0,
            "Merging declaration into existing symbol"
        );

        record.sites.extend(facts.declarations.iter().map(|site| MergedSite::from_declaration(site, facts)));
        // The more visible classification wins
        record.exported |= facts.is_exported();
        match (record.export_form, facts.export_form) {
            (None, form) => record.export_form = form,
            (Some(kept), Some(other)) if kept != other => {
                tracing::debug!(?kept, ?other, "Conflicting export forms, keeping the first");
            }
            _ => {}
        }
        record.handles.push(facts.handle);
    }

    fn finalize(&mut self) {
        for record in &mut self.arena.records {
            record.sites.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
            record.sites.dedup_by(|a, b| a.file == b.file && a.span == b.span);
            record.kind = record.sites[0].kind;
        }

        let keys: Vec<(String, Span)> = self
            .arena
            .records
            .iter()
            .map(|r| (r.sites[0].file.clone(), r.sites[0].span))
            .collect();
        for record in &mut self.arena.records {
            record.children.sort_by(|a, b| keys[a.index()].cmp(&keys[b.index()]));
        }
    }
}
