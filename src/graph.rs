//! Graph emitter - append-only, strictly ordered element store
//!
//! Every vertex and edge receives the next integer id in emission order,
//! starting from 1. Elements are never mutated or removed once emitted, so
//! replaying the same input reproduces the same ids.

use std::collections::BTreeMap;
use crate::edge::{Edge, EdgeLabel};
use crate::vertex::Vertex;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sequential element identifier
pub type ElementId = u64;

/// Payload of an element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementData {
    Vertex(Vertex),
    Edge(Edge),
}

impl ElementData {
    pub fn label(&self) -> &'static str {
        match self {
            ElementData::Vertex(vertex) => vertex.label(),
            ElementData::Edge(edge) => edge.label.as_str(),
        }
    }
}

/// An emitted element: its id plus its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub data: ElementData,
}

impl Element {
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match &self.data {
            ElementData::Vertex(vertex) => Some(vertex),
            ElementData::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.data {
            ElementData::Edge(edge) => Some(edge),
            ElementData::Vertex(_) => None,
        }
    }
}

/// The element store.
///
/// Owned by exactly one indexing run; a new run starts from a new `Graph`.
#[derive(Debug, Default)]
pub struct Graph {
    /// Elements in emission order; element `id` lives at index `id - 1`
    elements: Vec<Element>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a vertex or an edge and return its id.
    ///
    /// Edges may only reference elements that were emitted before them.
    pub fn emit(&mut self, data: ElementData) -> Result<ElementId> {
        let id = self.last_id() + 1;

        if let ElementData::Edge(edge) = &data {
            if edge.in_v.is_none() && edge.in_vs.is_empty() {
                return Err(Error::EmissionOrder(format!(
                    "{} edge {} has no target", edge.label, id
                )));
            }
            for endpoint in std::iter::once(edge.out_v).chain(edge.targets()) {
                if endpoint == 0 || endpoint >= id {
                    return Err(Error::EmissionOrder(format!(
                        "{} edge {} references element {} which was not emitted before it",
                        edge.label, id, endpoint
                    )));
                }
            }
        }

        self.elements.push(Element { id, data });
        Ok(id)
    }

    /// Emit a vertex and return its id
    pub fn emit_vertex(&mut self, vertex: Vertex) -> ElementId {
        let id = self.last_id() + 1;
        self.elements.push(Element { id, data: ElementData::Vertex(vertex) });
        id
    }

    /// Emit an edge and return its id
    pub fn emit_edge(&mut self, edge: Edge) -> Result<ElementId> {
        self.emit(ElementData::Edge(edge))
    }

    /// Get an element by id
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.elements.get(index)
    }

    /// The highest id emitted so far (0 for an empty graph)
    pub fn last_id(&self) -> ElementId {
        self.elements.len() as ElementId
    }

    /// All elements in emission order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Consume the graph, returning its elements in emission order
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over edges with a given label
    pub fn edges_by_label(&self, label: EdgeLabel) -> impl Iterator<Item = (ElementId, &Edge)> {
        self.elements.iter().filter_map(move |element| {
            element.as_edge().filter(|edge| edge.label == label).map(|edge| (element.id, edge))
        })
    }

    /// Iterate over moniker vertices
    pub fn monikers(&self) -> impl Iterator<Item = (ElementId, &crate::vertex::MonikerVertex)> {
        self.elements.iter().filter_map(|element| {
            element.as_vertex().and_then(Vertex::as_moniker).map(|moniker| (element.id, moniker))
        })
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for element in &self.elements {
            let bucket = match element.data {
                ElementData::Vertex(_) => &mut stats.vertices,
                ElementData::Edge(_) => &mut stats.edges,
            };
            *bucket.entry(element.data.label()).or_default() += 1;
        }
        stats.last_id = self.last_id();
        stats
    }
}

/// Statistics about an emitted graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub vertices: BTreeMap<&'static str, usize>,
    pub edges: BTreeMap<&'static str, usize>,
    pub last_id: ElementId,
}

impl GraphStats {
    pub fn vertex_count(&self, label: &str) -> usize {
        self.vertices.get(label).copied().unwrap_or(0)
    }

    pub fn edge_count(&self, label: &str) -> usize {
        self.edges.get(label).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics:")?;
        writeln!(f, "  Elements: {}", self.last_id)?;
        for (label, count) in &self.vertices {
            writeln!(f, "  {} vertices: {}", label, count)?;
        }
        for (label, count) in &self.edges {
            writeln!(f, "  {} edges: {}", label, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::{MonikerKind, MonikerVertex, UniquenessLevel};
    use serde_json::json;

    fn moniker(identifier: &str) -> Vertex {
        Vertex::Moniker(MonikerVertex {
            scheme: "tsc".to_string(),
            identifier: identifier.to_string(),
            unique: UniquenessLevel::Group,
            kind: MonikerKind::Export,
        })
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut graph = Graph::new();
        assert_eq!(graph.last_id(), 0);

        let result_set = graph.emit_vertex(Vertex::ResultSet);
        let moniker_id = graph.emit_vertex(moniker(":x"));
        let edge = graph.emit_edge(Edge::moniker(result_set, moniker_id)).unwrap();

        assert_eq!((result_set, moniker_id, edge), (1, 2, 3));
        assert_eq!(graph.last_id(), 3);
        assert_eq!(graph.get(2).unwrap().id, 2);
        assert!(graph.get(0).is_none());
        assert!(graph.get(4).is_none());
    }

    #[test]
    fn test_edge_must_reference_earlier_elements() {
        let mut graph = Graph::new();
        let alias = graph.emit_vertex(moniker("a:y"));

        let err = graph.emit_edge(Edge::attach(alias, 5)).unwrap_err();
        assert!(matches!(err, Error::EmissionOrder(_)));
        // A rejected edge does not consume an id
        assert_eq!(graph.last_id(), 1);
    }

    #[test]
    fn test_element_serialization() {
        let mut graph = Graph::new();
        let result_set = graph.emit_vertex(Vertex::ResultSet);
        let moniker_id = graph.emit_vertex(moniker(":x"));
        graph.emit_edge(Edge::moniker(result_set, moniker_id)).unwrap();

        let values: Vec<_> = graph
            .elements()
            .iter()
            .map(|element| serde_json::to_value(element).unwrap())
            .collect();

        assert_eq!(values[0], json!({"id": 1, "type": "vertex", "label": "resultSet"}));
        assert_eq!(
            values[1],
            json!({"id": 2, "type": "vertex", "label": "moniker", "scheme": "tsc", "identifier": ":x", "unique": "group", "kind": "export"})
        );
        assert_eq!(values[2], json!({"id": 3, "type": "edge", "label": "moniker", "outV": 1, "inV": 2}));

        let parsed: Element = serde_json::from_value(values[1].clone()).unwrap();
        assert_eq!(&parsed, graph.get(2).unwrap());
    }

    #[test]
    fn test_stats() {
        let mut graph = Graph::new();
        let result_set = graph.emit_vertex(Vertex::ResultSet);
        let moniker_id = graph.emit_vertex(moniker(":x"));
        graph.emit_edge(Edge::moniker(result_set, moniker_id)).unwrap();

        let stats = graph.stats();
        assert_eq!(stats.vertex_count("moniker"), 1);
        assert_eq!(stats.vertex_count("resultSet"), 1);
        assert_eq!(stats.edge_count("moniker"), 1);
        assert_eq!(stats.edge_count("attach"), 0);
        assert_eq!(stats.last_id, 3);
    }
}
