//! Edge types - relationships between graph vertices
//!
//! The identity graph uses four edge labels:
//! - `next`: range → resultSet
//! - `moniker`: resultSet → moniker
//! - `attach`: alias moniker → canonical moniker
//! - `contains`: document → ranges

use crate::graph::ElementId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Edge labels of the identity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLabel {
    /// Range resolves to a result set
    Next,
    /// Result set is identified by a moniker
    Moniker,
    /// Alias moniker resolves to a canonical moniker
    Attach,
    /// Document contains ranges
    Contains,
}

impl EdgeLabel {
    /// Get the string representation of the edge label
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::Next => "next",
            EdgeLabel::Moniker => "moniker",
            EdgeLabel::Attach => "attach",
            EdgeLabel::Contains => "contains",
        }
    }

    /// Get all edge labels
    pub fn all() -> &'static [EdgeLabel] {
        &[
            EdgeLabel::Next,
            EdgeLabel::Moniker,
            EdgeLabel::Attach,
            EdgeLabel::Contains,
        ]
    }

    /// Whether the edge carries many targets (`inVs`) instead of one (`inV`)
    pub fn is_one_to_many(&self) -> bool {
        matches!(self, EdgeLabel::Contains)
    }
}

impl FromStr for EdgeLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "next" => Ok(EdgeLabel::Next),
            "moniker" => Ok(EdgeLabel::Moniker),
            "attach" => Ok(EdgeLabel::Attach),
            "contains" => Ok(EdgeLabel::Contains),
            _ => Err(crate::Error::InvalidKind(format!("Unknown edge label: {}", s))),
        }
    }
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An edge between previously emitted elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub label: EdgeLabel,
    #[serde(rename = "outV")]
    pub out_v: ElementId,
    #[serde(rename = "inV", default, skip_serializing_if = "Option::is_none")]
    pub in_v: Option<ElementId>,
    #[serde(rename = "inVs", default, skip_serializing_if = "Vec::is_empty")]
    pub in_vs: Vec<ElementId>,
}

impl Edge {
    fn one_to_one(label: EdgeLabel, out_v: ElementId, in_v: ElementId) -> Self {
        Self {
            label,
            out_v,
            in_v: Some(in_v),
            in_vs: Vec::new(),
        }
    }

    /// range → resultSet
    pub fn next(range: ElementId, result_set: ElementId) -> Self {
        Self::one_to_one(EdgeLabel::Next, range, result_set)
    }

    /// resultSet → moniker
    pub fn moniker(result_set: ElementId, moniker: ElementId) -> Self {
        Self::one_to_one(EdgeLabel::Moniker, result_set, moniker)
    }

    /// alias moniker → canonical moniker
    pub fn attach(alias: ElementId, canonical: ElementId) -> Self {
        Self::one_to_one(EdgeLabel::Attach, alias, canonical)
    }

    /// document → ranges
    pub fn contains(document: ElementId, ranges: Vec<ElementId>) -> Self {
        Self {
            label: EdgeLabel::Contains,
            out_v: document,
            in_v: None,
            in_vs: ranges,
        }
    }

    /// All target ids of the edge
    pub fn targets(&self) -> Vec<ElementId> {
        self.in_v.iter().chain(self.in_vs.iter()).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_label_roundtrip() {
        for label in EdgeLabel::all() {
            let s = label.as_str();
            let parsed: EdgeLabel = s.parse().unwrap();
            assert_eq!(*label, parsed);
        }
    }

    #[test]
    fn test_attach_edge_shape() {
        let edge = Edge::attach(42, 25);
        assert_eq!(
            serde_json::to_value(&edge).unwrap(),
            json!({"label": "attach", "outV": 42, "inV": 25})
        );
        assert_eq!(edge.targets(), vec![25]);
    }

    #[test]
    fn test_contains_edge_uses_in_vs() {
        let edge = Edge::contains(1, vec![3, 6]);
        assert!(edge.label.is_one_to_many());
        assert_eq!(
            serde_json::to_value(&edge).unwrap(),
            json!({"label": "contains", "outV": 1, "inVs": [3, 6]})
        );
    }
}
