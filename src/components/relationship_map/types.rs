//! Wire-level graph snapshot: typed nodes and typed relationship edges.

use serde::{Deserialize, Serialize};

use super::source::GraphError;

/// Visual and layout tier of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
	#[serde(rename = "process-l1")]
	ProcessL1,
	#[serde(rename = "process-l2")]
	ProcessL2,
	#[serde(rename = "process-l3")]
	ProcessL3,
	#[serde(rename = "primary-asset")]
	PrimaryAsset,
	#[serde(rename = "secondary-asset")]
	SecondaryAsset,
}

impl NodeKind {
	pub fn is_process(self) -> bool {
		matches!(self, Self::ProcessL1 | Self::ProcessL2 | Self::ProcessL3)
	}

	/// Layout tier, top to bottom.
	pub fn tier(self) -> usize {
		match self {
			Self::ProcessL1 => 0,
			Self::ProcessL2 => 1,
			Self::ProcessL3 => 2,
			Self::PrimaryAsset => 3,
			Self::SecondaryAsset => 4,
		}
	}

	pub fn caption(self) -> &'static str {
		match self {
			Self::ProcessL1 => "L1 Process",
			Self::ProcessL2 => "L2 Process",
			Self::ProcessL3 => "L3 Process",
			Self::PrimaryAsset => "Data Asset",
			Self::SecondaryAsset => "Secondary Asset",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetadata {
	pub asset_id: Option<String>,
	pub criticality: Option<String>,
	pub secondary_type: Option<String>,
	pub business_unit_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	pub label: String,
	#[serde(default)]
	pub metadata: NodeMetadata,
}

/// Semantic type of a relationship edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
	Hierarchy,
	SecondaryLink,
	ProcessLink,
	Relationship,
	DataFlow,
}

impl EdgeKind {
	/// Edges that imply a parent/child relation for layout and collapse.
	pub fn is_structural(self) -> bool {
		matches!(self, Self::Hierarchy | Self::SecondaryLink)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeMetadata {
	pub link_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeKind,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub metadata: EdgeMetadata,
}

impl GraphEdge {
	pub fn is_tagged(&self) -> bool {
		self.metadata
			.link_type
			.as_deref()
			.is_some_and(|t| t.eq_ignore_ascii_case("TAGGED"))
	}
}

/// One snapshot as returned by the data layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_wire_tags() {
		let data = GraphData::from_json(
			r#"{
				"nodes": [
					{"id": "p1", "type": "process-l1", "label": "Operations"},
					{"id": "a1", "type": "primary-asset", "label": "Ledger",
					 "metadata": {"assetId": "A-1", "criticality": "high", "businessUnitId": "bu-1"}}
				],
				"edges": [
					{"id": "e1", "source": "p1", "target": "a1", "type": "process-link",
					 "metadata": {"linkType": "TAGGED"}}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(data.nodes[0].kind, NodeKind::ProcessL1);
		assert_eq!(data.nodes[1].metadata.asset_id.as_deref(), Some("A-1"));
		assert_eq!(data.nodes[1].metadata.business_unit_id.as_deref(), Some("bu-1"));
		assert_eq!(data.edges[0].kind, EdgeKind::ProcessLink);
		assert!(data.edges[0].is_tagged());
		assert_eq!((data.edges[0].source.as_str(), data.edges[0].target.as_str()), ("p1", "a1"));
	}

	#[test]
	fn rejects_unknown_node_type() {
		let err = GraphData::from_json(r#"{"nodes":[{"id":"x","type":"robot","label":"x"}]}"#);
		assert!(matches!(err, Err(GraphError::Parse(_))));
	}

	#[test]
	fn tiers_follow_kind_order() {
		let kinds = [
			NodeKind::ProcessL1,
			NodeKind::ProcessL2,
			NodeKind::ProcessL3,
			NodeKind::PrimaryAsset,
			NodeKind::SecondaryAsset,
		];
		let tiers: Vec<usize> = kinds.iter().map(|k| k.tier()).collect();
		assert_eq!(tiers, vec![0, 1, 2, 3, 4]);
		assert!(NodeKind::ProcessL3.is_process());
		assert!(!NodeKind::PrimaryAsset.is_process());
		assert!(EdgeKind::SecondaryLink.is_structural());
		assert!(!EdgeKind::DataFlow.is_structural());
	}
}
