//! Data-access seam. The map never queries storage itself; it is handed a
//! snapshot by a [`GraphSource`].

use std::collections::HashSet;

use thiserror::Error;

use super::types::GraphData;

#[derive(Debug, Error)]
pub enum GraphError {
	#[error("failed to parse graph snapshot: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("unknown business unit `{0}`")]
	UnknownBusinessUnit(String),
}

/// Something that can produce a fresh graph snapshot, optionally narrowed to
/// one business unit (`None` means all of them).
pub trait GraphSource {
	fn fetch(&self, business_unit: Option<&str>) -> Result<GraphData, GraphError>;
}

/// In-memory snapshot, e.g. bundled demo data.
#[derive(Clone, Debug, Default)]
pub struct StaticGraphSource {
	data: GraphData,
}

impl StaticGraphSource {
	pub fn new(data: GraphData) -> Self {
		Self { data }
	}

	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		GraphData::from_json(json).map(Self::new)
	}

	/// Business units referenced by the snapshot, in first-seen order.
	pub fn business_units(&self) -> Vec<String> {
		let mut seen = HashSet::new();
		self.data
			.nodes
			.iter()
			.filter_map(|n| n.metadata.business_unit_id.as_deref())
			.filter(|bu| seen.insert(*bu))
			.map(str::to_owned)
			.collect()
	}
}

impl GraphSource for StaticGraphSource {
	fn fetch(&self, business_unit: Option<&str>) -> Result<GraphData, GraphError> {
		let Some(unit) = business_unit else {
			return Ok(self.data.clone());
		};
		if !self.business_units().iter().any(|bu| bu == unit) {
			return Err(GraphError::UnknownBusinessUnit(unit.to_owned()));
		}

		let nodes: Vec<_> = self
			.data
			.nodes
			.iter()
			.filter(|n| n.metadata.business_unit_id.as_deref() == Some(unit))
			.cloned()
			.collect();
		let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let edges = self
			.data
			.edges
			.iter()
			.filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
			.cloned()
			.collect();

		Ok(GraphData { nodes, edges })
	}
}
