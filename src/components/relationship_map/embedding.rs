//! Decides which leaf assets are drawn inside their owning process card
//! instead of as standalone nodes.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{EdgeKind, GraphEdge, GraphNode, NodeKind};

/// What to do with a leaf linked to more than one process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedConflictPolicy {
	/// The last qualifying edge in scan order decides.
	#[default]
	LastWins,
	/// Ambiguous leaves stay standalone.
	Standalone,
}

/// A leaf that qualified for more than one process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingConflict {
	pub leaf: String,
	/// Distinct candidate processes in scan order.
	pub processes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingMaps {
	pub data_to_process: HashMap<String, String>,
	pub secondary_to_process: HashMap<String, String>,
	pub conflicts: Vec<EmbeddingConflict>,
}

impl EmbeddingMaps {
	pub fn resolve(nodes: &[GraphNode], edges: &[GraphEdge], policy: EmbedConflictPolicy) -> Self {
		let processes: HashSet<&str> = ids_where(nodes, NodeKind::is_process);
		let data_leaves = ids_where(nodes, |k| k == NodeKind::PrimaryAsset);
		let secondary_leaves = ids_where(nodes, |k| k == NodeKind::SecondaryAsset);

		let mut conflicts = Vec::new();
		let data_to_process = scan(edges, &processes, &data_leaves, policy, &mut conflicts);
		let secondary_to_process =
			scan(edges, &processes, &secondary_leaves, policy, &mut conflicts);

		for conflict in &conflicts {
			debug!(
				"asset {} is linked to {} processes ({}); policy {:?}",
				conflict.leaf,
				conflict.processes.len(),
				conflict.processes.join(", "),
				policy
			);
		}

		Self {
			data_to_process,
			secondary_to_process,
			conflicts,
		}
	}
}

fn ids_where(nodes: &[GraphNode], pred: impl Fn(NodeKind) -> bool) -> HashSet<&str> {
	nodes
		.iter()
		.filter(|n| pred(n.kind))
		.map(|n| n.id.as_str())
		.collect()
}

/// Returns `(leaf, process)` when the edge links a leaf to a process in a
/// way that implies ownership.
fn qualifying_pair<'a>(
	edge: &'a GraphEdge,
	processes: &HashSet<&str>,
	leaves: &HashSet<&str>,
) -> Option<(&'a str, &'a str)> {
	let (src, tgt) = (edge.source.as_str(), edge.target.as_str());
	match edge.kind {
		EdgeKind::ProcessLink if processes.contains(src) && leaves.contains(tgt) => {
			Some((tgt, src))
		}
		EdgeKind::Relationship if processes.contains(src) && leaves.contains(tgt) => {
			Some((tgt, src))
		}
		EdgeKind::Relationship if processes.contains(tgt) && leaves.contains(src) => {
			Some((src, tgt))
		}
		_ => None,
	}
}

fn scan(
	edges: &[GraphEdge],
	processes: &HashSet<&str>,
	leaves: &HashSet<&str>,
	policy: EmbedConflictPolicy,
	conflicts: &mut Vec<EmbeddingConflict>,
) -> HashMap<String, String> {
	let mut map = HashMap::new();
	let mut candidates: Vec<(&str, Vec<&str>)> = Vec::new();

	for (leaf, process) in edges
		.iter()
		.filter_map(|e| qualifying_pair(e, processes, leaves))
	{
		map.insert(leaf.to_owned(), process.to_owned());
		match candidates.iter_mut().find(|(l, _)| *l == leaf) {
			Some((_, seen)) if !seen.contains(&process) => seen.push(process),
			Some(_) => {}
			None => candidates.push((leaf, vec![process])),
		}
	}

	for (leaf, seen) in candidates.into_iter().filter(|(_, s)| s.len() > 1) {
		if policy == EmbedConflictPolicy::Standalone {
			map.remove(leaf);
		}
		conflicts.push(EmbeddingConflict {
			leaf: leaf.to_owned(),
			processes: seen.into_iter().map(str::to_owned).collect(),
		});
	}
	map
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_map::types::{EdgeMetadata, NodeMetadata};

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.into(),
			kind,
			label: id.to_uppercase(),
			metadata: NodeMetadata::default(),
		}
	}

	fn edge(source: &str, target: &str, kind: EdgeKind) -> GraphEdge {
		GraphEdge {
			id: format!("{source}->{target}"),
			source: source.into(),
			target: target.into(),
			kind,
			label: None,
			metadata: EdgeMetadata::default(),
		}
	}

	/// Process that visually contains `leaf`, if any.
	fn container<'a>(maps: &'a EmbeddingMaps, leaf: &str) -> Option<&'a str> {
		maps.data_to_process
			.get(leaf)
			.or_else(|| maps.secondary_to_process.get(leaf))
			.map(String::as_str)
	}

	fn nodes() -> Vec<GraphNode> {
		vec![
			node("p1", NodeKind::ProcessL1),
			node("p2", NodeKind::ProcessL2),
			node("d1", NodeKind::PrimaryAsset),
			node("d2", NodeKind::PrimaryAsset),
			node("s1", NodeKind::SecondaryAsset),
		]
	}

	#[test]
	fn process_link_is_directional() {
		let edges = vec![
			edge("p1", "d1", EdgeKind::ProcessLink),
			edge("d2", "p1", EdgeKind::ProcessLink),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::LastWins);
		assert_eq!(maps.data_to_process.get("d1").map(String::as_str), Some("p1"));
		assert!(!maps.data_to_process.contains_key("d2"));
	}

	#[test]
	fn relationship_matches_either_direction() {
		let edges = vec![
			edge("d1", "p2", EdgeKind::Relationship),
			edge("p1", "s1", EdgeKind::Relationship),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::LastWins);
		assert_eq!(container(&maps, "d1"), Some("p2"));
		assert_eq!(container(&maps, "s1"), Some("p1"));
		assert!(maps.conflicts.is_empty());
	}

	#[test]
	fn other_edge_types_do_not_embed() {
		let edges = vec![
			edge("p1", "d1", EdgeKind::Hierarchy),
			edge("p1", "d2", EdgeKind::DataFlow),
			edge("d1", "d2", EdgeKind::Relationship),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::LastWins);
		assert!(maps.data_to_process.is_empty());
		assert!(maps.secondary_to_process.is_empty());
	}

	#[test]
	fn last_qualifying_edge_wins_and_is_reported() {
		let edges = vec![
			edge("p1", "d1", EdgeKind::ProcessLink),
			edge("p2", "d1", EdgeKind::ProcessLink),
			edge("p1", "d1", EdgeKind::Relationship),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::LastWins);
		assert_eq!(container(&maps, "d1"), Some("p1"));
		assert_eq!(
			maps.conflicts,
			vec![EmbeddingConflict {
				leaf: "d1".into(),
				processes: vec!["p1".into(), "p2".into()],
			}]
		);
	}

	#[test]
	fn standalone_policy_leaves_ambiguous_assets_unembedded() {
		let edges = vec![
			edge("p1", "d1", EdgeKind::ProcessLink),
			edge("p2", "d1", EdgeKind::ProcessLink),
			edge("p2", "d2", EdgeKind::ProcessLink),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::Standalone);
		assert_eq!(container(&maps, "d1"), None);
		assert_eq!(container(&maps, "d2"), Some("p2"));
		assert_eq!(maps.conflicts.len(), 1);
	}

	#[test]
	fn repeated_links_to_the_same_process_are_not_conflicts() {
		let edges = vec![
			edge("p1", "d1", EdgeKind::ProcessLink),
			edge("d1", "p1", EdgeKind::Relationship),
		];
		let maps = EmbeddingMaps::resolve(&nodes(), &edges, EmbedConflictPolicy::Standalone);
		assert_eq!(container(&maps, "d1"), Some("p1"));
		assert!(maps.conflicts.is_empty());
	}
}
