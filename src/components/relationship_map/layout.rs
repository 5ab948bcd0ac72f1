//! Layered top-down layout.
//!
//! Five fixed tiers (L1, L2, L3, primary assets, secondary assets), one row
//! each. Children are centred under the midpoint of their placed parent;
//! nodes whose parent was not placed fall to an orphan row at the right end
//! of their tier. There is no overlap avoidance beyond the fixed spacing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::hierarchy::HierarchyIndex;
use super::types::GraphNode;

const TIER_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub node_width: f64,
	pub sibling_gap: f64,
	pub level_gap: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_width: 240.0,
			sibling_gap: 60.0,
			level_gap: 180.0,
		}
	}
}

impl LayoutConfig {
	fn pitch(&self) -> f64 {
		self.node_width + self.sibling_gap
	}

	/// Width of `count` siblings laid side by side.
	pub fn group_width(&self, count: usize) -> f64 {
		if count == 0 {
			return 0.0;
		}
		count as f64 * self.pitch() - self.sibling_gap
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
	pub id: String,
	pub position: Position,
	pub width: f64,
}

/// Assigns one position to every node in `nodes`. Output is ordered by tier
/// and then by placement within the tier.
pub fn layout(
	nodes: &[&GraphNode],
	index: &HierarchyIndex,
	config: &LayoutConfig,
) -> Vec<Placement> {
	let mut tiers: [Vec<&GraphNode>; TIER_COUNT] = Default::default();
	for &node in nodes {
		tiers[node.kind.tier()].push(node);
	}

	let mut placed: HashMap<&str, f64> = HashMap::new();
	let mut out = Vec::with_capacity(nodes.len());
	let mut y = 0.0;

	for (tier, members) in tiers.iter().enumerate() {
		if members.is_empty() {
			continue;
		}
		let row = if tier == 0 {
			top_row(members, config)
		} else {
			child_row(members, index, &placed, config)
		};
		for (node, x) in row {
			placed.insert(node.id.as_str(), x);
			out.push(Placement {
				id: node.id.clone(),
				position: Position { x, y },
				width: config.node_width,
			});
		}
		y += config.level_gap;
	}
	out
}

type Row<'a> = Vec<(&'a GraphNode, f64)>;

fn top_row<'a>(members: &[&'a GraphNode], config: &LayoutConfig) -> Row<'a> {
	let pitch = config.node_width + 2.0 * config.sibling_gap;
	members
		.iter()
		.enumerate()
		.map(|(i, node)| (*node, i as f64 * pitch))
		.collect()
}

fn child_row<'a>(
	members: &[&'a GraphNode],
	index: &'a HierarchyIndex,
	placed: &HashMap<&str, f64>,
	config: &LayoutConfig,
) -> Row<'a> {
	let mut groups: Vec<(&'a str, Vec<&'a GraphNode>)> = Vec::new();
	let mut orphans = Vec::new();

	for &node in members {
		let parent = index
			.parents(&node.id)
			.iter()
			.map(String::as_str)
			.find(|p| placed.contains_key(p));
		match parent {
			Some(parent) => match groups.iter_mut().find(|(p, _)| *p == parent) {
				Some((_, group)) => group.push(node),
				None => groups.push((parent, vec![node])),
			},
			None => orphans.push(node),
		}
	}

	let mut row = Vec::with_capacity(members.len());
	let mut right_edge: Option<f64> = None;

	for (parent, group) in groups {
		let parent_mid = placed[parent] + config.node_width / 2.0;
		let width = config.group_width(group.len());
		let start = parent_mid - width / 2.0;
		for (i, node) in group.into_iter().enumerate() {
			row.push((node, start + i as f64 * config.pitch()));
		}
		let end = start + width;
		right_edge = Some(right_edge.map_or(end, |r: f64| r.max(end)));
	}

	let orphan_start = right_edge.map_or(0.0, |r| r + config.sibling_gap);
	for (i, node) in orphans.into_iter().enumerate() {
		row.push((node, orphan_start + i as f64 * config.pitch()));
	}
	row
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_map::types::{
		EdgeKind, EdgeMetadata, GraphEdge, NodeKind, NodeMetadata,
	};

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.into(),
			kind,
			label: id.into(),
			metadata: NodeMetadata::default(),
		}
	}

	fn hierarchy(source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			id: format!("{source}->{target}"),
			source: source.into(),
			target: target.into(),
			kind: EdgeKind::Hierarchy,
			label: None,
			metadata: EdgeMetadata::default(),
		}
	}

	fn find<'a>(placements: &'a [Placement], id: &str) -> &'a Placement {
		placements.iter().find(|p| p.id == id).unwrap()
	}

	#[test]
	fn top_tier_uses_double_gap() {
		let nodes = [
			node("a", NodeKind::ProcessL1),
			node("b", NodeKind::ProcessL1),
			node("c", NodeKind::ProcessL1),
		];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let config = LayoutConfig::default();
		let out = layout(&refs, &HierarchyIndex::default(), &config);

		let xs: Vec<f64> = out.iter().map(|p| p.position.x).collect();
		assert_eq!(xs, vec![0.0, 360.0, 720.0]);
		assert!(out.iter().all(|p| p.position.y == 0.0));
	}

	#[test]
	fn children_are_centred_under_parent() {
		let nodes = [
			node("root", NodeKind::ProcessL1),
			node("c1", NodeKind::ProcessL2),
			node("c2", NodeKind::ProcessL2),
			node("c3", NodeKind::ProcessL2),
		];
		let edges = [hierarchy("root", "c1"), hierarchy("root", "c2"), hierarchy("root", "c3")];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let config = LayoutConfig::default();
		let out = layout(&refs, &HierarchyIndex::from_edges(&edges), &config);

		let root = find(&out, "root");
		let group_width = config.group_width(3);
		assert_eq!(group_width, 840.0);

		let mid = root.position.x + root.width / 2.0;
		assert_eq!(find(&out, "c1").position.x, mid - group_width / 2.0);
		assert_eq!(find(&out, "c2").position.x, mid - config.node_width / 2.0);
		for id in ["c1", "c2", "c3"] {
			let child = find(&out, id);
			assert_eq!(child.position.y, config.level_gap);
			assert!(child.position.x >= mid - group_width / 2.0);
			assert!(child.position.x <= mid + group_width / 2.0);
		}
	}

	#[test]
	fn unplaced_parents_make_orphans_after_groups() {
		let nodes = [
			node("root", NodeKind::ProcessL1),
			node("kid", NodeKind::ProcessL2),
			node("lost", NodeKind::ProcessL2),
			node("stray", NodeKind::ProcessL2),
		];
		let edges = [hierarchy("root", "kid"), hierarchy("missing", "lost")];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let config = LayoutConfig::default();
		let out = layout(&refs, &HierarchyIndex::from_edges(&edges), &config);

		let kid = find(&out, "kid");
		let lost = find(&out, "lost");
		let stray = find(&out, "stray");
		assert_eq!(kid.position.x, 0.0);
		assert_eq!(lost.position.x, config.node_width + config.sibling_gap);
		assert_eq!(stray.position.x, lost.position.x + config.pitch());
		assert_eq!(
			out.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
			["root", "kid", "lost", "stray"]
		);
	}

	#[test]
	fn orphans_without_groups_start_at_origin() {
		let nodes = [node("d1", NodeKind::PrimaryAsset), node("d2", NodeKind::PrimaryAsset)];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let out = layout(&refs, &HierarchyIndex::default(), &LayoutConfig::default());
		assert_eq!(out[0].position, Position { x: 0.0, y: 0.0 });
		assert_eq!(out[1].position, Position { x: 300.0, y: 0.0 });
	}

	#[test]
	fn empty_tiers_do_not_advance_rows() {
		let nodes = [
			node("l1", NodeKind::ProcessL1),
			node("asset", NodeKind::PrimaryAsset),
			node("server", NodeKind::SecondaryAsset),
		];
		let edges = [hierarchy("l1", "asset"), hierarchy("asset", "server")];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let config = LayoutConfig::default();
		let out = layout(&refs, &HierarchyIndex::from_edges(&edges), &config);

		assert_eq!(find(&out, "asset").position.y, 180.0);
		assert_eq!(find(&out, "server").position.y, 360.0);
		assert_eq!(find(&out, "server").position.x, find(&out, "l1").position.x);
	}

	#[test]
	fn first_placed_parent_is_used() {
		let nodes = [
			node("a", NodeKind::ProcessL1),
			node("b", NodeKind::ProcessL1),
			node("shared", NodeKind::ProcessL2),
		];
		let edges = [
			hierarchy("ghost", "shared"),
			hierarchy("b", "shared"),
			hierarchy("a", "shared"),
		];
		let refs: Vec<&GraphNode> = nodes.iter().collect();
		let out = layout(&refs, &HierarchyIndex::from_edges(&edges), &LayoutConfig::default());
		// centred alone under `b`, not under `a` at the origin
		assert_eq!(find(&out, "shared").position.x, find(&out, "b").position.x);
		assert_ne!(find(&out, "shared").position.x, find(&out, "a").position.x);
	}
}
