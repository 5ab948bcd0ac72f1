//! Pure derivation of the positioned, styled graph from one snapshot.
//!
//! `(data, options, collapse)` fully determines the output; repeated calls
//! with the same inputs return identical graphs.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::config::ViewOptions;
use super::embedding::EmbeddingMaps;
use super::hierarchy::{CollapseState, HierarchyIndex};
use super::layout::{LayoutConfig, Position, layout};
use super::style::{EdgeStyle, ThemePalette, style_edge};
use super::types::{EdgeKind, GraphData, GraphNode, NodeKind, NodeMetadata};

pub const NODE_HEIGHT: f64 = 72.0;
pub const EMBED_ROW_HEIGHT: f64 = 22.0;

/// A leaf asset drawn inside its process card.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedAsset {
	pub id: String,
	pub kind: NodeKind,
	pub label: String,
	pub metadata: NodeMetadata,
}

impl From<&GraphNode> for EmbeddedAsset {
	fn from(node: &GraphNode) -> Self {
		Self {
			id: node.id.clone(),
			kind: node.kind,
			label: node.label.clone(),
			metadata: node.metadata.clone(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNodeData {
	pub label: String,
	pub metadata: NodeMetadata,
	/// Direct children, regardless of visibility.
	pub child_count: usize,
	pub is_collapsed: bool,
	pub embedded: Vec<EmbeddedAsset>,
}

impl RenderNodeData {
	pub fn shows_hidden_badge(&self) -> bool {
		self.is_collapsed && self.child_count > 0
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
	pub id: String,
	pub kind: NodeKind,
	pub position: Position,
	pub width: f64,
	pub data: RenderNodeData,
}

impl RenderNode {
	pub fn height(&self) -> f64 {
		NODE_HEIGHT + self.data.embedded.len() as f64 * EMBED_ROW_HEIGHT
	}

	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.position.x
			&& x <= self.position.x + self.width
			&& y >= self.position.y
			&& y <= self.position.y + self.height()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	pub style: EdgeStyle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGraph {
	pub nodes: Vec<RenderNode>,
	pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&RenderNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// `(min_x, min_y, max_x, max_y)` over all node boxes.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		self.nodes.iter().fold(None, |acc, n| {
			let (x0, y0) = (n.position.x, n.position.y);
			let (x1, y1) = (x0 + n.width, y0 + n.height());
			Some(match acc {
				None => (x0, y0, x1, y1),
				Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
			})
		})
	}
}

pub fn build_render_graph(
	data: &GraphData,
	options: &ViewOptions,
	collapse: &CollapseState,
	layout_config: &LayoutConfig,
	palette: &ThemePalette,
) -> RenderGraph {
	let index = HierarchyIndex::from_edges(&data.edges);
	let embedding = EmbeddingMaps::resolve(&data.nodes, &data.edges, options.conflict_policy);
	let hidden = index.hidden_nodes(collapse);

	// leaf -> process, only for leaves actually pulled into a card. A leaf
	// whose process is hidden by a collapse goes with the card.
	let mut absorbed: HashMap<&str, &str> = HashMap::new();
	let mut cards: HashMap<&str, Vec<EmbeddedAsset>> = HashMap::new();
	for node in &data.nodes {
		let container = match node.kind {
			NodeKind::PrimaryAsset if options.embed_data_in_process => {
				embedding.data_to_process.get(&node.id)
			}
			NodeKind::SecondaryAsset
				if options.show_secondary && options.embed_secondary_in_process =>
			{
				embedding.secondary_to_process.get(&node.id)
			}
			_ => None,
		};
		if let Some(process) = container {
			absorbed.insert(&node.id, process);
			cards.entry(process).or_default().push(node.into());
		}
	}

	let visible: Vec<&GraphNode> = data
		.nodes
		.iter()
		.filter(|n| !hidden.contains(&n.id))
		.filter(|n| !absorbed.contains_key(n.id.as_str()))
		.filter(|n| options.show_secondary || n.kind != NodeKind::SecondaryAsset)
		.collect();
	let by_id: HashMap<&str, &GraphNode> = visible.iter().map(|n| (n.id.as_str(), *n)).collect();

	let nodes: Vec<RenderNode> = layout(&visible, &index, layout_config)
		.into_iter()
		.filter_map(|placement| {
			let node = by_id.get(placement.id.as_str())?;
			Some(RenderNode {
				kind: node.kind,
				position: placement.position,
				width: placement.width,
				data: RenderNodeData {
					label: node.label.clone(),
					metadata: node.metadata.clone(),
					child_count: index.child_count(&node.id),
					is_collapsed: collapse.is_collapsed(&node.id),
					embedded: cards.remove(node.id.as_str()).unwrap_or_default(),
				},
				id: placement.id,
			})
		})
		.collect();

	let rendered: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	let is_absorbed_link = |a: &str, b: &str| absorbed.get(a) == Some(&b);
	let edges: Vec<RenderEdge> = data
		.edges
		.iter()
		.filter(|e| !is_absorbed_link(&e.source, &e.target))
		.filter(|e| !is_absorbed_link(&e.target, &e.source))
		.filter(|e| rendered.contains(e.source.as_str()) && rendered.contains(e.target.as_str()))
		.map(|e| RenderEdge {
			source: e.source.clone(),
			target: e.target.clone(),
			kind: e.kind,
			style: style_edge(e, palette),
		})
		.collect();

	debug!(
		"relationship map: {} of {} nodes, {} of {} edges, {} hidden, {} embedded, {} conflicts",
		nodes.len(),
		data.nodes.len(),
		edges.len(),
		data.edges.len(),
		hidden.len(),
		absorbed.len(),
		embedding.conflicts.len()
	);

	RenderGraph { nodes, edges }
}
