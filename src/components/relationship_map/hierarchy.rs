//! Parent/child indexing over structural edges and subtree collapse.

use std::collections::{HashMap, HashSet};

use super::types::GraphEdge;

/// Parent → children adjacency built from `hierarchy` and `secondary-link`
/// edges. Child order is edge scan order.
#[derive(Clone, Debug, Default)]
pub struct HierarchyIndex {
	children: HashMap<String, Vec<String>>,
	parents: HashMap<String, Vec<String>>,
}

impl HierarchyIndex {
	pub fn from_edges(edges: &[GraphEdge]) -> Self {
		let mut index = Self::default();
		for edge in edges.iter().filter(|e| e.kind.is_structural()) {
			index
				.children
				.entry(edge.source.clone())
				.or_default()
				.push(edge.target.clone());
			index
				.parents
				.entry(edge.target.clone())
				.or_default()
				.push(edge.source.clone());
		}
		index
	}

	pub fn children(&self, id: &str) -> &[String] {
		self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn child_count(&self, id: &str) -> usize {
		self.children(id).len()
	}

	pub fn parents(&self, id: &str) -> &[String] {
		self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Every id that has at least one child.
	pub fn collapsible(&self) -> impl Iterator<Item = &str> {
		self.children
			.iter()
			.filter(|(_, c)| !c.is_empty())
			.map(|(id, _)| id.as_str())
	}

	/// All transitive descendants of `root`, excluding `root` itself.
	/// Cycles terminate because each id is expanded at most once.
	pub fn descendants(&self, root: &str) -> HashSet<String> {
		let mut visited: HashSet<&str> = HashSet::from([root]);
		let mut found = HashSet::new();
		let mut stack = vec![root];

		while let Some(id) = stack.pop() {
			for child in self.children(id) {
				if visited.insert(child.as_str()) {
					found.insert(child.clone());
					stack.push(child.as_str());
				}
			}
		}
		found
	}

	/// Union of descendant closures over every collapsed node.
	pub fn hidden_nodes(&self, collapse: &CollapseState) -> HashSet<String> {
		collapse
			.iter()
			.flat_map(|id| self.descendants(id))
			.collect()
	}
}

/// Node ids the user has collapsed. Owned by the rendering surface and
/// passed into derivation; never stored on graph data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseState {
	collapsed: HashSet<String>,
}

impl CollapseState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Flip one node. Returns whether it is collapsed afterwards.
	pub fn toggle(&mut self, id: &str) -> bool {
		if self.collapsed.remove(id) {
			false
		} else {
			self.collapsed.insert(id.to_owned());
			true
		}
	}

	/// Collapse every node that has children.
	pub fn collapse_all(&mut self, index: &HierarchyIndex) {
		self.collapsed = index.collapsible().map(str::to_owned).collect();
	}

	pub fn expand_all(&mut self) {
		self.collapsed.clear();
	}

	pub fn is_collapsed(&self, id: &str) -> bool {
		self.collapsed.contains(id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.collapsed.iter().map(String::as_str)
	}
}
