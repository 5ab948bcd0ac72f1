//! Edge and node colouring.
//!
//! Colours are resolved from an explicit [`ThemePalette`] handed in as
//! configuration, so the canvas never has to interpret theme indirection.

use serde::{Deserialize, Serialize};

use super::types::{EdgeKind, GraphEdge, NodeKind};

/// Theme token a visual element draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorRole {
	Primary,
	Warning,
	ChartAccent,
	Muted,
	Accent,
	Background,
	Foreground,
	Card,
	Border,
	MutedForeground,
}

/// Token → concrete colour table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePalette {
	pub primary: String,
	pub warning: String,
	pub chart_accent: String,
	pub muted: String,
	pub accent: String,
	pub background: String,
	pub foreground: String,
	pub card: String,
	pub border: String,
	pub muted_foreground: String,
}

impl Default for ThemePalette {
	fn default() -> Self {
		Self {
			primary: "#3b82f6".into(),
			warning: "#f59e0b".into(),
			chart_accent: "#a855f7".into(),
			muted: "#94a3b8".into(),
			accent: "#10b981".into(),
			background: "#0f172a".into(),
			foreground: "#f8fafc".into(),
			card: "#1e293b".into(),
			border: "#334155".into(),
			muted_foreground: "#cbd5e1".into(),
		}
	}
}

impl ThemePalette {
	pub fn resolve(&self, role: ColorRole) -> &str {
		match role {
			ColorRole::Primary => &self.primary,
			ColorRole::Warning => &self.warning,
			ColorRole::ChartAccent => &self.chart_accent,
			ColorRole::Muted => &self.muted,
			ColorRole::Accent => &self.accent,
			ColorRole::Background => &self.background,
			ColorRole::Foreground => &self.foreground,
			ColorRole::Card => &self.card,
			ColorRole::Border => &self.border,
			ColorRole::MutedForeground => &self.muted_foreground,
		}
	}

	/// Accent stripe for a node card.
	pub fn node_accent(&self, kind: NodeKind) -> &str {
		self.resolve(match kind {
			NodeKind::ProcessL1 => ColorRole::Primary,
			NodeKind::ProcessL2 => ColorRole::Accent,
			NodeKind::ProcessL3 => ColorRole::ChartAccent,
			NodeKind::PrimaryAsset => ColorRole::Warning,
			NodeKind::SecondaryAsset => ColorRole::Muted,
		})
	}
}

pub const DASH_PATTERN: [f64; 2] = [6.0, 4.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrowhead {
	None,
	Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub stroke: String,
	pub width: f64,
	pub dash: Option<[f64; 2]>,
	pub arrow: Arrowhead,
	pub animated: bool,
	pub label: Option<String>,
	pub label_background: String,
}

/// Maps an edge to its stroke. First matching row wins.
pub fn style_edge(edge: &GraphEdge, palette: &ThemePalette) -> EdgeStyle {
	let (role, width, dashed, animated, label) = if edge.kind == EdgeKind::Hierarchy {
		(ColorRole::Primary, 2.5, false, false, edge.label.clone())
	} else if edge.kind == EdgeKind::DataFlow {
		(ColorRole::Warning, 2.0, false, true, edge.label.clone())
	} else if edge.is_tagged() {
		(ColorRole::ChartAccent, 2.0, true, false, Some("linked".to_owned()))
	} else if edge.kind == EdgeKind::SecondaryLink {
		(ColorRole::Muted, 1.5, true, false, edge.label.clone())
	} else if edge.kind == EdgeKind::ProcessLink {
		(ColorRole::Accent, 2.0, false, false, edge.label.clone())
	} else {
		(ColorRole::Muted, 1.5, false, false, edge.label.clone())
	};

	let arrow = match edge.kind {
		EdgeKind::Hierarchy | EdgeKind::DataFlow | EdgeKind::ProcessLink => Arrowhead::Closed,
		EdgeKind::SecondaryLink | EdgeKind::Relationship => Arrowhead::None,
	};

	EdgeStyle {
		stroke: palette.resolve(role).to_owned(),
		width,
		dash: dashed.then_some(DASH_PATTERN),
		arrow,
		animated,
		label,
		label_background: palette.resolve(ColorRole::Card).to_owned(),
	}
}
