use super::builder::{RenderGraph, RenderNode};
use super::style::ThemePalette;

/// Padding kept around the graph when fitting it to the canvas.
const FIT_PADDING: f64 = 48.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 4.0;
/// Pointer travel below which a press counts as a click rather than a pan.
pub const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything the canvas needs between frames.
pub struct MapViewState {
	pub graph: RenderGraph,
	pub palette: ThemePalette,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	/// Seconds since mount; drives animated edge dashes.
	pub flow_time: f64,
	pub hovered: Option<String>,
}

impl MapViewState {
	pub fn new(graph: RenderGraph, palette: ThemePalette, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph,
			palette,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			flow_time: 0.0,
			hovered: None,
		};
		state.fit_to_view();
		state
	}

	/// Swap in a freshly derived graph, keeping the current pan and zoom.
	pub fn set_graph(&mut self, graph: RenderGraph) {
		self.graph = graph;
		if self
			.hovered
			.as_deref()
			.is_some_and(|id| self.graph.node(id).is_none())
		{
			self.hovered = None;
		}
	}

	/// Scale and centre so the whole graph is visible, never zooming in past 1:1.
	pub fn fit_to_view(&mut self) {
		let Some((x0, y0, x1, y1)) = self.graph.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (gw, gh) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let k = ((self.width - 2.0 * FIT_PADDING) / gw)
			.min((self.height - 2.0 * FIT_PADDING) / gh)
			.clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (x0 + gw / 2.0) * k,
			y: self.height / 2.0 - (y0 + gh / 2.0) * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&RenderNode> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// later nodes draw on top
		self.graph.nodes.iter().rev().find(|n| n.contains(gx, gy))
	}

	pub fn set_hover(&mut self, sx: f64, sy: f64) {
		self.hovered = self.node_at_position(sx, sy).map(|n| n.id.clone());
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hovered.as_deref() == Some(id)
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn drag_pan(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pan.moved = true;
		}
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
	}

	/// Ends a pan. Returns true when the press never moved, i.e. was a click.
	pub fn end_pan(&mut self) -> bool {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan = PanState::default();
		was_click
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
