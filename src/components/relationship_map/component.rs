use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::builder::{RenderGraph, build_render_graph};
use super::config::{MapConfig, ViewOptions};
use super::embedding::EmbeddingMaps;
use super::hierarchy::{CollapseState, HierarchyIndex};
use super::render;
use super::state::MapViewState;
use super::types::GraphData;

const FRAME_SECONDS: f64 = 0.016;

/// Handle on the map's local UI state. Every method only touches the
/// collapse set or the toggles; the graph is re-derived from them.
#[derive(Clone, Copy)]
pub struct MapController {
	data: Signal<GraphData>,
	collapse: RwSignal<CollapseState>,
	options: RwSignal<ViewOptions>,
	defaults: StoredValue<ViewOptions>,
}

impl MapController {
	pub fn new(data: Signal<GraphData>, defaults: ViewOptions) -> Self {
		Self {
			data,
			collapse: RwSignal::new(CollapseState::new()),
			options: RwSignal::new(defaults.clone()),
			defaults: StoredValue::new(defaults),
		}
	}

	pub fn toggle_collapse(&self, id: &str) {
		self.collapse.update(|c| {
			let collapsed = c.toggle(id);
			debug!("node {id} collapsed={collapsed}");
		});
	}

	pub fn collapse_all(&self) {
		let index = self.data.with_untracked(|d| HierarchyIndex::from_edges(&d.edges));
		self.collapse.update(|c| c.collapse_all(&index));
	}

	pub fn expand_all(&self) {
		self.collapse.update(CollapseState::expand_all);
	}

	/// Back to the initial view: nothing collapsed, default toggles.
	pub fn reset_layout(&self) {
		self.collapse.set(CollapseState::new());
		self.options.set(self.defaults.get_value());
	}

	pub fn options(&self) -> RwSignal<ViewOptions> {
		self.options
	}

	fn derive(&self, config: &MapConfig) -> RenderGraph {
		self.data.with(|data| {
			self.options.with(|options| {
				self.collapse.with(|collapse| {
					build_render_graph(data, options, collapse, &config.layout, &config.palette)
				})
			})
		})
	}
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// The canvas fills its container; detached canvases get a fixed size.
fn canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	match canvas.parent_element() {
		Some(parent) => (parent.client_width() as f64, parent.client_height() as f64),
		None => (960.0, 640.0),
	}
}

#[component]
pub fn AssetRelationshipMap(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = MapConfig::default())] config: MapConfig,
) -> impl IntoView {
	let controller = MapController::new(data, config.options.clone());
	let options = controller.options();
	let palette = config.palette.clone();
	let graph = Memo::new(move |_| controller.derive(&config));

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<MapViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	// Derivations log conflicts at debug; warn once per snapshot here.
	Effect::new(move |_| {
		let policy = options.with_untracked(|o| o.conflict_policy);
		data.with(|d| {
			for conflict in EmbeddingMaps::resolve(&d.nodes, &d.edges, policy).conflicts {
				warn!(
					"asset {} is linked to {} processes ({})",
					conflict.leaf,
					conflict.processes.len(),
					conflict.processes.join(", ")
				);
			}
		});
	});

	let (state_init, animate_init, resize_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = canvas_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return error!("canvas context is not 2d"),
			},
			_ => return error!("canvas 2d context unavailable"),
		};
		*state_init.borrow_mut() = Some(MapViewState::new(
			graph.get_untracked(),
			palette.clone(),
			w,
			h,
		));

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_SECONDS);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (&*animate_init.borrow(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = canvas_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
				s.fit_to_view();
			}
		}));
		if let (Some(cb), Some(window)) = (&*resize_init.borrow(), web_sys::window()) {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	let state_graph = state.clone();
	Effect::new(move |_| {
		let next = graph.get();
		if let Some(ref mut s) = *state_graph.borrow_mut() {
			s.set_graph(next);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.begin_pan(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.pan.active {
				s.drag_pan(x, y);
			} else {
				s.set_hover(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, &ev);
		let clicked = state_mu.borrow_mut().as_mut().and_then(|s| {
			if !s.end_pan() {
				return None;
			}
			s.node_at_position(x, y)
				.filter(|n| n.data.child_count > 0)
				.map(|n| n.id.clone())
		});
		if let Some(id) = clicked {
			controller.toggle_collapse(&id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_pan();
			s.hovered = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	// Refit against the reset graph even when the memo value is unchanged.
	let state_reset = state.clone();
	let on_reset = move |_| {
		controller.reset_layout();
		let next = graph.get_untracked();
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.set_graph(next);
			s.fit_to_view();
		}
	};

	view! {
		<div class="relationship-map">
			<div class="relationship-map-toolbar">
				<button on:click=move |_| controller.collapse_all()>"Collapse All"</button>
				<button on:click=move |_| controller.expand_all()>"Expand All"</button>
				<button on:click=on_reset>"Reset Layout"</button>
				<label>
					<input
						type="checkbox"
						prop:checked=move || options.with(|o| o.show_secondary)
						on:change=move |ev| {
							options.update(|o| o.show_secondary = event_target_checked(&ev))
						}
					/>
					"Show secondary assets"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || options.with(|o| o.embed_data_in_process)
						on:change=move |ev| {
							options.update(|o| o.embed_data_in_process = event_target_checked(&ev))
						}
					/>
					"Embed data assets in processes"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || options.with(|o| o.embed_secondary_in_process)
						prop:disabled=move || options.with(|o| !o.show_secondary)
						on:change=move |ev| {
							let checked = event_target_checked(&ev);
							options.update(|o| o.embed_secondary_in_process = checked)
						}
					/>
					"Embed secondary assets in processes"
				</label>
			</div>
			<Show when=move || graph.with(RenderGraph::is_empty)>
				<div class="relationship-map-empty">
					<h2>"No Assets to Display"</h2>
					<p>"Add processes or assets to see how they relate."</p>
				</div>
			</Show>
			<canvas
				node_ref=canvas_ref
				class="relationship-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SNAPSHOT: &str = r#"{
		"nodes": [
			{"id": "l1", "type": "process-l1", "label": "Operations"},
			{"id": "l2", "type": "process-l2", "label": "Payments"},
			{"id": "srv", "type": "secondary-asset", "label": "Server"}
		],
		"edges": [
			{"id": "h", "source": "l1", "target": "l2", "type": "hierarchy"}
		]
	}"#;

	fn controller() -> (Owner, MapController) {
		let owner = Owner::new();
		owner.set();
		let data = GraphData::from_json(SNAPSHOT).unwrap();
		let controller = MapController::new(Signal::stored(data), ViewOptions::default());
		(owner, controller)
	}

	fn visible(controller: &MapController) -> Vec<String> {
		controller
			.derive(&MapConfig::default())
			.nodes
			.into_iter()
			.map(|n| n.id)
			.collect()
	}

	#[test]
	fn toggle_collapse_hides_and_restores_subtree() {
		let (_owner, controller) = controller();
		assert_eq!(visible(&controller), ["l1", "l2", "srv"]);

		controller.toggle_collapse("l1");
		assert_eq!(visible(&controller), ["l1", "srv"]);
		assert!(controller.collapse.with_untracked(|c| c.is_collapsed("l1")));

		controller.toggle_collapse("l1");
		assert_eq!(visible(&controller), ["l1", "l2", "srv"]);
	}

	#[test]
	fn collapse_all_then_expand_all() {
		let (_owner, controller) = controller();
		controller.collapse_all();
		assert_eq!(visible(&controller), ["l1", "srv"]);

		controller.expand_all();
		assert_eq!(visible(&controller), ["l1", "l2", "srv"]);
		assert_eq!(controller.collapse.get_untracked(), CollapseState::new());
	}

	#[test]
	fn reset_layout_restores_default_toggles() {
		let (_owner, controller) = controller();
		controller.options().update(|o| o.show_secondary = false);
		controller.collapse_all();
		assert_eq!(visible(&controller), ["l1"]);

		controller.reset_layout();
		assert_eq!(visible(&controller), ["l1", "l2", "srv"]);
		assert_eq!(controller.options().get_untracked(), ViewOptions::default());
		assert_eq!(controller.collapse.get_untracked(), CollapseState::new());
	}

	#[test]
	fn reset_layout_uses_configured_defaults() {
		let owner = Owner::new();
		owner.set();
		let defaults = ViewOptions {
			show_secondary: false,
			..ViewOptions::default()
		};
		let data = Signal::stored(GraphData::from_json(SNAPSHOT).unwrap());
		let controller = MapController::new(data, defaults.clone());

		controller.options().update(|o| o.show_secondary = true);
		assert_eq!(visible(&controller), ["l1", "l2", "srv"]);
		controller.reset_layout();
		assert_eq!(controller.options().get_untracked(), defaults);
		assert_eq!(visible(&controller), ["l1", "l2"]);
	}
}
