use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::builder::{EMBED_ROW_HEIGHT, NODE_HEIGHT, RenderEdge, RenderNode};
use super::state::MapViewState;
use super::style::{Arrowhead, ColorRole};

const CORNER_RADIUS: f64 = 8.0;
const STRIPE_WIDTH: f64 = 4.0;
const ARROW_SIZE: f64 = 9.0;
const TOGGLE_RADIUS: f64 = 9.0;
/// Graph units per second that animated dashes travel.
const FLOW_SPEED: f64 = 30.0;

pub fn render(state: &MapViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(state.palette.resolve(ColorRole::Background));
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

/// Connector end points: bottom-centre to top-centre across tiers, side to
/// side within a tier.
fn anchors(src: &RenderNode, tgt: &RenderNode) -> (f64, f64, f64, f64) {
	let (sx, sy) = (src.position.x, src.position.y);
	let (tx, ty) = (tgt.position.x, tgt.position.y);
	if ty > sy {
		(sx + src.width / 2.0, sy + src.height(), tx + tgt.width / 2.0, ty)
	} else if ty < sy {
		(sx + src.width / 2.0, sy, tx + tgt.width / 2.0, ty + tgt.height())
	} else if tx >= sx {
		(sx + src.width, sy + NODE_HEIGHT / 2.0, tx, ty + NODE_HEIGHT / 2.0)
	} else {
		(sx, sy + NODE_HEIGHT / 2.0, tx + tgt.width, ty + NODE_HEIGHT / 2.0)
	}
}

fn draw_edges(state: &MapViewState, ctx: &CanvasRenderingContext2d) {
	// tree connectors first so flows and links sit on top of them
	let (structural, links): (Vec<&RenderEdge>, Vec<&RenderEdge>) =
		state.graph.edges.iter().partition(|e| e.kind.is_structural());
	for edge in structural.into_iter().chain(links) {
		let (Some(src), Some(tgt)) =
			(state.graph.node(&edge.source), state.graph.node(&edge.target))
		else {
			continue;
		};
		let (x1, y1, x2, y2) = anchors(src, tgt);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let style = &edge.style;
		let shorten = match style.arrow {
			Arrowhead::Closed => ARROW_SIZE,
			Arrowhead::None => 0.0,
		};

		ctx.set_stroke_style_str(&style.stroke);
		ctx.set_line_width(style.width);
		match (style.dash, style.animated) {
			(Some([dash, gap]), animated) => {
				set_dash(ctx, dash, gap);
				let offset = if animated {
					-(state.flow_time * FLOW_SPEED) % (dash + gap)
				} else {
					0.0
				};
				ctx.set_line_dash_offset(offset);
			}
			(None, true) => {
				set_dash(ctx, 10.0, 6.0);
				ctx.set_line_dash_offset(-(state.flow_time * FLOW_SPEED) % 16.0);
			}
			(None, false) => clear_dash(ctx),
		}

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2 - ux * shorten, y2 - uy * shorten);
		ctx.stroke();
		clear_dash(ctx);

		if style.arrow == Arrowhead::Closed {
			let (back_x, back_y) = (x2 - ux * ARROW_SIZE, y2 - uy * ARROW_SIZE);
			let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
			ctx.set_fill_style_str(&style.stroke);
			ctx.begin_path();
			ctx.move_to(x2, y2);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		draw_edge_label(state, ctx, edge, (x1 + x2) / 2.0, (y1 + y2) / 2.0);
	}
}

fn draw_edge_label(
	state: &MapViewState,
	ctx: &CanvasRenderingContext2d,
	edge: &RenderEdge,
	x: f64,
	y: f64,
) {
	let Some(label) = &edge.style.label else {
		return;
	};
	ctx.set_font("10px sans-serif");
	let width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(40.0);
	ctx.set_fill_style_str(&edge.style.label_background);
	ctx.fill_rect(x - width / 2.0 - 4.0, y - 8.0, width + 8.0, 16.0);
	ctx.set_fill_style_str(state.palette.resolve(ColorRole::MutedForeground));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(label, x, y);
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_nodes(state: &MapViewState, ctx: &CanvasRenderingContext2d) {
	let palette = &state.palette;
	for node in &state.graph.nodes {
		let (x, y, w, h) = (node.position.x, node.position.y, node.width, node.height());
		let hovered = state.is_hovered(&node.id);

		rounded_rect(ctx, x, y, w, h, CORNER_RADIUS);
		ctx.set_fill_style_str(palette.resolve(ColorRole::Card));
		ctx.fill();
		ctx.set_stroke_style_str(if hovered {
			palette.node_accent(node.kind)
		} else {
			palette.resolve(ColorRole::Border)
		});
		ctx.set_line_width(if hovered { 2.0 } else { 1.0 });
		ctx.stroke();

		ctx.set_fill_style_str(palette.node_accent(node.kind));
		ctx.fill_rect(x, y + CORNER_RADIUS, STRIPE_WIDTH, h - 2.0 * CORNER_RADIUS);

		let text_x = x + STRIPE_WIDTH + 10.0;
		ctx.set_fill_style_str(palette.resolve(ColorRole::MutedForeground));
		ctx.set_font("10px sans-serif");
		let _ = ctx.fill_text(node.kind.caption(), text_x, y + 16.0);

		ctx.set_fill_style_str(palette.resolve(ColorRole::Foreground));
		ctx.set_font("bold 13px sans-serif");
		let _ = ctx.fill_text(&node.data.label, text_x, y + 36.0);

		if let Some(detail) = detail_line(node) {
			ctx.set_fill_style_str(palette.resolve(ColorRole::MutedForeground));
			ctx.set_font("10px sans-serif");
			let _ = ctx.fill_text(&detail, text_x, y + 54.0);
		}

		for (i, asset) in node.data.embedded.iter().enumerate() {
			let row_y = y + NODE_HEIGHT + i as f64 * EMBED_ROW_HEIGHT;
			ctx.set_fill_style_str(palette.node_accent(asset.kind));
			ctx.begin_path();
			let _ = ctx.arc(text_x + 3.0, row_y + EMBED_ROW_HEIGHT / 2.0 - 4.0, 3.0, 0.0, 2.0 * PI);
			ctx.fill();
			ctx.set_fill_style_str(palette.resolve(ColorRole::Foreground));
			ctx.set_font("11px sans-serif");
			let _ = ctx.fill_text(&asset.label, text_x + 12.0, row_y + EMBED_ROW_HEIGHT / 2.0);

			let tag = asset.metadata.asset_id.as_deref().unwrap_or(&asset.id);
			ctx.set_fill_style_str(palette.resolve(ColorRole::MutedForeground));
			ctx.set_font("10px sans-serif");
			ctx.set_text_align("right");
			let _ = ctx.fill_text(tag, x + w - 10.0, row_y + EMBED_ROW_HEIGHT / 2.0);
			ctx.set_text_align("start");
		}

		if node.data.child_count > 0 {
			draw_toggle(state, ctx, node);
		}
	}
}

fn detail_line(node: &RenderNode) -> Option<String> {
	let meta = &node.data.metadata;
	let parts: Vec<&str> = [
		meta.asset_id.as_deref(),
		meta.criticality.as_deref(),
		meta.secondary_type.as_deref(),
	]
	.into_iter()
	.flatten()
	.collect();
	(!parts.is_empty()).then(|| parts.join(" · "))
}

fn draw_toggle(state: &MapViewState, ctx: &CanvasRenderingContext2d, node: &RenderNode) {
	let palette = &state.palette;
	let (cx, cy) = (
		node.position.x + node.width - TOGGLE_RADIUS - 6.0,
		node.position.y + TOGGLE_RADIUS + 6.0,
	);
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, TOGGLE_RADIUS, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(palette.resolve(ColorRole::Border));
	ctx.fill();

	ctx.set_fill_style_str(palette.resolve(ColorRole::Foreground));
	ctx.set_font("bold 12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(if node.data.is_collapsed { "+" } else { "−" }, cx, cy);

	if node.data.shows_hidden_badge() {
		ctx.set_font("10px sans-serif");
		ctx.set_fill_style_str(palette.resolve(ColorRole::Warning));
		let badge = format!("+{} hidden", node.data.child_count);
		let (bx, by) = (
			node.position.x + node.width / 2.0,
			node.position.y + node.height() + 12.0,
		);
		let _ = ctx.fill_text(&badge, bx, by);
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64, gap: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
}

fn clear_dash(ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_line_dash_offset(0.0);
}
