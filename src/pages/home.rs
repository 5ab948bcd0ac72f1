use std::sync::Arc;

use leptos::prelude::*;
use log::error;

use crate::components::relationship_map::{
	AssetRelationshipMap, GraphData, GraphSource, MapConfig, StaticGraphSource,
};

/// Bundled demo inventory.
const SAMPLE_GRAPH: &str = include_str!("sample_graph.json");
/// Layout constants and initial toggles for the demo map.
const MAP_CONFIG: &str = include_str!("map_config.json");

/// Map plus a business-unit filter over one snapshot source.
#[component]
fn MapPanel(source: Arc<StaticGraphSource>, config: MapConfig) -> impl IntoView {
	let units = source.business_units();
	let (unit, set_unit) = signal(None::<String>);

	// Every filter change asks the source for a fresh snapshot.
	let data = Signal::derive(move || {
		unit.with(|bu| source.fetch(bu.as_deref()))
			.unwrap_or_else(|err| {
				error!("failed to load relationship graph: {err}");
				GraphData::default()
			})
	});

	view! {
		<div class="fullscreen-graph">
			<AssetRelationshipMap data=data config=config />
			<div class="graph-overlay">
				<h1>"Asset Relationship Map"</h1>
				<p class="subtitle">
					"Click a process to collapse its subtree. Drag to pan. Scroll to zoom."
				</p>
				<select on:change=move |ev| {
					let value = event_target_value(&ev);
					set_unit.set((!value.is_empty()).then_some(value));
				}>
					<option value="">"All business units"</option>
					{units
						.into_iter()
						.map(|u| {
							let label = u.clone();
							view! { <option value=u>{label}</option> }
						})
						.collect_view()}
				</select>
			</div>
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let panel = StaticGraphSource::from_json(SAMPLE_GRAPH).and_then(|source| {
		let config = MapConfig::from_json(MAP_CONFIG)?;
		Ok(view! { <MapPanel source=Arc::new(source) config=config /> })
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{panel}
		</ErrorBoundary>
	}
}
