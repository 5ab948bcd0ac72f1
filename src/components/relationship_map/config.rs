use serde::{Deserialize, Serialize};

use super::embedding::EmbedConflictPolicy;
use super::layout::LayoutConfig;
use super::source::GraphError;
use super::style::ThemePalette;

/// Display toggles owned by the rendering surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
	pub show_secondary: bool,
	pub embed_data_in_process: bool,
	pub embed_secondary_in_process: bool,
	pub conflict_policy: EmbedConflictPolicy,
}

impl Default for ViewOptions {
	fn default() -> Self {
		Self {
			show_secondary: true,
			embed_data_in_process: false,
			embed_secondary_in_process: false,
			conflict_policy: EmbedConflictPolicy::LastWins,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
	pub layout: LayoutConfig,
	pub palette: ThemePalette,
	/// Toggle values used on first render and by reset.
	pub options: ViewOptions,
}

impl MapConfig {
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(json)?)
	}
}
