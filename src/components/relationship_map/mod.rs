//! Asset relationship map: derives a layered, collapsible node/edge layout
//! from a flat snapshot of processes, data assets and secondary assets, and
//! draws it on a canvas.

mod builder;
mod component;
mod config;
mod embedding;
mod hierarchy;
mod layout;
mod render;
mod source;
mod state;
mod style;
mod types;

pub use component::AssetRelationshipMap;
pub use config::MapConfig;
pub use source::{GraphSource, StaticGraphSource};
pub use types::GraphData;
