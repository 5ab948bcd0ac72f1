pub mod relationship_map;
