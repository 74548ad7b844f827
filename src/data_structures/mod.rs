//! Tour data structures: transforms and the scene graph.
//!
//! - `instance` holds per-object transformation data and its composition
//! - `scene_graph` is the scene collaborator (add/remove/read objects) and its in-memory form

pub mod instance;
pub mod scene_graph;
