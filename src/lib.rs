//! flow-tour
//!
//! A path-guided 3D tour through a street of buildings. The viewer scrolls a
//! camera along a spline; buildings near the camera dissolve into particles
//! and reassemble as their renewed version, and turn back once the camera
//! has moved on. Native and WASM are both supported.
//!
//! The crate owns the tour's state and timing and leaves drawing to a
//! [`flow::Renderer`].
//!
//! High-level modules
//! - `path`: the spline, its dense sample table, ribbon and light anchors
//! - `camera`: camera rig driven by scroll and drag gestures
//! - `placement`: spreading buildings along the path
//! - `swap`: per-building swap state machine
//! - `effect`: particle disintegration/reconstruction jobs
//! - `scheduler` and `clock`: delayed steps and the frame clock
//! - `context`: tour configuration and projection
//! - `data_structures`: transforms and the scene graph
//! - `resources`: loading building models
//! - `input`: window events to tour gestures
//! - `flow`: the tour session and the event loop
//!

pub mod camera;
pub mod clock;
pub mod context;
pub mod data_structures;
pub mod effect;
pub mod flow;
pub mod input;
pub mod path;
pub mod placement;
pub mod resources;
pub mod scheduler;
pub mod swap;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;
