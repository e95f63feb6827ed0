//! 3D exploded view of a UI view tree, with GPU color picking.
//!
//! Each node of a view tree is drawn as a flat quad stacked along Z by its
//! tree depth, seen through an orbit camera the user rotates, pans, and zooms.
//! Clicking the scene renders the tree once more off-screen with every node
//! painted in a color that encodes its id, then reads back the single pixel
//! under the cursor to find the hit node. There is no CPU hit-testing.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and surface-free [`engine::EngineCore`] |
//! | [`tree`] | View nodes and the validated, indexed [`tree::Scene`] |
//! | [`camera`] | Orbit camera state and its pointer/wheel transitions |
//! | [`input`] | Input event types the host feeds the engine |
//! | [`projector`] | Quad vertices and the model-view-projection transform |
//! | [`walker`] | Pre-order traversal into draw commands |
//! | [`render`] | Replays draw commands against a surface |
//! | [`pick`] | Id/color codec and the picking pass |
//! | [`surface`] | The [`surface::GpuSurface`] backend trait |
//! | [`software`] | Headless CPU rasterizer backend |
//! | [`webgl`] | WebGL backend for browser canvases |
//! | [`color`] | RGBA colors and hex parsing |
//! | [`config`] | Viewer tunables |
//! | [`consts`] | Shared numeric constants |
//!
//! ## Depth convention
//!
//! A node at tree depth `d` lies at `z = d * depth_step`. The default camera
//! sits on +Z, so children are nearer than their parents and cover them.
//! Both passes depth-test with `LEQUAL`, so among quads at equal z the one
//! drawn later in pre-order wins, the same in the picture and in picking.

pub mod camera;
pub mod color;
pub mod config;
pub mod consts;
pub mod engine;
pub mod input;
pub mod pick;
pub mod projector;
pub mod render;
pub mod software;
pub mod surface;
pub mod tree;
pub mod walker;
pub mod webgl;
