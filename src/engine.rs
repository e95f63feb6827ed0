//! The engine: view tree, camera, and selection, plus the surface they draw on.
//!
//! [`EngineCore`] holds everything that can be tested without a graphics
//! backend. [`Engine`] pairs it with a [`GpuSurface`] and adds the two paths
//! that need one: a click runs the picking pass, and a resize syncs the
//! backing store. Handlers return an [`Action`]; apart from a click's picking
//! pass, nothing here draws until the host calls [`Engine::render`].

use tracing::error;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::camera::{CameraState, Point};
use crate::config::{ConfigError, ViewerConfig};
use crate::input::{Button, InputEvent};
use crate::pick::{self, PickError, PickOutcome};
use crate::render;
use crate::surface::{GpuSurface, RenderTarget, SurfaceError};
use crate::tree::{NodeId, Scene, TreeError, ViewNode};
use crate::webgl::WebGlSurface;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Error returned by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl From<PickError> for EngineError {
    fn from(e: PickError) -> Self {
        match e {
            PickError::Tree(e) => Self::Tree(e),
            PickError::Surface(e) => Self::Surface(e),
        }
    }
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Camera or selection changed; schedule a frame.
    RenderNeeded,
    /// A pick changed the selection. Also implies a render.
    SelectionChanged(Option<NodeId>),
}

/// Engine state that does not depend on a graphics surface.
///
/// Separated from `Engine` so it can be tested without a GPU or browser.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub config: ViewerConfig,
    pub camera: CameraState,
    /// The selected node, highlighted in the next visible pass.
    pub selected_id: Option<NodeId>,
    scene: Option<Scene>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_valid_config(ViewerConfig::default())
    }
}

impl EngineCore {
    /// Fresh state with no tree and no selection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: ViewerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: ViewerConfig) -> Self {
        Self { camera: CameraState::new(&config), config, selected_id: None, scene: None }
    }

    // --- Data inputs ---

    /// Replace the view tree and rebuild the id index.
    ///
    /// The selection survives only if its id is still present.
    ///
    /// # Errors
    ///
    /// Returns a [`TreeError`] and keeps the previous tree if the new one has
    /// an id overflow or duplicate ids.
    pub fn set_tree(&mut self, root: ViewNode) -> Result<(), TreeError> {
        let scene = Scene::new(root).inspect_err(|e| error!(error = %e, "rejected view tree"))?;
        if self.selected_id.is_some_and(|id| !scene.contains(id)) {
            self.selected_id = None;
        }
        self.scene = Some(scene);
        Ok(())
    }

    pub fn clear_tree(&mut self) {
        self.scene = None;
        self.selected_id = None;
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pos: Point, button: Button) -> Action {
        self.camera.on_pointer_down(pos, button);
        Action::None
    }

    pub fn on_pointer_move(&mut self, pos: Point) -> Action {
        if self.camera.on_pointer_move(pos) { Action::RenderNeeded } else { Action::None }
    }

    pub fn on_pointer_up(&mut self) -> Action {
        self.camera.on_pointer_up();
        Action::None
    }

    pub fn on_pointer_leave(&mut self) -> Action {
        self.camera.on_pointer_leave();
        Action::None
    }

    pub fn on_focus_lost(&mut self) -> Action {
        self.camera.on_focus_lost();
        Action::None
    }

    pub fn on_wheel(&mut self, delta_y: f64) -> Action {
        let before = self.camera.distance;
        self.camera.on_wheel(delta_y);
        #[allow(clippy::float_cmp)]
        let changed = self.camera.distance != before;
        if changed { Action::RenderNeeded } else { Action::None }
    }

    /// Dispatch the camera events. `Click` and `Resize` need a surface and
    /// are left to [`Engine::handle`]; here they are no-ops.
    pub fn handle(&mut self, event: InputEvent) -> Action {
        match event {
            InputEvent::PointerDown { pos, button } => self.on_pointer_down(pos, button),
            InputEvent::PointerMove { pos } => self.on_pointer_move(pos),
            InputEvent::PointerUp => self.on_pointer_up(),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::FocusLost => self.on_focus_lost(),
            InputEvent::Wheel { delta_y } => self.on_wheel(delta_y),
            InputEvent::Click { .. } | InputEvent::Resize => Action::None,
        }
    }

    /// Store the result of a pick. `Ignored` leaves the selection alone.
    pub fn apply_pick(&mut self, outcome: PickOutcome) -> Action {
        if outcome == PickOutcome::Ignored {
            return Action::None;
        }
        let next = outcome.selection();
        if next == self.selected_id {
            return Action::None;
        }
        self.selected_id = next;
        Action::SelectionChanged(next)
    }

    /// Classify a decoded id against the current tree.
    #[must_use]
    pub fn resolve(&self, decoded: Option<NodeId>) -> PickOutcome {
        match (decoded, &self.scene) {
            (Some(id), Some(scene)) if scene.contains(id) => PickOutcome::Hit(id),
            _ => PickOutcome::Miss,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.selected_id
    }

    /// The selected node, if it is still in the tree.
    #[must_use]
    pub fn selected_node(&self) -> Option<&ViewNode> {
        self.scene.as_ref()?.node(self.selected_id?)
    }

    #[must_use]
    pub fn camera(&self) -> CameraState {
        self.camera
    }
}

/// The full engine: `EngineCore` plus the surface it draws on.
///
/// Single-threaded. The host drives [`Engine::render`] from its frame tick
/// and feeds input through [`Engine::handle`]; no handler renders on its own
/// except a click, which runs the picking pass synchronously.
#[derive(Debug)]
pub struct Engine<S: GpuSurface> {
    surface: S,
    pub core: EngineCore,
}

impl<S: GpuSurface> Engine<S> {
    /// Wrap `surface` with a fresh camera and no tree.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `config` fails validation.
    pub fn new(surface: S, config: ViewerConfig) -> Result<Self, EngineError> {
        Ok(Self { surface, core: EngineCore::new(config)? })
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // --- Delegated data inputs ---

    /// # Errors
    ///
    /// See [`EngineCore::set_tree`].
    pub fn set_tree(&mut self, root: ViewNode) -> Result<(), EngineError> {
        self.core.set_tree(root)?;
        Ok(())
    }

    pub fn clear_tree(&mut self) {
        self.core.clear_tree();
    }

    // --- Input events ---

    /// Dispatch any input event.
    ///
    /// # Errors
    ///
    /// Returns surface errors from a click's picking pass or a resize.
    pub fn handle(&mut self, event: InputEvent) -> Result<Action, EngineError> {
        match event {
            InputEvent::Click { pos } => self.click(pos).map(|(_, action)| action),
            InputEvent::Resize => self.on_resize(),
            other => Ok(self.core.handle(other)),
        }
    }

    /// Resolve a click to a node and update the selection.
    ///
    /// While a drag is in progress the click is ignored outright: no picking
    /// pass runs and the selection is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Tree`] if an id cannot be encoded, or a surface
    /// error from the picking pass.
    pub fn on_click(&mut self, pos: Point) -> Result<PickOutcome, EngineError> {
        self.click(pos).map(|(outcome, _)| outcome)
    }

    fn click(&mut self, pos: Point) -> Result<(PickOutcome, Action), EngineError> {
        if self.core.camera.is_dragging() {
            return Ok((PickOutcome::Ignored, Action::None));
        }
        let decoded = match self.core.scene() {
            Some(scene) => pick::pick(&mut self.surface, scene.root(), &self.core.camera, &self.core.config, pos)
                .inspect_err(|e| error!(error = %e, "picking pass failed"))?,
            None => None,
        };
        let outcome = self.core.resolve(decoded);
        Ok((outcome, self.core.apply_pick(outcome)))
    }

    /// Match the backing store to the surface's layout size.
    ///
    /// # Errors
    ///
    /// Propagates surface resize errors.
    pub fn on_resize(&mut self) -> Result<Action, EngineError> {
        let resized = self.surface.sync_size()?;
        Ok(if resized { Action::RenderNeeded } else { Action::None })
    }

    // --- Render ---

    /// Draw one visible frame. With no tree, only clears.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn render(&mut self) -> Result<(), EngineError> {
        let core = &self.core;
        match core.scene() {
            Some(scene) => render::draw(&mut self.surface, scene.root(), core.selected_id, &core.camera, &core.config)?,
            None => self.surface.clear(RenderTarget::Screen, core.config.clear_color)?,
        }
        Ok(())
    }

    /// Load `root` and draw it once.
    ///
    /// # Errors
    ///
    /// See [`Self::set_tree`] and [`Self::render`].
    pub fn render_once(&mut self, root: ViewNode) -> Result<(), EngineError> {
        self.set_tree(root)?;
        self.render()
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> CameraState {
        self.core.camera()
    }
}

impl Engine<WebGlSurface> {
    /// Build an engine on an existing canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Surface`] if WebGL initialization fails and
    /// [`EngineError::Config`] for an invalid config.
    pub fn from_canvas(canvas: HtmlCanvasElement, config: ViewerConfig) -> Result<Self, EngineError> {
        Self::new(WebGlSurface::new(canvas)?, config)
    }

    /// Create a canvas inside `container`, draw `root` once, and return the
    /// engine for further interaction.
    ///
    /// # Errors
    ///
    /// Any initialization, tree, or render error.
    pub fn mount(container: &HtmlElement, root: ViewNode, config: ViewerConfig) -> Result<Self, EngineError> {
        let mut engine = Self::new(WebGlSurface::mount(container)?, config)?;
        engine.render_once(root)?;
        Ok(engine)
    }
}
