#![allow(clippy::float_cmp)]

use super::*;
use crate::software::SoftwareSurface;
use crate::surface::SurfaceSize;
use crate::tree::Bounds;

// =============================================================
// Helpers
// =============================================================

/// Root 1 spans ±100 at z=0; child 7 spans ±20 at z=10.
fn target_tree() -> ViewNode {
    ViewNode::new(1, Bounds::new(-100.0, -100.0, 100.0, 100.0))
        .with_color("#336699")
        .with_children(vec![ViewNode::new(7, Bounds::new(-20.0, -20.0, 20.0, 20.0)).with_color("#ff0000")])
}

fn engine() -> Engine<SoftwareSurface> {
    let mut engine = Engine::new(SoftwareSurface::new(200, 200), ViewerConfig::default()).unwrap();
    engine.set_tree(target_tree()).unwrap();
    engine
}

const CENTER: Point = Point { x: 100.0, y: 100.0 };
const CORNER: Point = Point { x: 5.0, y: 5.0 };

// =============================================================
// EngineCore: tree
// =============================================================

#[test]
fn core_starts_empty() {
    let core = EngineCore::default();
    assert!(core.scene().is_none());
    assert_eq!(core.selection(), None);
    assert_eq!(core.camera().distance, 400.0);
}

#[test]
fn core_validates_config() {
    assert!(EngineCore::new(ViewerConfig::default()).is_ok());
    let inverted = ViewerConfig { min_distance: 3000.0, ..ViewerConfig::default() };
    assert!(matches!(EngineCore::new(inverted), Err(ConfigError::Invalid(_))));
}

#[test]
fn set_tree_builds_index() {
    let mut core = EngineCore::default();
    core.set_tree(target_tree()).unwrap();
    assert_eq!(core.scene().map(Scene::len), Some(2));
}

#[test]
fn set_tree_keeps_selection_still_present() {
    let mut core = EngineCore::default();
    core.set_tree(target_tree()).unwrap();
    core.selected_id = Some(7);
    core.set_tree(target_tree()).unwrap();
    assert_eq!(core.selection(), Some(7));
    assert_eq!(core.selected_node().map(|n| n.id), Some(7));
}

#[test]
fn set_tree_drops_stale_selection() {
    let mut core = EngineCore::default();
    core.set_tree(target_tree()).unwrap();
    core.selected_id = Some(7);
    core.set_tree(ViewNode::new(1, Bounds::default())).unwrap();
    assert_eq!(core.selection(), None);
}

#[test]
fn rejected_tree_keeps_previous() {
    let mut core = EngineCore::default();
    core.set_tree(target_tree()).unwrap();
    let bad = ViewNode::new(1, Bounds::default()).with_children(vec![ViewNode::new(1 << 24, Bounds::default())]);
    assert_eq!(core.set_tree(bad), Err(TreeError::IdOverflow { id: 1 << 24 }));
    assert!(core.scene().is_some_and(|s| s.contains(7)));
}

#[test]
fn clear_tree_drops_scene_and_selection() {
    let mut core = EngineCore::default();
    core.set_tree(target_tree()).unwrap();
    core.selected_id = Some(1);
    core.clear_tree();
    assert!(core.scene().is_none());
    assert_eq!(core.selection(), None);
}

// =============================================================
// EngineCore: input
// =============================================================

#[test]
fn rotate_drag_requests_render() {
    let mut core = EngineCore::default();
    assert_eq!(core.handle(InputEvent::PointerDown { pos: Point::new(0.0, 0.0), button: Button::Primary }), Action::None);
    assert_eq!(core.handle(InputEvent::PointerMove { pos: Point::new(10.0, 0.0) }), Action::RenderNeeded);
    assert!((core.camera.angle_y - 0.1).abs() < 1e-12);
    assert_eq!(core.handle(InputEvent::PointerUp), Action::None);
    assert_eq!(core.handle(InputEvent::PointerMove { pos: Point::new(50.0, 0.0) }), Action::None);
}

#[test]
fn unknown_button_then_move_is_noop() {
    let mut core = EngineCore::default();
    core.handle(InputEvent::PointerDown { pos: Point::new(0.0, 0.0), button: Button::Other(3) });
    assert_eq!(core.handle(InputEvent::PointerMove { pos: Point::new(30.0, 40.0) }), Action::None);
    let cam = core.camera();
    assert_eq!((cam.angle_x, cam.angle_y, cam.offset_x, cam.offset_y), (0.0, 0.0, 0.0, 0.0));
}

#[test]
fn leave_and_blur_end_drag() {
    let mut core = EngineCore::default();
    core.handle(InputEvent::PointerDown { pos: Point::new(0.0, 0.0), button: Button::Middle });
    core.handle(InputEvent::PointerLeave);
    assert!(!core.camera.is_dragging());
    core.handle(InputEvent::PointerDown { pos: Point::new(0.0, 0.0), button: Button::Primary });
    core.handle(InputEvent::FocusLost);
    assert!(!core.camera.is_dragging());
}

#[test]
fn wheel_requests_render_until_clamped() {
    let mut core = EngineCore::default();
    assert_eq!(core.handle(InputEvent::Wheel { delta_y: 1.0e6 }), Action::RenderNeeded);
    assert_eq!(core.camera.distance, 2000.0);
    assert_eq!(core.handle(InputEvent::Wheel { delta_y: 10.0 }), Action::None);
}

#[test]
fn core_ignores_surface_events() {
    let mut core = EngineCore::default();
    assert_eq!(core.handle(InputEvent::Click { pos: CENTER }), Action::None);
    assert_eq!(core.handle(InputEvent::Resize), Action::None);
}

// =============================================================
// EngineCore: selection
// =============================================================

#[test]
fn apply_pick_sets_and_clears() {
    let mut core = EngineCore::default();
    assert_eq!(core.apply_pick(PickOutcome::Hit(4)), Action::SelectionChanged(Some(4)));
    assert_eq!(core.apply_pick(PickOutcome::Hit(4)), Action::None);
    assert_eq!(core.apply_pick(PickOutcome::Ignored), Action::None);
    assert_eq!(core.selection(), Some(4));
    assert_eq!(core.apply_pick(PickOutcome::Miss), Action::SelectionChanged(None));
}

#[test]
fn resolve_checks_index() {
    let mut core = EngineCore::default();
    assert_eq!(core.resolve(Some(7)), PickOutcome::Miss);
    core.set_tree(target_tree()).unwrap();
    assert_eq!(core.resolve(Some(7)), PickOutcome::Hit(7));
    assert_eq!(core.resolve(Some(99)), PickOutcome::Miss);
    assert_eq!(core.resolve(None), PickOutcome::Miss);
}

// =============================================================
// Engine: construction
// =============================================================

#[test]
fn engine_rejects_invalid_config() {
    let config = ViewerConfig { min_distance: 10.0, max_distance: 5.0, ..ViewerConfig::default() };
    let result = Engine::new(SoftwareSurface::new(10, 10), config);
    assert!(matches!(result, Err(EngineError::Config(_))));
}

// =============================================================
// Engine: click / pick
// =============================================================

#[test]
fn click_selects_node_under_cursor() {
    let mut engine = engine();
    assert_eq!(engine.handle(InputEvent::Click { pos: CENTER }).unwrap(), Action::SelectionChanged(Some(7)));
    assert_eq!(engine.selection(), Some(7));
}

#[test]
fn click_on_background_clears_selection() {
    let mut engine = engine();
    engine.on_click(CENTER).unwrap();
    assert_eq!(engine.on_click(CORNER).unwrap(), PickOutcome::Miss);
    assert_eq!(engine.selection(), None);
}

#[test]
fn repeated_click_reports_no_change() {
    let mut engine = engine();
    engine.handle(InputEvent::Click { pos: CENTER }).unwrap();
    assert_eq!(engine.handle(InputEvent::Click { pos: CENTER }).unwrap(), Action::None);
    assert_eq!(engine.selection(), Some(7));
}

#[test]
fn click_while_dragging_is_ignored() {
    let mut engine = engine();
    engine.on_click(CENTER).unwrap();
    engine.surface_mut().reset_stats();

    engine.handle(InputEvent::PointerDown { pos: CORNER, button: Button::Primary }).unwrap();
    assert_eq!(engine.on_click(CORNER).unwrap(), PickOutcome::Ignored);
    assert_eq!(engine.handle(InputEvent::Click { pos: CORNER }).unwrap(), Action::None);

    assert_eq!(engine.selection(), Some(7));
    let stats = engine.surface().stats();
    assert_eq!(stats.picking_clears, 0);
    assert_eq!(stats.picking_draws, 0);
    assert_eq!(stats.readbacks, 0);
}

#[test]
fn click_after_drag_ends_picks_again() {
    let mut engine = engine();
    engine.handle(InputEvent::PointerDown { pos: CENTER, button: Button::Primary }).unwrap();
    engine.handle(InputEvent::PointerUp).unwrap();
    assert_eq!(engine.on_click(CENTER).unwrap(), PickOutcome::Hit(7));
}

#[test]
fn click_clamps_outside_coordinates() {
    let mut engine = engine();
    engine.on_click(CENTER).unwrap();
    assert_eq!(engine.on_click(Point::new(-500.0, 9000.0)).unwrap(), PickOutcome::Miss);
}

#[test]
fn click_without_tree_misses() {
    let mut engine = Engine::new(SoftwareSurface::new(50, 50), ViewerConfig::default()).unwrap();
    assert_eq!(engine.on_click(CENTER).unwrap(), PickOutcome::Miss);
    assert_eq!(engine.surface().stats().picking_draws, 0);
}

#[test]
fn click_follows_rotation() {
    let mut engine = engine();
    // Half a turn of yaw puts the camera behind the root; the child is then hidden.
    engine.core.camera.angle_y = std::f64::consts::PI;
    assert_eq!(engine.on_click(CENTER).unwrap(), PickOutcome::Hit(1));
}

#[test]
fn picked_node_is_highlighted_on_next_render() {
    let mut engine = engine();
    engine.on_click(CENTER).unwrap();
    engine.render().unwrap();
    let pixel = engine.surface().pixel(100, 100, RenderTarget::Screen).unwrap();
    assert_eq!(pixel, [255, 102, 0, 255]);
}

// =============================================================
// Engine: resize / render
// =============================================================

#[test]
fn resize_to_same_size_is_noop() {
    let mut engine = engine();
    assert_eq!(engine.handle(InputEvent::Resize).unwrap(), Action::None);
    assert_eq!(engine.surface().stats().resizes, 0);
}

#[test]
fn resize_follows_layout() {
    let mut engine = engine();
    engine.surface_mut().set_logical_size(SurfaceSize::new(320, 240));
    assert_eq!(engine.on_resize().unwrap(), Action::RenderNeeded);
    assert_eq!(engine.surface().backing_size(), SurfaceSize::new(320, 240));
    assert_eq!(engine.surface().stats().resizes, 1);
}

#[test]
fn render_without_tree_only_clears() {
    let mut engine = Engine::new(SoftwareSurface::new(10, 10), ViewerConfig::default()).unwrap();
    engine.render().unwrap();
    let stats = engine.surface().stats();
    assert_eq!(stats.screen_clears, 1);
    assert_eq!(stats.screen_draws, 0);
}

#[test]
fn render_once_loads_and_draws() {
    let mut engine = Engine::new(SoftwareSurface::new(200, 200), ViewerConfig::default()).unwrap();
    engine.render_once(target_tree()).unwrap();
    assert_eq!(engine.surface().stats().screen_draws, 2);
    assert_eq!(engine.surface().pixel(100, 100, RenderTarget::Screen).unwrap(), [255, 0, 0, 255]);
}

#[test]
fn render_once_rejects_overflowing_tree() {
    let mut engine = Engine::new(SoftwareSurface::new(20, 20), ViewerConfig::default()).unwrap();
    let err = engine.render_once(ViewNode::new(1 << 30, Bounds::default())).unwrap_err();
    assert!(matches!(err, EngineError::Tree(TreeError::IdOverflow { .. })));
    assert_eq!(engine.surface().stats().screen_draws, 0);
}
