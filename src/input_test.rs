use super::*;

// =============================================================
// Button
// =============================================================

#[test]
fn button_from_dom_maps_standard_codes() {
    assert_eq!(Button::from_dom(0), Button::Primary);
    assert_eq!(Button::from_dom(1), Button::Middle);
    assert_eq!(Button::from_dom(2), Button::Secondary);
}

#[test]
fn button_from_dom_keeps_unknown_codes() {
    assert_eq!(Button::from_dom(3), Button::Other(3));
    assert_eq!(Button::from_dom(-1), Button::Other(-1));
}

#[test]
fn button_variants_distinct() {
    assert_ne!(Button::Primary, Button::Middle);
    assert_ne!(Button::Middle, Button::Secondary);
    assert_ne!(Button::Other(3), Button::Other(4));
}

// =============================================================
// InputEvent
// =============================================================

#[test]
fn drag_ending_events() {
    assert!(InputEvent::PointerUp.ends_drag());
    assert!(InputEvent::PointerLeave.ends_drag());
    assert!(InputEvent::FocusLost.ends_drag());
}

#[test]
fn other_events_do_not_end_drag() {
    let pos = Point::new(1.0, 2.0);
    assert!(!InputEvent::PointerDown { pos, button: Button::Primary }.ends_drag());
    assert!(!InputEvent::PointerMove { pos }.ends_drag());
    assert!(!InputEvent::Wheel { delta_y: 3.0 }.ends_drag());
    assert!(!InputEvent::Click { pos }.ends_drag());
    assert!(!InputEvent::Resize.ends_drag());
}

#[test]
fn input_event_debug_format() {
    let s = format!("{:?}", InputEvent::Wheel { delta_y: 1.5 });
    assert!(s.contains("Wheel"));
    assert!(s.contains("1.5"));
}
