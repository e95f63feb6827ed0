use super::*;

// Only the context-free parts are testable off the browser.

#[test]
fn picking_depth_buffer_is_packed_depth_stencil() {
    assert_eq!(PICK_DEPTH_FORMAT, Gl::DEPTH_STENCIL);
    assert_eq!(PICK_DEPTH_ATTACHMENT, Gl::DEPTH_STENCIL_ATTACHMENT);
    assert_ne!(PICK_DEPTH_FORMAT, Gl::DEPTH_COMPONENT16);
}

#[test]
fn fragment_shader_prefers_high_precision() {
    assert!(FRAGMENT_SHADER.contains("precision highp float"));
    assert!(FRAGMENT_SHADER.contains("u_highlight_mix"));
}

#[test]
fn vertex_shader_declares_program_inputs() {
    for name in ["a_position", "u_matrix"] {
        assert!(VERTEX_SHADER.contains(name), "{name}");
    }
}

#[test]
fn gl_casts_saturate() {
    assert_eq!(gl_dim(640), 640);
    assert_eq!(gl_dim(u32::MAX), i32::MAX);
    assert_eq!(gl_enum(Gl::RGBA), 0x1908);
}
