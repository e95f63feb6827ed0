//! [`GpuSurface`] over a WebGL 1 context.
//!
//! This module is the only place that touches [`web_sys::WebGlRenderingContext`].
//! One program, one vertex buffer, and one off-screen framebuffer (RGBA
//! texture plus a packed depth-stencil renderbuffer) serve both passes. The
//! picking framebuffer is reallocated whenever the backing store is resized.
//!
//! Depth precision: the picking pass must resolve occlusion exactly as the
//! canvas does, and adjacent tree depths are only `depth_step` apart at an
//! orbit distance of hundreds of units. A `DEPTH_COMPONENT16` buffer cannot
//! separate them, so the picking target uses `DEPTH_STENCIL`, which browsers
//! back with 24 depth bits, the same as the default drawing buffer. Both
//! depths are queried at startup and a shallower picking buffer is logged
//! as a warning.
//!
//! All fallible WebGL calls are mapped into [`SurfaceError`]; nothing here
//! retries or recovers.

use glam::Mat4;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, HtmlElement, WebGlBuffer, WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer,
    WebGlRenderingContext as Gl, WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use crate::color::Rgba;
use crate::projector::QuadVertices;
use crate::surface::{GpuSurface, Highlight, RenderTarget, SurfaceError, SurfaceSize};

#[cfg(test)]
#[path = "webgl_test.rs"]
mod webgl_test;

const VERTEX_SHADER: &str = r"
attribute vec3 a_position;
uniform mat4 u_matrix;
void main() {
  gl_Position = u_matrix * vec4(a_position, 1.0);
}
";

// Highp where available: picking colors must survive the fragment stage exactly.
const FRAGMENT_SHADER: &str = r"
#ifdef GL_FRAGMENT_PRECISION_HIGH
precision highp float;
#else
precision mediump float;
#endif
uniform vec4 u_color;
uniform vec4 u_highlight_color;
uniform float u_highlight_mix;
void main() {
  gl_FragColor = vec4(mix(u_color.rgb, u_highlight_color.rgb, u_highlight_mix), u_color.a);
}
";

/// Renderbuffer format of the picking depth buffer.
const PICK_DEPTH_FORMAT: u32 = Gl::DEPTH_STENCIL;
/// Attachment point matching [`PICK_DEPTH_FORMAT`].
const PICK_DEPTH_ATTACHMENT: u32 = Gl::DEPTH_STENCIL_ATTACHMENT;

/// Off-screen color + depth target for the picking pass.
struct PickTarget {
    framebuffer: WebGlFramebuffer,
    texture: WebGlTexture,
    depth: WebGlRenderbuffer,
    size: SurfaceSize,
}

impl PickTarget {
    fn new(gl: &Gl, size: SurfaceSize) -> Result<Self, SurfaceError> {
        let width = gl_dim(size.width.max(1));
        let height = gl_dim(size.height.max(1));

        let texture = gl.create_texture().ok_or(SurfaceError::Allocation("picking texture"))?;
        gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            Gl::TEXTURE_2D,
            0,
            gl_enum(Gl::RGBA),
            width,
            height,
            0,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            None,
        )
        .map_err(|e| SurfaceError::Gpu(format!("picking texture upload: {e:?}")))?;
        for (pname, param) in [
            (Gl::TEXTURE_MIN_FILTER, Gl::NEAREST),
            (Gl::TEXTURE_MAG_FILTER, Gl::NEAREST),
            (Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE),
            (Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE),
        ] {
            gl.tex_parameteri(Gl::TEXTURE_2D, pname, gl_enum(param));
        }

        let depth = gl.create_renderbuffer().ok_or(SurfaceError::Allocation("picking depth buffer"))?;
        gl.bind_renderbuffer(Gl::RENDERBUFFER, Some(&depth));
        gl.renderbuffer_storage(Gl::RENDERBUFFER, PICK_DEPTH_FORMAT, width, height);

        let framebuffer = gl.create_framebuffer().ok_or(SurfaceError::Allocation("picking framebuffer"))?;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(Gl::FRAMEBUFFER, Gl::COLOR_ATTACHMENT0, Gl::TEXTURE_2D, Some(&texture), 0);
        gl.framebuffer_renderbuffer(Gl::FRAMEBUFFER, PICK_DEPTH_ATTACHMENT, Gl::RENDERBUFFER, Some(&depth));
        let status = gl.check_framebuffer_status(Gl::FRAMEBUFFER);

        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        gl.bind_renderbuffer(Gl::RENDERBUFFER, None);
        gl.bind_texture(Gl::TEXTURE_2D, None);

        let target = Self { framebuffer, texture, depth, size };
        if status != Gl::FRAMEBUFFER_COMPLETE {
            target.delete(gl);
            return Err(SurfaceError::Gpu(format!("picking framebuffer incomplete: 0x{status:04x}")));
        }
        Ok(target)
    }

    fn delete(&self, gl: &Gl) {
        gl.delete_framebuffer(Some(&self.framebuffer));
        gl.delete_texture(Some(&self.texture));
        gl.delete_renderbuffer(Some(&self.depth));
    }
}

/// Uniform locations of the quad program.
struct Uniforms {
    matrix: WebGlUniformLocation,
    color: WebGlUniformLocation,
    highlight_color: WebGlUniformLocation,
    highlight_mix: WebGlUniformLocation,
}

/// A WebGL-backed surface bound to one canvas element.
pub struct WebGlSurface {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    vertex_buffer: WebGlBuffer,
    a_position: u32,
    uniforms: Uniforms,
    pick_target: PickTarget,
}

impl std::fmt::Debug for WebGlSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebGlSurface")
            .field("backing_size", &self.backing_size())
            .field("pick_size", &self.pick_target.size)
            .finish_non_exhaustive()
    }
}

impl WebGlSurface {
    /// Acquire a WebGL context from `canvas` and build the program, buffer,
    /// and picking target.
    ///
    /// # Errors
    ///
    /// Returns an initialization [`SurfaceError`] if WebGL is unavailable, a
    /// shader fails to compile or link, or a GPU resource cannot be created.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let gl = canvas
            .get_context("webgl")
            .map_err(|e| SurfaceError::ContextUnavailable(format!("{e:?}")))?
            .ok_or_else(|| SurfaceError::ContextUnavailable("WebGL not supported".to_owned()))?
            .dyn_into::<Gl>()
            .map_err(|_| SurfaceError::ContextUnavailable("context is not a WebGlRenderingContext".to_owned()))?;

        let vs = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vs, &fs);
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));
        let program = program?;
        gl.use_program(Some(&program));

        let a_position = u32::try_from(gl.get_attrib_location(&program, "a_position"))
            .map_err(|_| SurfaceError::ProgramLink("attribute a_position not found".to_owned()))?;
        let uniform = |name: &str| {
            gl.get_uniform_location(&program, name)
                .ok_or_else(|| SurfaceError::ProgramLink(format!("uniform {name} not found")))
        };
        let uniforms = Uniforms {
            matrix: uniform("u_matrix")?,
            color: uniform("u_color")?,
            highlight_color: uniform("u_highlight_color")?,
            highlight_mix: uniform("u_highlight_mix")?,
        };

        let vertex_buffer = gl.create_buffer().ok_or(SurfaceError::Allocation("vertex buffer"))?;

        gl.enable(Gl::DEPTH_TEST);
        gl.depth_func(Gl::LEQUAL);

        let size = SurfaceSize::new(canvas.width(), canvas.height());
        gl.viewport(0, 0, gl_dim(size.width), gl_dim(size.height));
        let pick_target = PickTarget::new(&gl, size)?;

        let screen_depth = depth_bits(&gl);
        gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&pick_target.framebuffer));
        let pick_depth = depth_bits(&gl);
        gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
        if let (Some(screen), Some(pick)) = (screen_depth, pick_depth) {
            if pick < screen {
                warn!(screen, pick, "picking depth buffer is shallower than the canvas; picks may disagree on close layers");
            }
        }

        info!(width = size.width, height = size.height, ?screen_depth, ?pick_depth, "webgl surface initialized");
        Ok(Self { canvas, gl, program, vertex_buffer, a_position, uniforms, pick_target })
    }

    /// Create a canvas filling `container`, append it, and build a surface on it.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ContextUnavailable`] if the document or canvas
    /// element cannot be created, plus any error from [`Self::new`].
    pub fn mount(container: &HtmlElement) -> Result<Self, SurfaceError> {
        let unavailable = |what: &str| SurfaceError::ContextUnavailable(what.to_owned());
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| unavailable("no document"))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|e| SurfaceError::ContextUnavailable(format!("{e:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| unavailable("created element is not a canvas"))?;

        canvas.set_width(u32::try_from(container.client_width()).unwrap_or(0));
        canvas.set_height(u32::try_from(container.client_height()).unwrap_or(0));
        container
            .append_child(&canvas)
            .map_err(|e| SurfaceError::ContextUnavailable(format!("{e:?}")))?;
        Self::new(canvas)
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn bind(&self, target: RenderTarget) {
        let size = match target {
            RenderTarget::Screen => {
                self.gl.bind_framebuffer(Gl::FRAMEBUFFER, None);
                self.gl.enable(Gl::DITHER);
                self.backing_size()
            }
            RenderTarget::Picking => {
                self.gl.bind_framebuffer(Gl::FRAMEBUFFER, Some(&self.pick_target.framebuffer));
                self.gl.disable(Gl::DITHER);
                self.pick_target.size
            }
        };
        self.gl.viewport(0, 0, gl_dim(size.width), gl_dim(size.height));
    }
}

impl GpuSurface for WebGlSurface {
    fn backing_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width(), self.canvas.height())
    }

    fn logical_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            u32::try_from(self.canvas.client_width()).unwrap_or(0),
            u32::try_from(self.canvas.client_height()).unwrap_or(0),
        )
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), SurfaceError> {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
        self.gl.viewport(0, 0, gl_dim(size.width), gl_dim(size.height));

        let next = PickTarget::new(&self.gl, size)?;
        std::mem::replace(&mut self.pick_target, next).delete(&self.gl);
        info!(width = size.width, height = size.height, "webgl surface resized");
        Ok(())
    }

    fn clear(&mut self, target: RenderTarget, color: Rgba) -> Result<(), SurfaceError> {
        self.bind(target);
        self.gl.clear_color(color.r, color.g, color.b, color.a);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        Ok(())
    }

    fn draw_colored_quad(
        &mut self,
        target: RenderTarget,
        vertices: &QuadVertices,
        matrix: &Mat4,
        color: Rgba,
        highlight: Option<Highlight>,
    ) -> Result<(), SurfaceError> {
        self.bind(target);
        let gl = &self.gl;

        let flat: Vec<f32> = vertices.iter().flatten().copied().collect();
        let data = js_sys::Float32Array::from(flat.as_slice());
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.vertex_buffer));
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &data, Gl::DYNAMIC_DRAW);
        gl.enable_vertex_attrib_array(self.a_position);
        gl.vertex_attrib_pointer_with_i32(self.a_position, 3, Gl::FLOAT, false, 0, 0);

        let (tint, mix) = highlight.map_or((Rgba::TRANSPARENT, 0.0), |h| (h.color, h.mix));
        gl.uniform_matrix4fv_with_f32_array(Some(&self.uniforms.matrix), false, &matrix.to_cols_array());
        gl.uniform4fv_with_f32_array(Some(&self.uniforms.color), &color.to_array());
        gl.uniform4fv_with_f32_array(Some(&self.uniforms.highlight_color), &tint.to_array());
        gl.uniform1f(Some(&self.uniforms.highlight_mix), mix);

        gl.draw_arrays(Gl::TRIANGLES, 0, 6);
        Ok(())
    }

    fn read_pixel(&mut self, x: u32, y: u32, target: RenderTarget) -> Result<[u8; 4], SurfaceError> {
        let size = match target {
            RenderTarget::Screen => self.backing_size(),
            RenderTarget::Picking => self.pick_target.size,
        };
        if x >= size.width || y >= size.height {
            return Err(SurfaceError::PixelOutOfBounds { x, y, width: size.width, height: size.height });
        }

        self.bind(target);
        let mut pixel = [0_u8; 4];
        self.gl
            .read_pixels_with_opt_u8_array(gl_dim(x), gl_dim(y), 1, 1, Gl::RGBA, Gl::UNSIGNED_BYTE, Some(&mut pixel[..]))
            .map_err(|e| SurfaceError::Gpu(format!("readPixels: {e:?}")))?;
        match self.gl.get_error() {
            Gl::NO_ERROR => Ok(pixel),
            code => Err(SurfaceError::Gpu(format!("readPixels failed: 0x{code:04x}"))),
        }
    }
}

impl Drop for WebGlSurface {
    fn drop(&mut self) {
        self.pick_target.delete(&self.gl);
        self.gl.delete_buffer(Some(&self.vertex_buffer));
        self.gl.delete_program(Some(&self.program));
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, SurfaceError> {
    let shader = gl.create_shader(kind).ok_or(SurfaceError::Allocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false) {
        return Ok(shader);
    }
    let log = gl.get_shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(Some(&shader));
    Err(SurfaceError::ShaderCompile(log))
}

fn link_program(gl: &Gl, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram, SurfaceError> {
    let program = gl.create_program().ok_or(SurfaceError::Allocation("program"))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false) {
        return Ok(program);
    }
    let log = gl.get_program_info_log(&program).unwrap_or_default();
    gl.delete_program(Some(&program));
    Err(SurfaceError::ProgramLink(log))
}

/// `DEPTH_BITS` of the bound framebuffer.
fn depth_bits(gl: &Gl) -> Option<f64> {
    match gl.get_parameter(Gl::DEPTH_BITS) {
        Ok(bits) => bits.as_f64(),
        Err(e) => {
            warn!(error = ?e, "DEPTH_BITS query failed");
            None
        }
    }
}

/// Pixel dimensions as the `GLsizei`/`GLint` WebGL expects.
fn gl_dim(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// A `GLenum` passed where WebGL's IDL takes `GLint`.
fn gl_enum(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
