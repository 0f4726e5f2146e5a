// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `ember-gl`.
//
// `ember-gl` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `ember-gl` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `ember-gl`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! An OpenGL backend for [`ember`] that uses the [`gl`] crate.
//!
//! [`GlContext`] implements [`ember::GpuContext`] on top of the global function pointers
//! that [`gl`] loads. Those pointers are shared by the whole process, so there is no point in
//! having more than one [`GlContext`] per OpenGL context. OpenGL 3.3 core (or anything that
//! provides the same entry points) is expected.
//!
//! [`gl`]: https://crates.io/crates/gl

use ember::{ShaderStage, Vertex};
use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};

use std::ffi::{c_void, CStr, CString};
use std::fmt;
use std::ptr;

/// Resolves an OpenGL function name to its address.
type Loader = Box<dyn FnMut(&str) -> *const c_void>;

/// An error reported by the OpenGL backend.
#[derive(Debug, thiserror::Error)]
#[error("gl error: {0}")]
pub struct GlError(String);

/// A vertex array object along with the buffers it reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlVertexArray {
    /// The vertex array object.
    vao: GLuint,

    /// The vertex buffer.
    vbo: GLuint,

    /// The index buffer.
    ebo: GLuint,
}

impl GlVertexArray {
    /// The name of the vertex array object.
    pub fn vao(&self) -> GLuint {
        self.vao
    }
}

/// A handle to the OpenGL context that is current on this thread.
pub struct GlContext {
    /// Resolves function pointers; taken once `setup` succeeds.
    loader: Option<Loader>,

    /// Whether to install a debug message callback during `setup`.
    debug_output: bool,
}

impl fmt::Debug for GlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("loaded", &self.loader.is_none())
            .field("debug_output", &self.debug_output)
            .finish()
    }
}

impl GlContext {
    /// Create a new [`GlContext`] that resolves OpenGL functions through `loader`.
    ///
    /// Nothing is loaded until [`ember::Renderer::setup`] (or [`ember::GpuContext::setup`])
    /// is called.
    ///
    /// # Safety
    ///
    /// `loader` must return valid function pointers for an OpenGL context. That context must
    /// be current on the calling thread whenever this value is used, including for the
    /// release of every resource created through it. It is never valid to use this value from
    /// another thread.
    pub unsafe fn new(loader: impl FnMut(&str) -> *const c_void + 'static) -> Self {
        Self {
            loader: Some(Box::new(loader)),
            debug_output: true,
        }
    }

    /// Set whether `setup` routes driver debug messages into [`tracing`].
    ///
    /// On by default. Has no effect on drivers without `glDebugMessageCallback`.
    ///
    /// [`tracing`]: https://crates.io/crates/tracing
    pub fn with_debug_output(mut self, debug_output: bool) -> Self {
        self.debug_output = debug_output;
        self
    }
}

impl ember::GpuContext for GlContext {
    type Shader = GLuint;
    type Program = GLuint;
    type UniformLocation = GLint;
    type VertexArray = GlVertexArray;
    type Error = GlError;

    fn setup(&mut self) -> Result<(), Self::Error> {
        let mut loader = match self.loader.take() {
            Some(loader) => loader,
            None => {
                tracing::warn!("OpenGL functions are already loaded");
                return Ok(());
            }
        };

        gl::load_with(|symbol| loader(symbol));

        if !gl::CreateProgram::is_loaded() || !gl::BindVertexArray::is_loaded() {
            // Keep the loader so that a later `setup` tries again.
            self.loader = Some(loader);

            return Err(GlError(
                "OpenGL 3.3 functions could not be loaded; is the context current?".into(),
            ));
        }

        if let Some(version) = gl_string(gl::VERSION) {
            tracing::debug!("loaded OpenGL {version}");
        }

        if self.debug_output {
            if gl::DebugMessageCallback::is_loaded() {
                unsafe {
                    gl::Enable(gl::DEBUG_OUTPUT);
                    gl::DebugMessageCallback(Some(debug_message_callback), ptr::null());
                }
            } else {
                tracing::debug!("glDebugMessageCallback is unavailable, debug output disabled");
            }
        }

        gl_error();
        Ok(())
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        let shader = unsafe { gl::CreateShader(shader_kind(stage)) };

        if shader == 0 {
            gl_error();
            return Err(GlError(format!("failed to create a {stage} shader")));
        }

        Ok(shader)
    }

    fn shader_source(&mut self, shader: &Self::Shader, source: &str) {
        // Pass the length explicitly so that the source does not need a nul terminator.
        let string = source.as_ptr() as *const GLchar;
        let length = source.len() as GLint;

        unsafe {
            gl::ShaderSource(*shader, 1, &string, &length);
        }
    }

    fn compile_shader(&mut self, shader: &Self::Shader) {
        unsafe {
            gl::CompileShader(*shader);
        }
    }

    fn shader_compile_status(&mut self, shader: &Self::Shader) -> bool {
        let mut status = gl::FALSE as GLint;

        unsafe {
            gl::GetShaderiv(*shader, gl::COMPILE_STATUS, &mut status);
        }

        status != gl::FALSE as GLint
    }

    fn shader_info_log(&mut self, shader: &Self::Shader) -> String {
        unsafe { info_log(*shader, gl::GetShaderiv, gl::GetShaderInfoLog) }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe {
            gl::DeleteShader(shader);
        }
    }

    fn create_program(&mut self) -> Result<Self::Program, Self::Error> {
        let program = unsafe { gl::CreateProgram() };

        if program == 0 {
            gl_error();
            return Err(GlError("failed to create a program".into()));
        }

        Ok(program)
    }

    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader) {
        unsafe {
            gl::AttachShader(*program, *shader);
        }
    }

    fn detach_shader(&mut self, program: &Self::Program, shader: &Self::Shader) {
        unsafe {
            gl::DetachShader(*program, *shader);
        }
    }

    fn link_program(&mut self, program: &Self::Program) {
        unsafe {
            gl::LinkProgram(*program);
        }
    }

    fn program_info_log(&mut self, program: &Self::Program) -> String {
        unsafe { info_log(*program, gl::GetProgramiv, gl::GetProgramInfoLog) }
    }

    fn validate_program(&mut self, program: &Self::Program) -> bool {
        let mut status = gl::FALSE as GLint;

        unsafe {
            gl::ValidateProgram(*program);
            gl::GetProgramiv(*program, gl::VALIDATE_STATUS, &mut status);
        }

        status != gl::FALSE as GLint
    }

    fn use_program(&mut self, program: Option<&Self::Program>) {
        unsafe {
            gl::UseProgram(program.copied().unwrap_or(0));
        }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe {
            gl::DeleteProgram(program);
        }

        gl_error();
    }

    fn uniform_location(
        &mut self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        // A name with a nul in it cannot name a uniform.
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(*program, name.as_ptr()) };

        (location != -1).then_some(location)
    }

    fn uniform_matrix_4(&mut self, location: &Self::UniformLocation, value: &[f32; 16]) {
        unsafe {
            gl::UniformMatrix4fv(*location, 1, gl::FALSE, value.as_ptr());
        }
    }

    fn uniform_3(&mut self, location: &Self::UniformLocation, [x, y, z]: [f32; 3]) {
        unsafe {
            gl::Uniform3f(*location, x, y, z);
        }
    }

    fn create_vertex_array(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self::VertexArray, Self::Error> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);

        unsafe {
            let mut vao = 0;
            gl::GenVertexArrays(1, &mut vao);

            let mut buffers = [0; 2];
            gl::GenBuffers(2, buffers.as_mut_ptr());
            let [vbo, ebo] = buffers;

            if vao == 0 || vbo == 0 || ebo == 0 {
                gl::DeleteVertexArrays(1, &vao);
                gl::DeleteBuffers(2, buffers.as_ptr());
                gl_error();

                return Err(GlError("failed to create a vertex array".into()));
            }

            gl::BindVertexArray(vao);

            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                vertex_bytes.len() as GLsizeiptr,
                vertex_bytes.as_ptr().cast(),
                gl::STATIC_DRAW,
            );

            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                index_bytes.len() as GLsizeiptr,
                index_bytes.as_ptr().cast(),
                gl::STATIC_DRAW,
            );

            // Location 0: vec3 position.
            gl::VertexAttribPointer(
                0,
                3,
                gl::FLOAT,
                gl::FALSE,
                std::mem::size_of::<Vertex>() as GLsizei,
                bytemuck::offset_of!(Vertex, pos) as *const c_void,
            );
            gl::EnableVertexAttribArray(0);

            // The element buffer binding is part of the VAO, so unbind the VAO first.
            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);

            gl_error();

            Ok(GlVertexArray { vao, vbo, ebo })
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray) {
        let GlVertexArray { vao, vbo, ebo } = vertex_array;

        unsafe {
            gl::DeleteVertexArrays(1, &vao);
            gl::DeleteBuffers(2, [vbo, ebo].as_ptr());
        }

        gl_error();
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<&Self::VertexArray>) {
        unsafe {
            gl::BindVertexArray(vertex_array.map_or(0, |array| array.vao));
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe {
            gl::Viewport(x, y, gl_size(width), gl_size(height));
        }
    }

    fn clear(&mut self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn draw_indexed_triangles(&mut self, count: u32) {
        unsafe {
            gl::DrawElements(
                gl::TRIANGLES,
                gl_size(count),
                gl::UNSIGNED_INT,
                ptr::null(),
            );
        }

        gl_error();
    }
}

/// Convert a size to `GLsizei`, saturating at `GLsizei::MAX`.
fn gl_size(size: u32) -> GLsizei {
    GLsizei::try_from(size).unwrap_or(GLsizei::MAX)
}

fn shader_kind(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

/// Read the information log of a shader or program.
unsafe fn info_log(
    object: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut len = 0;
    get_iv(object, gl::INFO_LOG_LENGTH, &mut len);

    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    let mut written = 0;
    get_log(object, len, &mut written, buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(written.max(0) as usize);

    String::from_utf8_lossy(&buf).into_owned()
}

fn gl_string(name: GLenum) -> Option<String> {
    let string = unsafe { gl::GetString(name) };

    if string.is_null() {
        None
    } else {
        let string = unsafe { CStr::from_ptr(string.cast()) };
        Some(string.to_string_lossy().into_owned())
    }
}

fn gl_error() {
    let err = unsafe { gl::GetError() };

    if err != gl::NO_ERROR {
        tracing::error!("GL error: {}", error_name(err));
    }
}

fn error_name(err: GLenum) -> &'static str {
    match err {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "Unknown GL error",
    }
}

fn debug_source_name(source: GLenum) -> &'static str {
    match source {
        gl::DEBUG_SOURCE_API => "API",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        gl::DEBUG_SOURCE_APPLICATION => "Application",
        gl::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    }
}

fn debug_type_name(ty: GLenum) -> &'static str {
    match ty {
        gl::DEBUG_TYPE_ERROR => "Error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        gl::DEBUG_TYPE_PORTABILITY => "Portability",
        gl::DEBUG_TYPE_PERFORMANCE => "Performance",
        gl::DEBUG_TYPE_MARKER => "Marker",
        gl::DEBUG_TYPE_OTHER => "Other",
        _ => "Unknown",
    }
}

extern "system" fn debug_message_callback(
    source: GLenum,
    ty: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    _user_param: *mut c_void,
) {
    let source = debug_source_name(source);
    let ty = debug_type_name(ty);

    let message = if message.is_null() || length < 0 {
        String::new()
    } else {
        let bytes = unsafe { std::slice::from_raw_parts(message as *const u8, length as usize) };
        String::from_utf8_lossy(bytes).into_owned()
    };

    match severity {
        gl::DEBUG_SEVERITY_HIGH => {
            tracing::error!("{ty}-{id} ({source}): {message}");
        }
        gl::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!("{ty}-{id} ({source}): {message}");
        }
        gl::DEBUG_SEVERITY_LOW => {
            tracing::info!("{ty}-{id} ({source}): {message}");
        }
        gl::DEBUG_SEVERITY_NOTIFICATION => {
            tracing::debug!("{ty}-{id} ({source}): {message}");
        }
        _ => (),
    };
}
