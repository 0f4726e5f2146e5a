// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `ember`.
//
// `ember` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `ember` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `ember`. If not, see <https://www.gnu.org/licenses/>.

//! Defines the GPU backend for ember.

use std::error::Error;
use std::fmt;

/// The backend for the renderer.
///
/// This is the set of primitives the rest of the crate needs from an immediate-mode graphics
/// context. Every call is expected to execute against the context that is current on the
/// calling thread, before the call returns.
pub trait GpuContext {
    /// The type associated with a single compiled shader stage.
    type Shader;

    /// The type associated with a linked shader program.
    type Program;

    /// The location of a uniform inside of a linked program.
    type UniformLocation;

    /// The type associated with a GPU vertex array.
    ///
    /// Contains vertices, indices and any layout data.
    type VertexArray;

    /// The error type associated with this GPU context.
    type Error: Error + Send + Sync + 'static;

    /// Initialize the context's function table and diagnostics.
    ///
    /// This is called once, after the underlying context has been made current and before
    /// any other call.
    fn setup(&mut self) -> Result<(), Self::Error>;

    /// Create a new, empty shader object for the given stage.
    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, Self::Error>;

    /// Replace the source code of a shader.
    fn shader_source(&mut self, shader: &Self::Shader, source: &str);

    /// Compile a shader from its current source.
    fn compile_shader(&mut self, shader: &Self::Shader);

    /// Whether the last compilation of this shader succeeded.
    fn shader_compile_status(&mut self, shader: &Self::Shader) -> bool;

    /// Get the information log of a shader.
    fn shader_info_log(&mut self, shader: &Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&mut self, shader: Self::Shader);

    /// Create a new, empty program object.
    fn create_program(&mut self) -> Result<Self::Program, Self::Error>;

    /// Attach a shader to a program.
    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);

    /// Detach a shader from a program.
    fn detach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);

    /// Link the shaders attached to a program.
    fn link_program(&mut self, program: &Self::Program);

    /// Get the information log of a program.
    fn program_info_log(&mut self, program: &Self::Program) -> String;

    /// Validate a program against the current context state, returning the validation status.
    fn validate_program(&mut self, program: &Self::Program) -> bool;

    /// Make a program current, or clear the current program with `None`.
    fn use_program(&mut self, program: Option<&Self::Program>);

    /// Delete a program object.
    fn delete_program(&mut self, program: Self::Program);

    /// Look up a uniform by name.
    ///
    /// Returns `None` if the linked program has no active uniform with that name.
    fn uniform_location(
        &mut self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Upload a column-major 4x4 matrix to a uniform of the current program.
    fn uniform_matrix_4(&mut self, location: &Self::UniformLocation, value: &[f32; 16]);

    /// Upload a three component vector to a uniform of the current program.
    fn uniform_3(&mut self, location: &Self::UniformLocation, value: [f32; 3]);

    /// Create a vertex array containing the given vertices and indices.
    ///
    /// The indices must be valid for the vertices given; however, it is up to the GPU
    /// implementation to actually check this.
    fn create_vertex_array(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self::VertexArray, Self::Error>;

    /// Delete a vertex array and the buffers behind it.
    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);

    /// Make a vertex array current, or clear the current vertex array with `None`.
    fn bind_vertex_array(&mut self, vertex_array: Option<&Self::VertexArray>);

    /// Set the viewport rectangle.
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear the color buffer with the given RGBA color.
    fn clear(&mut self, color: [f32; 4]);

    /// Draw `count` indices from the current vertex array as a list of triangles.
    fn draw_indexed_triangles(&mut self, count: u32);
}

/// The pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,

    /// Runs once per rasterized fragment.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The vertex type uploaded by [`Geometry::new`](crate::Geometry::new).
///
/// Bound to attribute location zero as a `vec3`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// The position of the vertex.
    pub pos: [f32; 3],
}

impl Vertex {
    /// Create a vertex at the given position.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { pos: [x, y, z] }
    }
}
