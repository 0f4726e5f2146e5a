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

//! A GPU context that records what it is asked to do instead of doing it.

#![allow(dead_code)]

use ember::{GpuContext, ShaderStage, Vertex};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub const VERTEX_SOURCE: &str = include_str!("../shaders/flat.vsh");
pub const FRAGMENT_SOURCE: &str = include_str!("../shaders/flat.fsh");

/// Install a subscriber that prints through the test harness.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A GPU call, as seen by the fake context.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Setup,
    CreateShader(u32, ShaderStage),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    ValidateProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    UniformMatrix4(i32, [f32; 16]),
    Uniform3(i32, [f32; 3]),
    CreateVertexArray(u32, usize),
    DeleteVertexArray(u32),
    BindVertexArray(Option<u32>),
    Viewport(i32, i32, u32, u32),
    Clear([f32; 4]),
    DrawIndexedTriangles(u32),
}

#[derive(Debug)]
pub struct FakeError(pub &'static str);

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FakeError {}

/// A context with no GPU behind it.
///
/// Object names are handed out from a single counter, like a real driver would, and the
/// context keeps track of which of them are alive and which are current.
#[derive(Debug, Default)]
pub struct RecordingContext {
    /// Every call made, in order.
    pub calls: Vec<Call>,

    /// Stages whose sources fail to compile.
    pub failing_stages: Vec<ShaderStage>,

    /// What the program info log says after linking.
    pub link_log: String,

    /// Whether validation passes.
    pub invalid: bool,

    /// Refuse to create programs.
    pub out_of_programs: bool,

    /// Refuse to set up.
    pub fail_setup: bool,

    /// Names of the uniforms every linked program exposes.
    pub uniforms: Vec<&'static str>,

    pub current_program: Option<u32>,
    pub current_vertex_array: Option<u32>,
    pub live_shaders: BTreeSet<u32>,
    pub live_programs: BTreeSet<u32>,
    pub live_vertex_arrays: BTreeSet<u32>,

    validation_failed: bool,
    stages: HashMap<u32, ShaderStage>,
    next_name: u32,
}

impl RecordingContext {
    /// A context whose programs expose the uniforms used by the test shaders.
    pub fn new() -> Self {
        Self {
            uniforms: vec!["projection", "model", "diffuseColour"],
            ..Self::default()
        }
    }

    /// Only the calls for which `f` returns true.
    pub fn calls_matching(&self, f: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls.iter().filter(|call| f(call)).cloned().collect()
    }

    /// The number of draw calls issued.
    pub fn draw_count(&self) -> usize {
        self.calls_matching(|call| matches!(call, Call::DrawIndexedTriangles(_)))
            .len()
    }

    fn name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

impl GpuContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = i32;
    type VertexArray = u32;
    type Error = FakeError;

    fn setup(&mut self) -> Result<(), Self::Error> {
        if self.fail_setup {
            return Err(FakeError("no function pointers"));
        }

        self.calls.push(Call::Setup);
        Ok(())
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, Self::Error> {
        let shader = self.name();
        self.stages.insert(shader, stage);
        self.live_shaders.insert(shader);
        self.calls.push(Call::CreateShader(shader, stage));
        Ok(shader)
    }

    fn shader_source(&mut self, shader: &u32, _source: &str) {
        self.calls.push(Call::ShaderSource(*shader));
    }

    fn compile_shader(&mut self, shader: &u32) {
        self.calls.push(Call::CompileShader(*shader));
    }

    fn shader_compile_status(&mut self, shader: &u32) -> bool {
        !self.failing_stages.contains(&self.stages[shader])
    }

    fn shader_info_log(&mut self, shader: &u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            format!("0:1: error: {} stage is broken", self.stages[shader])
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.live_shaders.remove(&shader);
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, Self::Error> {
        if self.out_of_programs {
            return Err(FakeError("out of memory"));
        }

        let program = self.name();
        self.live_programs.insert(program);
        self.calls.push(Call::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&mut self, program: &u32, shader: &u32) {
        self.calls.push(Call::AttachShader(*program, *shader));
    }

    fn detach_shader(&mut self, program: &u32, shader: &u32) {
        self.calls.push(Call::DetachShader(*program, *shader));
    }

    fn link_program(&mut self, program: &u32) {
        self.calls.push(Call::LinkProgram(*program));
    }

    fn program_info_log(&mut self, _program: &u32) -> String {
        if self.validation_failed {
            "validation: no vertex array bound".to_string()
        } else {
            self.link_log.clone()
        }
    }

    fn validate_program(&mut self, program: &u32) -> bool {
        self.calls.push(Call::ValidateProgram(*program));
        self.validation_failed = self.invalid;
        !self.invalid
    }

    fn use_program(&mut self, program: Option<&u32>) {
        self.current_program = program.copied();
        self.calls.push(Call::UseProgram(program.copied()));
    }

    fn delete_program(&mut self, program: u32) {
        self.live_programs.remove(&program);
        self.calls.push(Call::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: &u32, name: &str) -> Option<i32> {
        assert!(self.live_programs.contains(program), "program is not alive");

        self.uniforms
            .iter()
            .position(|uniform| *uniform == name)
            .map(|index| index as i32)
    }

    fn uniform_matrix_4(&mut self, location: &i32, value: &[f32; 16]) {
        self.calls.push(Call::UniformMatrix4(*location, *value));
    }

    fn uniform_3(&mut self, location: &i32, value: [f32; 3]) {
        self.calls.push(Call::Uniform3(*location, value));
    }

    fn create_vertex_array(
        &mut self,
        _vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<u32, Self::Error> {
        let vertex_array = self.name();
        self.live_vertex_arrays.insert(vertex_array);
        self.calls
            .push(Call::CreateVertexArray(vertex_array, indices.len()));
        Ok(vertex_array)
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.live_vertex_arrays.remove(&vertex_array);
        self.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<&u32>) {
        self.current_vertex_array = vertex_array.copied();
        self.calls.push(Call::BindVertexArray(vertex_array.copied()));
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(Call::Viewport(x, y, width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }

    fn draw_indexed_triangles(&mut self, count: u32) {
        self.calls.push(Call::DrawIndexedTriangles(count));
    }
}
