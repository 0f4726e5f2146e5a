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

//! Shader program compilation and uniform uploads.

use crate::bindable::BindableState;
use crate::gpu_backend::{GpuContext, ShaderStage};
use crate::Error;

use glam::{Mat4, Vec3};

use std::cell::Cell;
use std::fmt;

/// The source code for a single shader stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderInfo<'a> {
    /// The stage this source is compiled for.
    pub stage: ShaderStage,

    /// The source code.
    pub source: &'a str,
}

impl<'a> ShaderInfo<'a> {
    /// Pair a stage with its source.
    pub const fn new(stage: ShaderStage, source: &'a str) -> Self {
        Self { stage, source }
    }

    /// Vertex shader source.
    pub const fn vertex(source: &'a str) -> Self {
        Self::new(ShaderStage::Vertex, source)
    }

    /// Fragment shader source.
    pub const fn fragment(source: &'a str) -> Self {
        Self::new(ShaderStage::Fragment, source)
    }
}

/// A value that can be uploaded to a shader uniform.
pub trait Uniform {
    /// Write this value to `location` in the current program.
    fn upload<C: GpuContext + ?Sized>(&self, context: &mut C, location: &C::UniformLocation);
}

impl Uniform for Mat4 {
    fn upload<C: GpuContext + ?Sized>(&self, context: &mut C, location: &C::UniformLocation) {
        context.uniform_matrix_4(location, &self.to_cols_array());
    }
}

impl Uniform for Vec3 {
    fn upload<C: GpuContext + ?Sized>(&self, context: &mut C, location: &C::UniformLocation) {
        context.uniform_3(location, self.to_array());
    }
}

/// A compiled, linked and validated shader program.
///
/// Construction either produces a program that is ready to draw with, or fails without
/// leaving anything behind on the GPU. The program must be released explicitly with
/// [`terminate`](Self::terminate) (or [`destroy`](BindableState::destroy)), since releasing it
/// requires the context.
pub struct ShaderProgram<C: GpuContext + ?Sized> {
    /// The linked program.
    program: C::Program,

    /// The stages linked into `program`, kept around until `terminate`.
    shaders: Vec<C::Shader>,

    /// Whether this program was the last one bound through this handle.
    bound: Cell<bool>,
}

impl<C: GpuContext + ?Sized> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("stages", &self.shaders.len())
            .field("bound", &self.bound.get())
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> ShaderProgram<C> {
    /// Compile and link a program from its stages, in order.
    ///
    /// On success the program is left bound and has passed validation.
    ///
    /// # Errors
    ///
    /// - [`Error::NoShaders`] if `shaders` is empty.
    /// - [`Error::StageCompilation`] if a stage does not compile.
    /// - [`Error::Compilation`] if linking produces any diagnostic output at all. Warnings
    ///   count.
    /// - [`Error::Validation`] if the linked program does not validate.
    /// - [`Error::Backend`] if the context cannot create the objects.
    pub fn new(context: &mut C, shaders: &[ShaderInfo<'_>]) -> Result<Self, Error> {
        if shaders.is_empty() {
            return Err(Error::NoShaders);
        }

        let program = context.create_program().map_err(Error::backend)?;
        let mut stages = Vec::with_capacity(shaders.len());

        for info in shaders {
            match compile_stage(context, info) {
                Ok(shader) => {
                    context.attach_shader(&program, &shader);
                    stages.push(shader);
                }
                Err(err) => {
                    release(context, program, stages);
                    return Err(err);
                }
            }
        }

        context.link_program(&program);

        let log = context.program_info_log(&program);
        if !log.is_empty() {
            release(context, program, stages);
            return Err(Error::Compilation(log));
        }

        let this = Self {
            program,
            shaders: stages,
            bound: Cell::new(false),
        };

        this.bind(context);

        if let Err(err) = this.validate(context) {
            this.terminate(context);
            return Err(err);
        }

        tracing::debug!("linked shader program with {} stages", shaders.len());

        Ok(this)
    }

    /// Check that the program can run against the current context state.
    pub fn validate(&self, context: &mut C) -> Result<(), Error> {
        if context.validate_program(&self.program) {
            Ok(())
        } else {
            Err(Error::Validation(context.program_info_log(&self.program)))
        }
    }

    /// Upload `value` to the uniform called `name`.
    ///
    /// The value is written to whichever program is current on `context`, so this program
    /// should be bound first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UniformNotFound`] if the program has no active uniform called `name`.
    /// Uniforms that the compiler optimized out count as missing.
    pub fn send<U: Uniform + ?Sized>(
        &self,
        context: &mut C,
        name: &str,
        value: &U,
    ) -> Result<(), Error> {
        let location = context
            .uniform_location(&self.program, name)
            .ok_or_else(|| Error::UniformNotFound(name.to_owned()))?;

        value.upload(context, &location);
        Ok(())
    }

    /// Whether this program was bound through this handle and not unbound since.
    ///
    /// This only tracks calls made through this handle. Binding another program on the same
    /// context does not clear it, so it is not a query of the context's current program.
    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    /// The underlying program object.
    pub fn program(&self) -> &C::Program {
        &self.program
    }

    /// Unbind the program and release it together with all of its stage objects.
    ///
    /// Unlike [`destroy`](BindableState::destroy), this also detaches and deletes every
    /// stage compiled during construction.
    pub fn terminate(self, context: &mut C) {
        self.unbind(context);

        let Self {
            program, shaders, ..
        } = self;
        let stage_count = shaders.len();

        release(context, program, shaders);

        tracing::trace!("terminated shader program and {stage_count} stages");
    }
}

impl<C: GpuContext + ?Sized> BindableState<C> for ShaderProgram<C> {
    fn bind(&self, context: &mut C) {
        context.use_program(Some(&self.program));
        self.bound.set(true);
    }

    fn unbind(&self, context: &mut C) {
        context.use_program(None);
        self.bound.set(false);
    }

    /// Unbind and delete the program.
    ///
    /// Stage objects are not released; use [`ShaderProgram::terminate`] for that.
    fn destroy(self, context: &mut C) {
        let stage_count = self.shaders.len();

        self.unbind(context);
        context.delete_program(self.program);

        tracing::trace!("destroyed shader program, leaving {stage_count} stages");
    }
}

/// Create, fill and compile one stage.
fn compile_stage<C: GpuContext + ?Sized>(
    context: &mut C,
    info: &ShaderInfo<'_>,
) -> Result<C::Shader, Error> {
    let shader = context.create_shader(info.stage).map_err(Error::backend)?;

    context.shader_source(&shader, info.source);
    context.compile_shader(&shader);

    if !context.shader_compile_status(&shader) {
        let log = context.shader_info_log(&shader);
        context.delete_shader(shader);

        return Err(Error::StageCompilation {
            stage: info.stage,
            log,
        });
    }

    Ok(shader)
}

/// Detach and delete every stage, then delete the program.
fn release<C: GpuContext + ?Sized>(context: &mut C, program: C::Program, shaders: Vec<C::Shader>) {
    for shader in shaders {
        context.detach_shader(&program, &shader);
        context.delete_shader(shader);
    }

    context.delete_program(program);
}
