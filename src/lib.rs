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

//! A small immediate-mode rendering layer: shader program lifecycle and per-object draw calls.
//!
//! The crate is written against the [`GpuContext`] trait rather than any particular graphics
//! API. Implement it on a type that represents a live GPU context (the `ember-gl` crate does
//! this for OpenGL), then:
//!
//! 1. call [`Renderer::setup`] once the context is current,
//! 2. build a [`ShaderProgram`] from its stage sources,
//! 3. pair a [`Material`] with a [`Geometry`] in an [`ObjRepresentable`],
//! 4. call [`Renderer::draw`] for every object, every frame.
//!
//! The context is passed explicitly to every operation. Nothing here is thread-safe: the
//! context is assumed to be bound to the calling thread, and it is up to the caller to keep it
//! that way.
//!
//! ```no_run
//! # fn run<C: ember::GpuContext>(ctx: &mut C) -> Result<(), ember::Error> {
//! use ember::glam::Vec3;
//! use ember::{
//!     BindableState, Geometry, Material, ObjRepresentable, Renderer, ShaderInfo, ShaderProgram,
//! };
//!
//! let mut renderer = Renderer::default();
//! renderer.setup(ctx)?;
//! renderer.set_clear_colour(11.0, 11.0, 11.0);
//!
//! let program = ShaderProgram::new(
//!     ctx,
//!     &[
//!         ShaderInfo::vertex(include_str!("../tests/shaders/flat.vsh")),
//!         ShaderInfo::fragment(include_str!("../tests/shaders/flat.fsh")),
//!     ],
//! )?;
//!
//! let square = Geometry::rectangle(ctx, 1.0, 1.0)?;
//! let object = ObjRepresentable::new(Material::new(Vec3::new(1.0, 1.0, 0.8)), &square);
//!
//! renderer.clear_screen(ctx);
//! renderer.draw(ctx, &object, &program, 800, 600)?;
//!
//! square.destroy(ctx);
//! program.terminate(ctx);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code, rust_2018_idioms)]

pub use glam;

mod bindable;
mod error;
mod gpu_backend;
mod object;
mod program;
mod renderer;
mod resources;

pub use self::bindable::BindableState;
pub use self::error::Error;
pub use self::gpu_backend::{GpuContext, ShaderStage, Vertex};
pub use self::object::{Material, ObjRepresentable};
pub use self::program::{ShaderInfo, ShaderProgram, Uniform};
pub use self::renderer::{Renderer, RendererConfig, DIFFUSE_COLOUR_UNIFORM, RGB_MAX_VALUE};
pub use self::resources::{rectangle_mesh, Geometry};
