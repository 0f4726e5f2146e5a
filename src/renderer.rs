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

//! Frame-level state and the per-object draw call.

use crate::bindable::BindableState;
use crate::gpu_backend::GpuContext;
use crate::object::ObjRepresentable;
use crate::program::ShaderProgram;
use crate::Error;

use glam::Vec3;

/// The largest value of an 8-bit color channel.
///
/// Clear colors are given on this scale and divided by it before being stored.
pub const RGB_MAX_VALUE: f32 = 255.0;

/// The uniform that receives a material's diffuse color.
pub const DIFFUSE_COLOUR_UNIFORM: &str = "diffuseColour";

/// The environment variable read by [`RendererConfig::from_env`].
const VALIDATE_DRAWS_VAR: &str = "EMBER_VALIDATE_DRAWS";

/// Settings for a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Re-validate the shader program before every draw call.
    ///
    /// This catches programs that became invalid after construction, at the cost of a
    /// round trip to the driver on every draw. Defaults to on in debug builds.
    pub validate_on_draw: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            validate_on_draw: cfg!(debug_assertions),
        }
    }
}

impl RendererConfig {
    /// Set whether shader programs are validated before every draw.
    pub fn with_validate_on_draw(mut self, validate_on_draw: bool) -> Self {
        self.validate_on_draw = validate_on_draw;
        self
    }

    /// Read the configuration from the environment.
    ///
    /// `EMBER_VALIDATE_DRAWS` overrides [`validate_on_draw`](Self::validate_on_draw) when it
    /// is set to one of `1`, `true`, `yes`, `on`, `0`, `false`, `no` or `off`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(VALIDATE_DRAWS_VAR) {
            match parse_flag(&value) {
                Some(flag) => config.validate_on_draw = flag,
                None => tracing::warn!(
                    "ignoring {VALIDATE_DRAWS_VAR}={value:?}, expected a boolean"
                ),
            }
        }

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Issues clears and draw calls.
///
/// The renderer keeps no state about the objects it draws; the only thing it remembers
/// between calls is the clear color.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// The clear color, already normalized.
    clear_colour: Vec3,

    /// The settings this renderer was created with.
    config: RendererConfig,

    /// Whether `setup` has run.
    initialized: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl Renderer {
    /// Create a new renderer with a black clear color.
    pub fn new(config: RendererConfig) -> Self {
        Self {
            clear_colour: Vec3::ZERO,
            config,
            initialized: false,
        }
    }

    /// The settings of this renderer.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Prepare the context for rendering.
    ///
    /// This must be called once, after the context has been made current and before any
    /// clear or draw. Later calls do nothing.
    pub fn setup<C: GpuContext + ?Sized>(&mut self, context: &mut C) -> Result<(), Error> {
        if self.initialized {
            tracing::warn!("renderer is already set up");
            return Ok(());
        }

        context.setup().map_err(Error::backend)?;
        self.initialized = true;

        tracing::debug!("renderer set up, validate_on_draw={}", self.config.validate_on_draw);

        Ok(())
    }

    /// Set the clear color from channels on a `0..=255` scale.
    ///
    /// Values outside of that range are stored as-is.
    pub fn set_clear_colour(&mut self, r: f32, g: f32, b: f32) {
        self.clear_colour = Vec3::new(r, g, b) / RGB_MAX_VALUE;
    }

    /// The current clear color, with each channel normalized.
    pub fn clear_colour(&self) -> Vec3 {
        self.clear_colour
    }

    /// Clear the color buffer with the clear color, at full opacity.
    pub fn clear_screen<C: GpuContext + ?Sized>(&self, context: &mut C) {
        debug_assert!(self.initialized, "clear_screen called before setup");

        context.clear(self.clear_colour.extend(1.0).to_array());
    }

    /// Draw one object with `shader` into a `width` by `height` viewport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UniformNotFound`] if `shader` has no `diffuseColour` uniform, and
    /// [`Error::Validation`] if draw validation is enabled and the program no longer
    /// validates. Nothing is drawn in either case.
    pub fn draw<C: GpuContext + ?Sized>(
        &self,
        context: &mut C,
        object: &ObjRepresentable<'_, C>,
        shader: &ShaderProgram<C>,
        width: u32,
        height: u32,
    ) -> Result<(), Error> {
        debug_assert!(self.initialized, "draw called before setup");

        context.viewport(0, 0, width, height);
        shader.bind(context);
        object.geom.bind(context);

        if self.config.validate_on_draw {
            shader.validate(context)?;
        }

        shader.send(
            context,
            DIFFUSE_COLOUR_UNIFORM,
            &object.material.diffuse_colour,
        )?;

        context.draw_indexed_triangles(object.geom.vertex_count());

        Ok(())
    }
}
