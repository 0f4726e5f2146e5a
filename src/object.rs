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

//! Things that can be drawn.

use crate::gpu_backend::GpuContext;
use crate::resources::Geometry;

use glam::Vec3;
use std::fmt;

/// Shading parameters for an object.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Material {
    /// The base surface color, with each channel in `[0, 1]`.
    pub diffuse_colour: Vec3,
}

impl Material {
    /// Create a material with the given diffuse color.
    pub const fn new(diffuse_colour: Vec3) -> Self {
        Self { diffuse_colour }
    }
}

/// Everything needed to draw something to the screen.
///
/// This only borrows its geometry; the GPU resources stay with whoever created them.
pub struct ObjRepresentable<'a, C: GpuContext + ?Sized> {
    /// How the object is shaded.
    pub material: Material,

    /// What the object looks like.
    pub geom: &'a Geometry<C>,
}

impl<'a, C: GpuContext + ?Sized> ObjRepresentable<'a, C> {
    /// Pair a material with a piece of geometry.
    pub fn new(material: Material, geom: &'a Geometry<C>) -> Self {
        Self { material, geom }
    }
}

impl<C: GpuContext + ?Sized> Clone for ObjRepresentable<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: GpuContext + ?Sized> Copy for ObjRepresentable<'_, C> {}

impl<C: GpuContext + ?Sized> fmt::Debug for ObjRepresentable<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjRepresentable")
            .field("material", &self.material)
            .field("geom", &self.geom)
            .finish()
    }
}
