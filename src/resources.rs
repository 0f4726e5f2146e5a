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

//! Defines useful resource wrappers.

use crate::bindable::BindableState;
use crate::gpu_backend::{GpuContext, Vertex};
use crate::Error;

use std::fmt;

/// A vertex array on the GPU, along with the number of indices to draw from it.
pub struct Geometry<C: GpuContext + ?Sized> {
    vertex_array: C::VertexArray,
    vertex_count: u32,
}

impl<C: GpuContext + ?Sized> fmt::Debug for Geometry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("vertex_count", &self.vertex_count)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> Geometry<C> {
    /// Wrap a vertex array that was created somewhere else.
    ///
    /// `vertex_count` is the number of indices a draw call will consume.
    pub fn from_raw(vertex_array: C::VertexArray, vertex_count: u32) -> Self {
        Self {
            vertex_array,
            vertex_count,
        }
    }

    /// Upload vertices and indices into a new vertex array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyIndices`] without touching the context if there are more than
    /// `u32::MAX` indices.
    pub fn new(context: &mut C, vertices: &[Vertex], indices: &[u32]) -> Result<Self, Error> {
        let vertex_count = index_count(indices.len())?;

        let vertex_array = context
            .create_vertex_array(vertices, indices)
            .map_err(Error::backend)?;

        Ok(Self::from_raw(vertex_array, vertex_count))
    }

    /// Upload an axis-aligned rectangle spanning `(0, 0)` to `(x, y)`.
    pub fn rectangle(context: &mut C, x: f32, y: f32) -> Result<Self, Error> {
        let (vertices, indices) = rectangle_mesh(x, y);
        Self::new(context, &vertices, &indices)
    }

    /// The underlying vertex array.
    pub fn vertex_array(&self) -> &C::VertexArray {
        &self.vertex_array
    }

    /// The number of indices drawn from this geometry.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

impl<C: GpuContext + ?Sized> BindableState<C> for Geometry<C> {
    fn bind(&self, context: &mut C) {
        context.bind_vertex_array(Some(&self.vertex_array));
    }

    fn unbind(&self, context: &mut C) {
        context.bind_vertex_array(None);
    }

    fn destroy(self, context: &mut C) {
        self.unbind(context);
        context.delete_vertex_array(self.vertex_array);
    }
}

fn index_count(len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::TooManyIndices(len))
}

/// The vertices and indices of a rectangle spanning `(0, 0)` to `(x, y)` on the `z = 0` plane.
///
/// The corners are ordered top right, bottom right, bottom left, top left.
pub fn rectangle_mesh(x: f32, y: f32) -> ([Vertex; 4], [u32; 6]) {
    let vertices = [
        Vertex::new(x, y, 0.0),
        Vertex::new(x, 0.0, 0.0),
        Vertex::new(0.0, 0.0, 0.0),
        Vertex::new(0.0, y, 0.0),
    ];

    let indices = [0, 1, 3, 1, 2, 3];

    (vertices, indices)
}
