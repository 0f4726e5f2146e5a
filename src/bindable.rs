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

//! The contract shared by GPU resources that can be made current.

use crate::gpu_backend::GpuContext;

/// A GPU resource that can be made the current target of a context.
pub trait BindableState<C: GpuContext + ?Sized> {
    /// Make this resource the target of subsequent operations on `context`.
    ///
    /// Binding an already bound resource does nothing.
    fn bind(&self, context: &mut C);

    /// Restore the state where no resource of this kind is current.
    fn unbind(&self, context: &mut C);

    /// Release the underlying GPU resource.
    ///
    /// The resource is unbound before it is released.
    fn destroy(self, context: &mut C)
    where
        Self: Sized;
}
