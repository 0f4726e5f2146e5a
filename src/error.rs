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

use crate::gpu_backend::ShaderStage;

use std::error::Error as StdError;

/// The error type for ember.
///
/// None of these are meant to be recovered from: they indicate broken shader sources, a
/// mismatch between host code and a shader, or a failing GPU context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A program was requested without any shader stages.
    #[error("no shaders found for compilation")]
    NoShaders,

    /// A single stage failed to compile.
    #[error("{stage} shader failed to compile: {log}")]
    StageCompilation {
        /// The stage that failed.
        stage: ShaderStage,

        /// The compiler output for that stage.
        log: String,
    },

    /// Linking left a non-empty diagnostic log.
    #[error("shader compilation failed: {0}")]
    Compilation(String),

    /// The program did not pass validation.
    #[error("shader validation failed: {0}")]
    Validation(String),

    /// The program has no active uniform with this name.
    #[error("did not expect uniform with name: {0}")]
    UniformNotFound(String),

    /// A mesh has more indices than a single draw call can consume.
    #[error("geometry has {0} indices, more than a draw call can take")]
    TooManyIndices(usize),

    /// The GPU context reported an error.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Backend(Box::new(err))
    }
}
