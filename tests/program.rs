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

//! Shader program lifecycle.

mod common;

use common::{Call, RecordingContext, FRAGMENT_SOURCE, VERTEX_SOURCE};

use ember::glam::{Mat4, Vec3};
use ember::{BindableState, Error, ShaderInfo, ShaderProgram, ShaderStage};

fn stages() -> [ShaderInfo<'static>; 2] {
    [
        ShaderInfo::vertex(VERTEX_SOURCE),
        ShaderInfo::fragment(FRAGMENT_SOURCE),
    ]
}

fn nothing_alive(ctx: &RecordingContext) -> bool {
    ctx.live_shaders.is_empty() && ctx.live_programs.is_empty()
}

#[test]
fn builds_bound_and_validated() {
    common::init_logging();
    let mut ctx = RecordingContext::new();

    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();

    assert!(program.is_bound());
    assert_eq!(ctx.current_program, Some(*program.program()));
    assert_eq!(ctx.live_shaders.len(), 2);

    // Link, then bind, then validate.
    let p = *program.program();
    let tail: Vec<_> = ctx
        .calls
        .iter()
        .skip_while(|call| **call != Call::LinkProgram(p))
        .cloned()
        .collect();
    assert_eq!(
        tail,
        [
            Call::LinkProgram(p),
            Call::UseProgram(Some(p)),
            Call::ValidateProgram(p),
        ]
    );
}

#[test]
fn stages_are_compiled_and_attached_in_order() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    let p = *program.program();

    let created = ctx.calls_matching(|call| matches!(call, Call::CreateShader(..)));
    let (vs, fs) = match created.as_slice() {
        [Call::CreateShader(vs, ShaderStage::Vertex), Call::CreateShader(fs, ShaderStage::Fragment)] => {
            (*vs, *fs)
        }
        other => panic!("unexpected stages: {other:?}"),
    };

    let vertex_calls = ctx.calls_matching(|call| match call {
        Call::ShaderSource(s) | Call::CompileShader(s) => *s == vs,
        Call::AttachShader(_, s) => *s == vs,
        _ => false,
    });
    assert_eq!(
        vertex_calls,
        [
            Call::ShaderSource(vs),
            Call::CompileShader(vs),
            Call::AttachShader(p, vs),
        ]
    );

    let attached = ctx.calls_matching(|call| matches!(call, Call::AttachShader(..)));
    assert_eq!(attached, [Call::AttachShader(p, vs), Call::AttachShader(p, fs)]);
}

#[test]
fn empty_stage_list_is_rejected() {
    let mut ctx = RecordingContext::new();

    for _ in 0..3 {
        let err = ShaderProgram::new(&mut ctx, &[]).unwrap_err();
        assert!(matches!(err, Error::NoShaders));
        assert_eq!(err.to_string(), "no shaders found for compilation");
    }

    // Nothing was created on the way to the error.
    assert!(ctx.calls.is_empty());
}

#[test]
fn a_broken_stage_fails_and_leaks_nothing() {
    let mut ctx = RecordingContext::new();
    ctx.failing_stages.push(ShaderStage::Fragment);

    let err = ShaderProgram::new(&mut ctx, &stages()).unwrap_err();

    match err {
        Error::StageCompilation { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(log.contains("fragment stage is broken"), "{log}");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(nothing_alive(&ctx));
    assert!(!ctx
        .calls
        .iter()
        .any(|call| matches!(call, Call::LinkProgram(_))));
}

#[test]
fn a_link_log_fails_and_leaks_nothing() {
    let mut ctx = RecordingContext::new();
    ctx.link_log = "error: undefined reference to `main`".into();

    let err = ShaderProgram::new(&mut ctx, &stages()).unwrap_err();

    assert!(matches!(&err, Error::Compilation(log) if log.contains("undefined reference")));
    assert_eq!(
        err.to_string(),
        "shader compilation failed: error: undefined reference to `main`"
    );
    assert!(nothing_alive(&ctx));
    assert_eq!(ctx.current_program, None);
}

#[test]
fn warnings_in_the_link_log_are_fatal() {
    // Drivers also put warnings in the link log. Any output at all counts as a failure.
    let mut ctx = RecordingContext::new();
    ctx.link_log = "warning: extension GL_ARB_foo is deprecated".into();

    let err = ShaderProgram::new(&mut ctx, &stages()).unwrap_err();

    assert!(matches!(err, Error::Compilation(_)));
}

#[test]
fn failed_validation_fails_and_leaks_nothing() {
    let mut ctx = RecordingContext::new();
    ctx.invalid = true;

    let err = ShaderProgram::new(&mut ctx, &[ShaderInfo::vertex(VERTEX_SOURCE)]).unwrap_err();

    assert!(matches!(&err, Error::Validation(log) if log.contains("no vertex array")));
    assert!(nothing_alive(&ctx));
    assert_eq!(ctx.current_program, None);
}

#[test]
fn backend_failures_are_propagated() {
    let mut ctx = RecordingContext::new();
    ctx.out_of_programs = true;

    let err = ShaderProgram::new(&mut ctx, &stages()).unwrap_err();

    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(err.to_string(), "backend error: out of memory");
    assert!(nothing_alive(&ctx));
}

#[test]
fn unknown_uniforms_are_errors() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    let before = ctx.calls.len();

    let err = program
        .send(&mut ctx, "view", &Mat4::IDENTITY)
        .unwrap_err();
    assert!(matches!(&err, Error::UniformNotFound(name) if name == "view"));

    let err = program.send(&mut ctx, "specular", &Vec3::ONE).unwrap_err();
    assert_eq!(err.to_string(), "did not expect uniform with name: specular");

    // Nothing was uploaded.
    assert_eq!(ctx.calls.len(), before);
}

#[test]
fn uniforms_are_uploaded_to_their_location() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();

    let projection = Mat4::orthographic_rh_gl(0.0, 30.0, 0.0, 30.0, 0.0, 1.0);
    program.send(&mut ctx, "projection", &projection).unwrap();
    program
        .send(&mut ctx, "diffuseColour", &Vec3::new(0.2, 1.0, 0.2))
        .unwrap();

    let uploads = ctx.calls_matching(|call| {
        matches!(call, Call::UniformMatrix4(..) | Call::Uniform3(..))
    });
    assert_eq!(
        uploads,
        [
            Call::UniformMatrix4(0, projection.to_cols_array()),
            Call::Uniform3(2, [0.2, 1.0, 0.2]),
        ]
    );
}

#[test]
fn bind_then_unbind_restores_no_program() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    program.unbind(&mut ctx);
    assert_eq!(ctx.current_program, None);

    program.bind(&mut ctx);
    program.bind(&mut ctx);
    assert_eq!(ctx.current_program, Some(*program.program()));
    assert!(program.is_bound());

    program.unbind(&mut ctx);
    assert_eq!(ctx.current_program, None);
    assert!(!program.is_bound());
}

#[test]
fn binding_is_tracked_per_handle() {
    let mut ctx = RecordingContext::new();
    let first = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    let second = ShaderProgram::new(&mut ctx, &stages()).unwrap();

    first.bind(&mut ctx);
    second.bind(&mut ctx);

    // The context moved on, but `first` was never unbound through its own handle.
    assert_eq!(ctx.current_program, Some(*second.program()));
    assert!(first.is_bound());
    assert!(second.is_bound());

    first.unbind(&mut ctx);
    assert!(!first.is_bound());
    assert_eq!(ctx.current_program, None);
}

#[test]
fn terminate_releases_every_stage() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    let p = *program.program();

    program.terminate(&mut ctx);

    assert!(nothing_alive(&ctx));
    assert_eq!(ctx.current_program, None);

    let detached = ctx.calls_matching(|call| matches!(call, Call::DetachShader(..)));
    assert_eq!(detached.len(), 2);
    assert_eq!(ctx.calls.last(), Some(&Call::DeleteProgram(p)));
}

#[test]
fn destroy_leaves_stages_alone() {
    let mut ctx = RecordingContext::new();
    let program = ShaderProgram::new(&mut ctx, &stages()).unwrap();
    let p = *program.program();

    program.destroy(&mut ctx);

    assert!(ctx.live_programs.is_empty());
    assert_eq!(ctx.live_shaders.len(), 2);
    assert_eq!(ctx.current_program, None);

    // Unbound before the program went away.
    let tail = &ctx.calls[ctx.calls.len() - 2..];
    assert_eq!(tail, [Call::UseProgram(None), Call::DeleteProgram(p)]);
}
