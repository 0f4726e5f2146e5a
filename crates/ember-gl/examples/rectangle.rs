// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `ember-gl`.
//
// `ember-gl` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `ember-gl` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `ember-gl`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! Draws a snake of unit squares crawling across a 30 by 30 grid.
//!
//! This uses `glutin` to set up a GL context and `winit` to create a window. Every square
//! shares one rectangle mesh and one shader program; only the material and the `model`
//! matrix change between draws.

use ember::glam::{Mat4, Vec2, Vec3};
use ember::{
    BindableState, Geometry, Material, ObjRepresentable, Renderer, RendererConfig, ShaderInfo,
    ShaderProgram,
};
use ember_gl::GlContext;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;

use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

const VERTEX_SHADER: &str = r#"
#version 330 core

layout (location = 0) in vec3 aPos;

uniform mat4 projection;
uniform mat4 model;

void main() {
    gl_Position = projection * model * vec4(aPos, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
#version 330 core

uniform vec3 diffuseColour;

out vec4 fragColour;

void main() {
    fragColour = vec4(diffuseColour, 1.0);
}
"#;

/// Cells along each side of the grid.
const GRID: f32 = 30.0;

const HEAD: Material = Material::new(Vec3::new(1.0, 1.0, 0.8));
const BODY: Material = Material::new(Vec3::new(1.0, 1.0, 0.5));
const FOOD: Material = Material::new(Vec3::new(0.2, 1.0, 0.2));

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Create the winit event loop.
    let event_loop = EventLoop::new();

    let mut size = PhysicalSize::new(800, 800);
    let make_window_builder = move || {
        WindowBuilder::new()
            .with_title("ember rectangle example")
            .with_inner_size(size)
    };

    // If we're on Windows, start with the window.
    let window = if cfg!(windows) {
        Some(make_window_builder())
    } else {
        None
    };

    let display = DisplayBuilder::new().with_window_builder(window);
    let (mut window, gl_config) = display.build(
        &event_loop,
        ConfigTemplateBuilder::new(),
        |configs| {
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .unwrap()
        },
    )?;

    // Ask for a 3.3 core context first.
    let window_handle = window.as_ref().map(|w| w.raw_window_handle());
    let contexts = [
        ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(window_handle),
        ContextAttributesBuilder::new().build(window_handle),
    ];

    let display = gl_config.display();
    let gl_handler = (|| {
        for context in &contexts {
            if let Ok(gl_context) = unsafe { display.create_context(&gl_config, context) } {
                return Ok(gl_context);
            }
        }

        Err(Box::<dyn std::error::Error>::from(
            "Could not create a context",
        ))
    })()?;

    let framerate = Duration::from_millis(1000 / 60);
    let mut next_frame = Instant::now() + framerate;
    let mut state = None;
    let mut not_current_gl_context = Some(gl_handler);

    let mut renderer = Renderer::new(RendererConfig::from_env());
    renderer.set_clear_colour(11.0, 11.0, 11.0);

    let mut gl = None;
    let mut scene: Option<(ShaderProgram<GlContext>, Geometry<GlContext>)> = None;
    let projection = Mat4::orthographic_rh_gl(0.0, GRID, 0.0, GRID, -1.0, 1.0);
    let mut tick = 0u32;

    event_loop.run(move |event, target, control_flow| {
        control_flow.set_wait_until(next_frame);

        match event {
            Event::Resumed => {
                let window = window.take().unwrap_or_else(|| {
                    let window_builder = make_window_builder();
                    glutin_winit::finalize_window(target, window_builder, &gl_config).unwrap()
                });

                let attrs = window.build_surface_attributes(Default::default());
                let surface = unsafe {
                    gl_config
                        .display()
                        .create_window_surface(&gl_config, &attrs)
                        .unwrap()
                };

                let gl_context = not_current_gl_context
                    .take()
                    .unwrap()
                    .make_current(&surface)
                    .unwrap();

                let gl = gl.get_or_insert_with(|| {
                    let display = gl_config.display();

                    // The context stays current on this thread for the rest of the program.
                    unsafe {
                        GlContext::new(move |symbol| {
                            let symbol = CString::new(symbol).unwrap();
                            display.get_proc_address(symbol.as_c_str())
                        })
                    }
                });

                renderer.setup(gl).unwrap();

                if scene.is_none() {
                    let program = ShaderProgram::new(
                        gl,
                        &[
                            ShaderInfo::vertex(VERTEX_SHADER),
                            ShaderInfo::fragment(FRAGMENT_SHADER),
                        ],
                    )
                    .unwrap();
                    let square = Geometry::rectangle(gl, 1.0, 1.0).unwrap();

                    scene = Some((program, square));
                }

                state = Some((surface, window, gl_context));
            }

            Event::Suspended => {
                if let Some((.., context)) = state.take() {
                    not_current_gl_context = Some(context.make_not_current().unwrap());
                }
            }

            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::Resized(new_size) => {
                    size = new_size;

                    if let Some((surface, _, context)) = &state {
                        surface.resize(
                            context,
                            NonZeroU32::new(size.width.max(1)).unwrap(),
                            NonZeroU32::new(size.height.max(1)).unwrap(),
                        );
                    }
                }
                _ => {}
            },

            Event::RedrawEventsCleared => {
                if let (Some((surface, _, context)), Some(gl), Some((program, square))) =
                    (&state, &mut gl, &scene)
                {
                    renderer.clear_screen(gl);

                    program.bind(gl);
                    program.send(gl, "projection", &projection).unwrap();

                    for (cell, material) in snake(tick) {
                        let object = ObjRepresentable::new(material, square);

                        program.bind(gl);
                        program
                            .send(gl, "model", &Mat4::from_translation(cell.extend(0.0)))
                            .unwrap();
                        renderer
                            .draw(gl, &object, program, size.width, size.height)
                            .unwrap();
                    }

                    surface.swap_buffers(context).unwrap();
                }

                tick = tick.wrapping_add(1);
                next_frame += framerate;
            }

            Event::LoopDestroyed => {
                // Release GPU objects while the context is still current.
                if let (Some(_), Some(gl), Some((program, square))) =
                    (&state, &mut gl, scene.take())
                {
                    square.destroy(gl);
                    program.terminate(gl);
                }
            }

            _ => {}
        }
    })
}

/// The cells to fill on a given tick, head first.
fn snake(tick: u32) -> impl Iterator<Item = (Vec2, Material)> {
    const LENGTH: u32 = 6;
    let row = GRID / 2.0;
    let head = (tick / 8) % GRID as u32;

    let body = (0..LENGTH).map(move |i| {
        let column = (head + GRID as u32 - i) % GRID as u32;
        let material = if i == 0 { HEAD } else { BODY };
        (Vec2::new(column as f32, row), material)
    });

    body.chain(std::iter::once((Vec2::new(GRID - 5.0, row + 4.0), FOOD)))
}
