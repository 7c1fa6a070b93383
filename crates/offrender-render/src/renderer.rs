use glow::HasContext;
use offrender_core::{Color, OffrenderResult, SceneDescription};

use crate::context::RenderContext;
use crate::scene::ShapeResource;

/// Clears the buffer and draws shapes in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderer {
    background: Color,
}

impl Renderer {
    pub fn new(background: Color) -> Self {
        Self { background }
    }

    pub fn for_scene(scene: &SceneDescription) -> Self {
        Self::new(scene.background)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Draw one frame into the context's pixel buffer and wait for the
    /// driver to finish writing it.
    pub fn render(&self, ctx: &mut RenderContext, shapes: &[ShapeResource]) -> OffrenderResult<()> {
        let clear_depth = ctx.attributes().wants_depth();
        let gl = ctx.gl()?;
        let [r, g, b, a] = self.background.to_array();

        unsafe {
            gl.clear_color(r, g, b, a);
            let mut mask = glow::COLOR_BUFFER_BIT;
            if clear_depth {
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            gl.clear(mask);

            for shape in shapes {
                gl.use_program(Some(shape.program().raw()));
                gl.bind_vertex_array(Some(shape.vertex_array()));
                gl.draw_arrays(glow::TRIANGLES, 0, shape.vertex_count());
            }

            gl.bind_vertex_array(None);
            gl.use_program(None);
            gl.finish();
        }

        tracing::info!(
            "Rendered {} shapes into {}x{} buffer",
            shapes.len(),
            ctx.width(),
            ctx.height()
        );
        Ok(())
    }
}
