//! Shader programs and vertex data on the GPU.
//!
//! Everything created here lives until the context is destroyed; nothing is
//! released individually.

use std::collections::HashMap;

use glow::HasContext;
use offrender_core::scene::check_triangle_list;
use offrender_core::{OffrenderError, OffrenderResult, SceneDescription, ShaderStage};

use crate::context::RenderContext;

/// Name of the per-vertex position attribute (3 floats).
pub const VERTEX_ATTRIBUTE: &str = "vertex";
/// Name of the per-vertex scalar offset attribute (1 float).
pub const OFFSET_ATTRIBUTE: &str = "offset";

/// A compiled vertex or fragment stage.
#[derive(Debug, Clone, Copy)]
pub struct CompiledShader {
    shader: glow::Shader,
    stage: ShaderStage,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

/// A linked program. Several programs may share one vertex stage.
#[derive(Debug, Clone, Copy)]
pub struct ShaderProgram {
    program: glow::Program,
}

impl ShaderProgram {
    pub fn raw(&self) -> glow::Program {
        self.program
    }
}

/// One buffer holding positions then offsets, plus the vertex array that
/// describes it, paired with the program that shades it.
#[derive(Debug, Clone, Copy)]
pub struct ShapeResource {
    buffer: glow::Buffer,
    vertex_array: glow::VertexArray,
    program: ShaderProgram,
    vertex_count: i32,
    offsets_start: usize,
}

impl ShapeResource {
    pub fn buffer(&self) -> glow::Buffer {
        self.buffer
    }

    pub fn vertex_array(&self) -> glow::VertexArray {
        self.vertex_array
    }

    pub fn program(&self) -> ShaderProgram {
        self.program
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Byte offset of the offsets array inside the buffer.
    pub fn offsets_start(&self) -> usize {
        self.offsets_start
    }
}

/// Byte layout of one shape's buffer: positions at 0, offsets right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeLayout {
    pub vertex_count: i32,
    pub offsets_start: i32,
    pub total_bytes: i32,
}

impl ShapeLayout {
    const POSITION_BYTES: usize = 3 * std::mem::size_of::<f32>();
    const OFFSET_BYTES: usize = std::mem::size_of::<f32>();

    /// Layout for `vertex_count` vertices with one offset each. Fails when a
    /// count or byte size does not fit a GL `int`.
    pub fn for_vertices(vertex_count: usize) -> OffrenderResult<Self> {
        let too_large = || {
            OffrenderError::InvalidArgument(format!(
                "{} vertices exceed the GL buffer size range",
                vertex_count
            ))
        };
        let positions = vertex_count
            .checked_mul(Self::POSITION_BYTES)
            .ok_or_else(too_large)?;
        let total = vertex_count
            .checked_mul(Self::OFFSET_BYTES)
            .and_then(|offsets| offsets.checked_add(positions))
            .ok_or_else(too_large)?;
        Ok(Self {
            vertex_count: i32::try_from(vertex_count).map_err(|_| too_large())?,
            offsets_start: i32::try_from(positions).map_err(|_| too_large())?,
            total_bytes: i32::try_from(total).map_err(|_| too_large())?,
        })
    }
}

/// Uploads geometry and builds shader programs against a loaded context.
pub struct SceneBuilder<'a> {
    gl: &'a glow::Context,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(ctx: &'a RenderContext) -> OffrenderResult<Self> {
        Ok(Self { gl: ctx.gl()? })
    }

    pub fn compile_stage(&self, stage: ShaderStage, source: &str) -> OffrenderResult<CompiledShader> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Link => {
                return Err(OffrenderError::InvalidArgument(
                    "the link step is not a shader stage".into(),
                ))
            }
        };
        let gl = self.gl;
        unsafe {
            let shader = gl
                .create_shader(kind)
                .map_err(|e| OffrenderError::shader(stage, e))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(OffrenderError::shader(stage, log.trim()));
            }
            Ok(CompiledShader { shader, stage })
        }
    }

    pub fn link(
        &self,
        vertex: &CompiledShader,
        fragment: &CompiledShader,
    ) -> OffrenderResult<ShaderProgram> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(OffrenderError::InvalidArgument(format!(
                "cannot link a {} stage as vertex with a {} stage as fragment",
                vertex.stage, fragment.stage
            )));
        }
        let gl = self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|e| OffrenderError::shader(ShaderStage::Link, e))?;
            gl.attach_shader(program, vertex.shader);
            gl.attach_shader(program, fragment.shader);
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(OffrenderError::shader(ShaderStage::Link, log.trim()));
            }
            Ok(ShaderProgram { program })
        }
    }

    /// Compile both stages from source and link them.
    pub fn compile_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> OffrenderResult<ShaderProgram> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = self.compile_stage(ShaderStage::Fragment, fragment_source)?;
        self.link(&vertex, &fragment)
    }

    fn attribute(&self, program: &ShaderProgram, name: &str) -> OffrenderResult<u32> {
        unsafe { self.gl.get_attrib_location(program.program, name) }
            .ok_or_else(|| OffrenderError::AttributeNotFound(name.to_string()))
    }

    /// Upload `vertices` followed by `offsets` into one buffer and describe
    /// the layout for `program`.
    pub fn build_shape(
        &self,
        vertices: &[[f32; 3]],
        offsets: &[f32],
        program: &ShaderProgram,
    ) -> OffrenderResult<ShapeResource> {
        check_triangle_list(vertices.len(), offsets.len())?;
        let layout = ShapeLayout::for_vertices(vertices.len())?;
        let vertex_location = self.attribute(program, VERTEX_ATTRIBUTE)?;
        let offset_location = self.attribute(program, OFFSET_ATTRIBUTE)?;

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let offset_bytes: &[u8] = bytemuck::cast_slice(offsets);

        let gl = self.gl;
        unsafe {
            let buffer = gl.create_buffer().map_err(OffrenderError::Gpu)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_size(glow::ARRAY_BUFFER, layout.total_bytes, glow::STATIC_DRAW);
            gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, vertex_bytes);
            gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, layout.offsets_start, offset_bytes);

            let vertex_array = gl.create_vertex_array().map_err(OffrenderError::Gpu)?;
            gl.bind_vertex_array(Some(vertex_array));

            gl.enable_vertex_attrib_array(vertex_location);
            gl.vertex_attrib_pointer_f32(vertex_location, 3, glow::FLOAT, false, 0, 0);

            gl.enable_vertex_attrib_array(offset_location);
            gl.vertex_attrib_pointer_f32(
                offset_location,
                1,
                glow::FLOAT,
                false,
                0,
                layout.offsets_start,
            );

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(ShapeResource {
                buffer,
                vertex_array,
                program: *program,
                vertex_count: layout.vertex_count,
                offsets_start: layout.offsets_start as usize,
            })
        }
    }

    /// Build every shape of `scene`, in order. The vertex stage is compiled
    /// once and each distinct fragment source is linked once.
    pub fn build_scene(&self, scene: &SceneDescription) -> OffrenderResult<Vec<ShapeResource>> {
        scene.validate()?;
        if scene.shapes.is_empty() {
            return Ok(Vec::new());
        }

        let vertex = self.compile_stage(ShaderStage::Vertex, &scene.vertex_shader)?;
        let mut programs: HashMap<&str, ShaderProgram> = HashMap::new();
        let mut shapes = Vec::with_capacity(scene.shapes.len());

        for shape in &scene.shapes {
            let program = match programs.get(shape.fragment_shader.as_str()) {
                Some(program) => *program,
                None => {
                    let fragment = self.compile_stage(ShaderStage::Fragment, &shape.fragment_shader)?;
                    let program = self.link(&vertex, &fragment)?;
                    programs.insert(&shape.fragment_shader, program);
                    program
                }
            };
            shapes.push(self.build_shape(&shape.vertices, &shape.offsets, &program)?);
        }

        tracing::info!(
            "Built {} shapes with {} shader programs",
            shapes.len(),
            programs.len()
        );
        Ok(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use offrender_core::scene::UNIT_HALF_SQUARE;
    use offrender_core::ContextAttributes;

    #[test]
    fn test_offsets_follow_positions() {
        let layout = ShapeLayout::for_vertices(UNIT_HALF_SQUARE.len()).unwrap();
        let positions: &[u8] = bytemuck::cast_slice(&UNIT_HALF_SQUARE);

        assert_eq!(layout.vertex_count, 6);
        assert_eq!(layout.offsets_start as usize, positions.len());
        assert_eq!(layout.offsets_start, 6 * 12);
        assert_eq!(layout.total_bytes, 6 * 12 + 6 * 4);
    }

    #[test]
    fn test_layout_rejects_counts_beyond_gl_int() {
        assert!(matches!(
            ShapeLayout::for_vertices(i32::MAX as usize),
            Err(OffrenderError::InvalidArgument(_))
        ));
        assert!(matches!(
            ShapeLayout::for_vertices(usize::MAX),
            Err(OffrenderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_builder_needs_loaded_bindings() {
        let ctx = RenderContext::create(
            Box::new(FakeBackend::new()),
            4,
            4,
            &ContextAttributes::canonical(),
        )
        .unwrap();
        assert!(matches!(SceneBuilder::new(&ctx), Err(OffrenderError::NotCurrent)));
    }
}
