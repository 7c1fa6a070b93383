//! Scene descriptions: geometry, per-vertex offsets and shader sources as
//! plain data, handed to the scene builder.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{OffrenderError, OffrenderResult};

/// Vertex stage shared by every shape of the reference scene.
pub const REFERENCE_VERTEX_SHADER: &str = r#"#version 400
in vec3 vertex;
in float offset;
void main() {
    gl_Position = vec4(vertex + offset, 1.0);
}
"#;

pub const PURPLE_FRAGMENT_SHADER: &str = r#"#version 400
out vec4 color;
void main() {
    color = vec4(0.5, 0.0, 0.5, 1.0);
}
"#;

pub const OLIVE_FRAGMENT_SHADER: &str = r#"#version 400
out vec4 color;
void main() {
    color = vec4(0.5, 0.5, 0.0, 1.0);
}
"#;

/// Two triangles covering the square `[-0.5, 0.5]²` at z = 0.
pub const UNIT_HALF_SQUARE: [[f32; 3]; 6] = [
    [-0.5, 0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
];

/// One draw: a triangle list, one scalar offset per vertex, and the fragment
/// stage to shade it with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ShapeDescription {
    pub vertices: Vec<[f32; 3]>,
    pub offsets: Vec<f32>,
    pub fragment_shader: String,
}

impl ShapeDescription {
    /// Shape whose every vertex is shifted by the same scalar offset.
    pub fn uniform_offset(vertices: &[[f32; 3]], offset: f32, fragment_shader: &str) -> Self {
        Self {
            vertices: vertices.to_vec(),
            offsets: vec![offset; vertices.len()],
            fragment_shader: fragment_shader.to_string(),
        }
    }

    /// Number of vertices drawn.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check the triangle-list and offset-count invariants.
    pub fn validate(&self) -> OffrenderResult<()> {
        check_triangle_list(self.vertices.len(), self.offsets.len())
    }
}

/// A drawable triangle list has a non-zero multiple of 3 vertices and
/// exactly one offset per vertex.
pub fn check_triangle_list(vertex_count: usize, offset_count: usize) -> OffrenderResult<()> {
    if vertex_count == 0 || vertex_count % 3 != 0 {
        return Err(OffrenderError::InvalidArgument(format!(
            "a triangle list needs a non-zero multiple of 3 vertices, got {}",
            vertex_count
        )));
    }
    if offset_count != vertex_count {
        return Err(OffrenderError::InvalidArgument(format!(
            "expected one offset per vertex ({}), got {}",
            vertex_count, offset_count
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneDescription {
    #[serde(default = "backdrop")]
    pub background: Color,
    pub vertex_shader: String,
    #[serde(default, rename = "shape")]
    pub shapes: Vec<ShapeDescription>,
}

fn backdrop() -> Color {
    Color::BACKDROP
}

impl SceneDescription {
    /// Background only, no geometry.
    pub fn empty(background: Color) -> Self {
        Self {
            background,
            vertex_shader: REFERENCE_VERTEX_SHADER.to_string(),
            shapes: Vec::new(),
        }
    }

    /// The two-shape reference scene: the unit-half square pushed up-right in
    /// purple and down-left in olive over a lavender backdrop.
    pub fn reference() -> Self {
        Self {
            background: Color::BACKDROP,
            vertex_shader: REFERENCE_VERTEX_SHADER.to_string(),
            shapes: vec![
                ShapeDescription::uniform_offset(&UNIT_HALF_SQUARE, 0.25, PURPLE_FRAGMENT_SHADER),
                ShapeDescription::uniform_offset(&UNIT_HALF_SQUARE, -0.25, OLIVE_FRAGMENT_SHADER),
            ],
        }
    }

    pub fn with_shape(mut self, shape: ShapeDescription) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Parse and validate a scene written in TOML.
    pub fn from_toml_str(source: &str) -> OffrenderResult<Self> {
        let scene: SceneDescription =
            toml::from_str(source).map_err(|e| OffrenderError::SceneParse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> OffrenderResult<()> {
        for (i, shape) in self.shapes.iter().enumerate() {
            shape.validate().map_err(|e| match e {
                OffrenderError::InvalidArgument(msg) => {
                    OffrenderError::InvalidArgument(format!("shape {}: {}", i, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
