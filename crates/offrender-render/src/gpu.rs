use glow::HasContext;
use offrender_core::OffrenderResult;

use crate::context::RenderContext;
use crate::debug;

/// Strings the driver reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub extension_count: usize,
}

impl DriverInfo {
    pub fn query(gl: &glow::Context) -> Self {
        unsafe {
            Self {
                vendor: gl.get_parameter_string(glow::VENDOR),
                renderer: gl.get_parameter_string(glow::RENDERER),
                version: gl.get_parameter_string(glow::VERSION),
                shading_language_version: gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION),
                extension_count: gl.get_parameter_i32(glow::NUM_EXTENSIONS).max(0) as usize,
            }
        }
    }
}

/// Prepare fixed-function state for drawing into the whole pixel buffer.
///
/// Logs the driver identity, installs the debug callback when the context
/// asked for debug output, sets the viewport and configures depth testing
/// from the requested depth bits.
pub fn prepare(ctx: &mut RenderContext) -> OffrenderResult<DriverInfo> {
    let attributes = ctx.attributes().clone();
    let (width, height) = (ctx.width() as i32, ctx.height() as i32);
    ctx.gl()?;
    let install_debug = attributes.debug_output && ctx.claim_debug_callback();
    let gl = ctx.gl_mut()?;

    let info = DriverInfo::query(gl);
    tracing::info!("Vendor: {}", info.vendor);
    tracing::info!("Renderer: {}", info.renderer);
    tracing::info!("Version: {}", info.version);
    tracing::info!("Shading language version: {}", info.shading_language_version);
    if info.extension_count > 0 {
        tracing::debug!("Discovered {} extensions", info.extension_count);
    }

    unsafe {
        if install_debug {
            if gl.supports_debug() {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.debug_message_callback(debug::report);
            } else {
                tracing::warn!("Driver has no debug output; continuing without it");
            }
        }

        gl.viewport(0, 0, width, height);

        if attributes.wants_depth() {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        } else {
            gl.disable(glow::DEPTH_TEST);
        }
    }

    Ok(info)
}
