//! Renders through the system OSMesa library. Every test returns early when
//! the library, or a context with the requested attributes, is unavailable.

use std::sync::Mutex;

use offrender_core::scene::{OLIVE_FRAGMENT_SHADER, PURPLE_FRAGMENT_SHADER, UNIT_HALF_SQUARE};
use offrender_core::{
    Color, ContentHash, ContextAttributes, OffrenderError, RenderConfig, ResolveMode,
    SceneDescription, ShaderStage, ShapeDescription,
};
use offrender_render::{OffscreenPipeline, OsMesa, RenderContext};

const PURPLE: [u8; 4] = [128, 0, 128, 255];
const OLIVE: [u8; 4] = [128, 128, 0, 255];
const BACKDROP: [u8; 4] = [153, 153, 204, 255];

// One current context per thread is all OSMesa promises; keep the tests apart.
static OSMESA_LOCK: Mutex<()> = Mutex::new(());

fn render(config: RenderConfig, scene: &SceneDescription) -> Option<Result<RenderContext, OffrenderError>> {
    let osmesa = match OsMesa::load() {
        Ok(osmesa) => osmesa,
        Err(e) => {
            eprintln!("skipping: {}", e);
            return None;
        }
    };
    match OffscreenPipeline::new(config).run(Box::new(osmesa), scene) {
        Err(OffrenderError::ContextCreation(msg)) => {
            eprintln!("skipping: {}", msg);
            None
        }
        other => Some(other),
    }
}

#[test]
fn test_reference_scene_pixels() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let Some(result) = render(RenderConfig::default(), &SceneDescription::reference()) else {
        return;
    };
    let ctx = result.expect("reference scene should render");
    let pixels = ctx.pixels();

    assert_eq!(pixels.byte_size(), 512 * 512 * 4);
    assert_eq!(pixels.get_pixel(384, 384), Some(PURPLE));
    assert_eq!(pixels.get_pixel(128, 128), Some(OLIVE));
    // Overlap: the olive square is nearer and drawn last.
    assert_eq!(pixels.get_pixel(256, 256), Some(OLIVE));
    assert_eq!(pixels.get_pixel(0, 0), Some(BACKDROP));
    assert_eq!(pixels.get_pixel(511, 511), Some(BACKDROP));
    assert_eq!(pixels.get_pixel(511, 0), Some(BACKDROP));
}

#[test]
fn test_clear_only_fills_backdrop() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let config = RenderConfig::new(32, 32).with_attributes(ContextAttributes::minimal());
    let Some(result) = render(config, &SceneDescription::empty(Color::BACKDROP)) else {
        return;
    };
    let ctx = result.expect("empty scene should render");
    assert!(ctx
        .pixels()
        .as_bytes()
        .chunks_exact(4)
        .all(|px| px == BACKDROP));
}

#[test]
fn test_both_resolve_modes_render_identically() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let scene = SceneDescription::reference();
    let base = RenderConfig::new(128, 128);

    let Some(loader) = render(base.clone().with_resolve_mode(ResolveMode::Loader), &scene) else {
        return;
    };
    let loader_hash = ContentHash::of(loader.expect("loader mode").pixels());

    let Some(explicit) = render(base.with_resolve_mode(ResolveMode::Explicit), &scene) else {
        return;
    };
    let explicit = explicit.expect("explicit mode");
    assert_eq!(ContentHash::of(explicit.pixels()), loader_hash);
    assert_eq!(
        explicit.functions().map(|table| table.len()),
        Some(offrender_render::REQUIRED_ENTRY_POINTS.len())
    );
}

#[test]
fn test_unknown_entry_point_is_reported_by_name() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let Some(result) = render(RenderConfig::new(8, 8), &SceneDescription::empty(Color::BLACK)) else {
        return;
    };
    let ctx = result.expect("empty scene should render");
    match ctx.get_proc_address("offrenderNoSuchEntryPoint") {
        Err(OffrenderError::UnresolvedSymbol(name)) => {
            assert_eq!(name, "offrenderNoSuchEntryPoint")
        }
        other => panic!("expected UnresolvedSymbol, got {:?}", other),
    }
}

#[test]
fn test_broken_fragment_shader_reports_log() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let scene = SceneDescription::empty(Color::BACKDROP).with_shape(ShapeDescription::uniform_offset(
        &UNIT_HALF_SQUARE,
        0.0,
        "#version 400\nout vec4 color;\nvoid main() { color = vec4(1.0) }\n",
    ));
    let Some(result) = render(RenderConfig::new(16, 16), &scene) else {
        return;
    };
    match result {
        Err(OffrenderError::ShaderBuild { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("expected ShaderBuild, got {:?}", other),
    }
}

#[test]
fn test_vertex_shader_without_offset_attribute() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut scene = SceneDescription::empty(Color::BACKDROP).with_shape(
        ShapeDescription::uniform_offset(&UNIT_HALF_SQUARE, 0.0, PURPLE_FRAGMENT_SHADER),
    );
    scene.vertex_shader =
        "#version 400\nin vec3 vertex;\nvoid main() { gl_Position = vec4(vertex, 1.0); }\n".into();

    let Some(result) = render(RenderConfig::new(16, 16), &scene) else {
        return;
    };
    match result {
        Err(OffrenderError::AttributeNotFound(name)) => assert_eq!(name, "offset"),
        other => panic!("expected AttributeNotFound, got {:?}", other),
    }
}

#[test]
fn test_non_square_buffer() {
    let _guard = OSMESA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let scene = SceneDescription::empty(Color::BACKDROP).with_shape(
        ShapeDescription::uniform_offset(&UNIT_HALF_SQUARE, -0.25, OLIVE_FRAGMENT_SHADER),
    );
    let Some(result) = render(RenderConfig::new(64, 32), &scene) else {
        return;
    };
    let ctx = result.expect("non-square scene should render");
    let pixels = ctx.pixels();

    assert_eq!((pixels.width(), pixels.height()), (64, 32));
    assert_eq!(pixels.stride(), 64 * 4);
    // The olive square spans NDC [-0.75, 0.25] on both axes.
    assert_eq!(pixels.get_pixel(16, 8), Some(OLIVE));
    assert_eq!(pixels.get_pixel(60, 30), Some(BACKDROP));
}
